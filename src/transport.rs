use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::{ClientError, Result, TransportError};
use crate::models::ApiErrorBody;

/// Calls the client knows how to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Info,
    Health,
    Prompt,
    PromptDebug,
    Analytics,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::Prompt | Endpoint::PromptDebug => Method::POST,
            Endpoint::Info | Endpoint::Health | Endpoint::Analytics => Method::GET,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Info => "/",
            Endpoint::Health => "/health",
            Endpoint::Prompt => "/prompt",
            Endpoint::PromptDebug => "/prompt/debug",
            Endpoint::Analytics => "/analytics/stats",
        }
    }
}

/// Sole point of contact with the remote service. One call, no retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, endpoint: Endpoint, payload: Option<&Value>) -> Result<Value>;
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        if api.token.trim().is_empty() {
            return Err(ClientError::Config("bearer token is not configured".into()));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| ClientError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: api.base_url.trim().trim_end_matches('/').to_string(),
            token: api.token.clone(),
        })
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, endpoint: Endpoint, payload: Option<&Value>) -> Result<Value> {
        let url = self.url(endpoint);
        tracing::debug!(method = %endpoint.method(), %url, "Sending request");

        let mut request = self
            .client
            .request(endpoint.method(), &url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = payload {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%url, "Request failed before a response arrived: {e}");
            TransportError::NetworkUnavailable
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ApiErrorBody>().await {
                Ok(body) if !body.detail.trim().is_empty() => body.detail,
                _ => format!("HTTP error: {}", status.as_u16()),
            };
            tracing::debug!(%url, status = status.as_u16(), "Service returned an error: {message}");
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body = response.bytes().await.map_err(|e| {
            tracing::warn!(%url, "Connection dropped while reading the response: {e}");
            TransportError::NetworkUnavailable
        })?;

        Ok(serde_json::from_slice(&body)?)
    }
}
