use std::sync::Arc;

use crate::error::Result;
use crate::models::{AnalyticsSnapshot, HealthSnapshot, PromptPayload, ServiceInfo};
use crate::response::{PromptOutcome, ResponseMode};
use crate::transport::{Endpoint, Transport};

/// Typed calls on top of a [`Transport`].
#[derive(Clone)]
pub struct ApiClient {
    tx: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(tx: Arc<dyn Transport>) -> Self {
        Self { tx }
    }

    pub async fn health(&self) -> Result<HealthSnapshot> {
        let body = self.tx.send(Endpoint::Health, None).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn analytics(&self) -> Result<AnalyticsSnapshot> {
        let body = self.tx.send(Endpoint::Analytics, None).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn service_info(&self) -> Result<ServiceInfo> {
        let body = self.tx.send(Endpoint::Info, None).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn prompt(
        &self,
        payload: &PromptPayload,
        mode: ResponseMode,
    ) -> Result<PromptOutcome> {
        let body = serde_json::to_value(payload)?;
        let reply = self.tx.send(mode.endpoint(), Some(&body)).await?;
        PromptOutcome::decode(mode, reply).inspect_err(|e| {
            tracing::error!(?mode, "Failed to decode prompt response: {e}");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClientError, TransportError};
    use crate::models::{HealthStatus, ResponseStyle};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    // Records every call and answers from a fixed table
    struct RecordingTransport {
        calls: Mutex<Vec<(Endpoint, Option<Value>)>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, endpoint: Endpoint, payload: Option<&Value>) -> Result<Value> {
            self.calls
                .lock()
                .expect("Mock transport mutex should not be poisoned")
                .push((endpoint, payload.cloned()));
            match endpoint {
                Endpoint::Health => Ok(json!({
                    "status": "healthy",
                    "message": "API is running",
                    "uptime_seconds": 12.5
                })),
                Endpoint::Info => Ok(json!({
                    "message": "Answer Architect API",
                    "version": "1.0.0",
                    "endpoints": {"health": "/health"},
                    "authentication": "Bearer token required",
                    "mock_mode": true
                })),
                Endpoint::PromptDebug => Ok(json!({"response": "wrong contract"})),
                _ => Err(TransportError::HttpStatus {
                    status: 500,
                    message: "Processing failed: boom".into(),
                }
                .into()),
            }
        }
    }

    fn client() -> (Arc<RecordingTransport>, ApiClient) {
        let tx = Arc::new(RecordingTransport {
            calls: Mutex::new(Vec::new()),
        });
        (tx.clone(), ApiClient::new(tx))
    }

    #[tokio::test]
    async fn test_health_decodes() {
        let (_, api) = client();
        let health = api.health().await.unwrap();
        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.uptime_seconds, Some(12.5));
    }

    #[tokio::test]
    async fn test_service_info_decodes() {
        let (_, api) = client();
        let info = api.service_info().await.unwrap();
        assert_eq!(info.version, "1.0.0");
        assert_eq!(info.mock_mode, Some(true));
        assert_eq!(info.endpoints.get("health").map(String::as_str), Some("/health"));
    }

    #[tokio::test]
    async fn test_prompt_posts_payload_to_mode_endpoint() {
        let (tx, api) = client();
        let payload = PromptPayload {
            text: "Explain machine learning".into(),
            style: ResponseStyle::Casual,
            skip_refinement: true,
        };

        let err = api.prompt(&payload, ResponseMode::Debug).await.unwrap_err();
        assert!(matches!(err, ClientError::Decoding(_)));

        let calls = tx.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Endpoint::PromptDebug);
        assert_eq!(
            calls[0].1,
            Some(json!({
                "text": "Explain machine learning",
                "style": "casual",
                "skip_refinement": true
            }))
        );
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let (_, api) = client();
        let err = api.analytics().await.unwrap_err();
        assert_eq!(err.to_string(), "Processing failed: boom");
    }
}
