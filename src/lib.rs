pub mod api;
pub mod builder;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod monitor;
pub mod poller;
pub mod response;
pub mod transport;
pub mod view;

use std::sync::Arc;

use crate::api::ApiClient;
use crate::builder::PromptSubmission;
use crate::config::Config;
use crate::controller::SubmissionController;
use crate::error::Result;
use crate::monitor::ServiceMonitor;
use crate::response::{PromptOutcome, ResponseMode};
use crate::transport::{HttpTransport, Transport};

/// Client core: one submission controller plus the background monitor,
/// all sharing a single authenticated transport.
pub struct AnswerClient {
    api: ApiClient,
    controller: SubmissionController,
    config: Arc<Config>,
}

impl AnswerClient {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config.api)?);
        Ok(Self::with_transport(config, transport))
    }

    pub fn with_transport(config: Arc<Config>, transport: Arc<dyn Transport>) -> Self {
        let api = ApiClient::new(transport);
        let controller = SubmissionController::new(api.clone(), config.api.request_timeout());
        Self {
            api,
            controller,
            config,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn controller(&self) -> &SubmissionController {
        &self.controller
    }

    pub async fn submit(&self, submission: PromptSubmission, debug: bool) -> Result<PromptOutcome> {
        self.controller
            .submit(submission, ResponseMode::from_debug_flag(debug))
            .await
    }

    /// Start the health and analytics pollers at their configured cadence.
    pub fn start_monitor(&self) -> ServiceMonitor {
        ServiceMonitor::start(self.api.clone(), &self.config.polling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::SubmissionState;
    use crate::error::ClientError;
    use crate::transport::Endpoint;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct MockTransport;

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, endpoint: Endpoint, payload: Option<&Value>) -> Result<Value> {
            match endpoint {
                Endpoint::Prompt => Ok(json!({"response": "plain"})),
                Endpoint::PromptDebug => Ok(json!({
                    "raw_input": payload.map(|p| p["text"].clone()).unwrap_or_default(),
                    "refined_prompt": "refined",
                    "final_response": "debug",
                    "model_used": "gpt-x"
                })),
                _ => Ok(json!({"status": "healthy", "message": "API is running"})),
            }
        }
    }

    fn config() -> Arc<Config> {
        let mut config = Config::default();
        config.api.token = "secret".into();
        Arc::new(config)
    }

    #[test]
    fn test_missing_token_fails_construction() {
        let result = AnswerClient::new(Arc::new(Config::default()));
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[tokio::test]
    async fn test_debug_flag_selects_contract() {
        let client = AnswerClient::with_transport(config(), Arc::new(MockTransport));

        let plain = client.submit(PromptSubmission::new("hi"), false).await.unwrap();
        assert_eq!(plain.mode(), ResponseMode::Standard);

        let debug = client.submit(PromptSubmission::new("hi"), true).await.unwrap();
        assert_eq!(debug.mode(), ResponseMode::Debug);
        assert!(matches!(
            client.controller().state(),
            SubmissionState::Resolved(PromptOutcome::DebugAnswer(ref d)) if d.raw_input == "hi"
        ));
    }

    #[tokio::test]
    async fn test_monitor_uses_shared_api() {
        let client = AnswerClient::with_transport(config(), Arc::new(MockTransport));
        let monitor = client.start_monitor();
        let mut rx = monitor.subscribe_health();
        rx.changed().await.unwrap();
        assert!(monitor.health().snapshot.is_some());
        monitor.stop().await;
    }
}
