use std::time::Duration;

use tokio::sync::watch;

use crate::api::ApiClient;
use crate::builder::PromptSubmission;
use crate::error::{ClientError, Result, ValidationError};
use crate::response::{PromptOutcome, ResponseMode};

/// Published state of the prompt form.
///
/// `Resolved` and `Failed` are terminal for their submission and accept the
/// next one exactly like `Idle`. Only one of outcome or error is ever visible.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending,
    Resolved(PromptOutcome),
    Failed(String),
}

impl SubmissionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionState::Pending)
    }

    pub fn outcome(&self) -> Option<&PromptOutcome> {
        match self {
            SubmissionState::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SubmissionState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Owns the single in-flight prompt submission.
pub struct SubmissionController {
    api: ApiClient,
    timeout: Option<Duration>,
    state: watch::Sender<SubmissionState>,
}

impl SubmissionController {
    pub fn new(api: ApiClient, timeout: Option<Duration>) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self {
            api,
            timeout,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    /// Submit one prompt and wait for its outcome.
    ///
    /// While another submission is pending this is a no-op returning
    /// [`ValidationError::SubmissionInFlight`]. Invalid input is published as a
    /// failure without touching the network.
    pub async fn submit(
        &self,
        submission: PromptSubmission,
        mode: ResponseMode,
    ) -> Result<PromptOutcome> {
        let mut admission = Err(ValidationError::SubmissionInFlight);
        self.state.send_if_modified(|state| {
            if state.is_pending() {
                return false;
            }
            admission = submission.to_payload();
            *state = match &admission {
                Ok(_) => SubmissionState::Pending,
                Err(e) => SubmissionState::Failed(e.to_string()),
            };
            true
        });

        let payload = match admission {
            Ok(payload) => payload,
            Err(ValidationError::SubmissionInFlight) => {
                tracing::debug!(
                    submission = %submission.id,
                    "Ignoring submit while another prompt is pending"
                );
                return Err(ValidationError::SubmissionInFlight.into());
            }
            Err(e) => {
                tracing::info!(submission = %submission.id, "Rejected prompt: {e}");
                return Err(e.into());
            }
        };

        tracing::info!(
            submission = %submission.id,
            ?mode,
            style = %payload.style,
            skip_refinement = payload.skip_refinement,
            "Submitting prompt"
        );
        let guard = PendingGuard {
            state: &self.state,
            armed: true,
        };

        let call = self.api.prompt(&payload, mode);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(ClientError::Timeout(limit.as_secs())),
            },
            None => call.await,
        };

        match &result {
            Ok(outcome) => {
                tracing::info!(
                    submission = %submission.id,
                    model = ?outcome.model_used(),
                    "Prompt resolved"
                );
                guard.settle(SubmissionState::Resolved(outcome.clone()));
            }
            Err(e) => {
                tracing::warn!(submission = %submission.id, "Prompt failed: {e}");
                guard.settle(SubmissionState::Failed(e.to_string()));
            }
        }
        result
    }

    /// Drop whatever outcome or error is displayed. Ignored while pending.
    pub fn clear(&self) -> bool {
        self.state.send_if_modified(|state| match state {
            SubmissionState::Pending | SubmissionState::Idle => false,
            _ => {
                *state = SubmissionState::Idle;
                true
            }
        })
    }
}

/// Returns the controller to `Idle` if a pending submit is dropped mid-flight.
struct PendingGuard<'a> {
    state: &'a watch::Sender<SubmissionState>,
    armed: bool,
}

impl PendingGuard<'_> {
    fn settle(mut self, next: SubmissionState) {
        self.armed = false;
        self.state.send_replace(next);
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("Pending submission was abandoned; returning to idle");
            self.state.send_replace(SubmissionState::Idle);
        }
    }
}
