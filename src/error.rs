use thiserror::Error;

/// Rejections raised before anything reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a prompt")]
    Empty,

    #[error("Prompt is {length} characters long; it must stay below {limit}")]
    TooLong { length: usize, limit: usize },

    #[error("A prompt is already being processed")]
    SubmissionInFlight,

    #[error("Unknown response style: {0}")]
    UnknownStyle(String),
}

/// Failures of a single call to the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Non-2xx reply. The message is the body's `detail` field, or
    /// `HTTP error: <status>` when the body could not be read.
    #[error("{message}")]
    HttpStatus { status: u16, message: String },

    /// No response was received at all.
    #[error("Unable to reach the service. Check your connection and try again.")]
    NetworkUnavailable,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Malformed response from service: {0}")]
    Decoding(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decoding(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
