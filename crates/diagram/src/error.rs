use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiagramError>;

#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("Model returned an empty completion")]
    EmptyCompletion,

    #[error("API key not set (expected environment variable {0})")]
    MissingApiKey(String),

    #[error("Invalid generator configuration: {0}")]
    InvalidConfig(String),
}

impl DiagramError {
    /// Whether retrying the same request later could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Timeout(_) => true,
            Self::MalformedResponse(_)
            | Self::EmptyCompletion
            | Self::MissingApiKey(_)
            | Self::InvalidConfig(_) => false,
        }
    }
}
