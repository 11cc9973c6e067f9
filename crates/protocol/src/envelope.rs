use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    InvalidRequest,
    /// Input was valid but yielded nothing to diagram.
    Unprocessable,
    /// The model, parser or another dependency failed.
    Upstream,
    Internal,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidRequest => "invalid_request",
            Self::Unprocessable => "unprocessable",
            Self::Upstream => "upstream",
            Self::Internal => "internal",
        }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub code: ErrorCode,
    pub detail: String,
    /// Whether repeating the same request later may succeed.
    pub retryable: bool,
}

impl ErrorEnvelope {
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            detail: detail.into(),
            retryable: false,
        }
    }

    #[must_use]
    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }
}
