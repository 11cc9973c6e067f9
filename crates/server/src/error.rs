//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use codeflow_pipeline::{FailureKind, PipelineError};
use codeflow_protocol::{ErrorCode, ErrorEnvelope};

use crate::session::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) => Self::NotFound("Session not found".into()),
            SessionError::InvalidLanguage { .. } => Self::InvalidRequest(err.to_string()),
        }
    }
}

impl ApiError {
    fn status_and_envelope(&self) -> (StatusCode, ErrorEnvelope) {
        match self {
            Self::NotFound(detail) => (
                StatusCode::NOT_FOUND,
                ErrorEnvelope::new(ErrorCode::NotFound, detail.clone()),
            ),
            Self::InvalidRequest(detail) => (
                StatusCode::BAD_REQUEST,
                ErrorEnvelope::new(ErrorCode::InvalidRequest, detail.clone()),
            ),
            Self::Pipeline(err) => match err.kind() {
                FailureKind::InvalidArgument => (
                    StatusCode::BAD_REQUEST,
                    ErrorEnvelope::new(ErrorCode::InvalidRequest, err.to_string()),
                ),
                FailureKind::NothingToDiagram => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorEnvelope::new(ErrorCode::Unprocessable, err.to_string()),
                ),
                FailureKind::ExternalService { retryable } => (
                    StatusCode::BAD_GATEWAY,
                    ErrorEnvelope::new(ErrorCode::Upstream, err.to_string()).retryable(retryable),
                ),
                FailureKind::Unexpected => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorEnvelope::new(
                        ErrorCode::Internal,
                        format!("Error processing code: {err}"),
                    ),
                ),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, envelope) = self.status_and_envelope();
        if status.is_server_error() {
            log::error!("Request failed [{}]: {}", envelope.code.as_str(), envelope.detail);
        } else {
            log::debug!(
                "Request rejected ({status}, {}): {}",
                envelope.code.as_str(),
                envelope.detail
            );
        }
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeflow_diagram::DiagramError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (
                ApiError::from(SessionError::InvalidLanguage {
                    given: "rust".into(),
                }),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(PipelineError::NothingToDiagram { lines: 900 }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::from(PipelineError::from(DiagramError::Status {
                    status: 429,
                    body: String::new(),
                })),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::from(PipelineError::InvalidConfig("bad".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_and_envelope().0, expected, "{err}");
        }
    }

    #[test]
    fn test_upstream_carries_retryable() {
        let err = ApiError::from(PipelineError::from(DiagramError::Status {
            status: 503,
            body: String::new(),
        }));
        let (_, envelope) = err.status_and_envelope();
        assert!(envelope.retryable);
        assert_eq!(envelope.code, ErrorCode::Upstream);
    }
}
