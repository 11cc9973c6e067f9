use codeflow_chunker::ChunkerError;
use codeflow_diagram::DiagramError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Nothing to diagram: {lines} lines produced no functions or top-level statements")]
    NothingToDiagram { lines: usize },

    #[error("Chunker error: {0}")]
    ChunkerError(#[from] ChunkerError),

    #[error("Diagram error: {0}")]
    DiagramError(#[from] DiagramError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Coarse failure class used to choose a status code or exit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidArgument,
    NothingToDiagram,
    ExternalService { retryable: bool },
    Unexpected,
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidArgument(_) => FailureKind::InvalidArgument,
            Self::NothingToDiagram { .. } => FailureKind::NothingToDiagram,
            Self::ChunkerError(ChunkerError::UnsupportedLanguage(_)) => FailureKind::InvalidArgument,
            Self::ChunkerError(ChunkerError::Grammar { .. }) => {
                FailureKind::ExternalService { retryable: false }
            }
            Self::DiagramError(DiagramError::InvalidConfig(_)) => FailureKind::Unexpected,
            Self::DiagramError(err) => FailureKind::ExternalService {
                retryable: err.is_transient(),
            },
            Self::ChunkerError(ChunkerError::InvalidThreshold(_))
            | Self::IoError(_)
            | Self::JsonError(_)
            | Self::ConfigParse { .. }
            | Self::InvalidConfig(_) => FailureKind::Unexpected,
        }
    }
}
