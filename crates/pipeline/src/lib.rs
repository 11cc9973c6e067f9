//! # Codeflow Pipeline
//!
//! Request orchestration shared by the HTTP server and the CLI.
//!
//! ## Pipeline
//!
//! ```text
//! code + LanguageSelector
//!     │
//!     ├──> plan: sniff/resolve language ──> extract structure ──> chunk plan
//!     │      └─ empty plan ──> NothingToDiagram
//!     │
//!     ├──> per chunk, in order: prompt ──> DiagramGenerator ──> fragment
//!     │      └─ failure/timeout ──> placeholder fragment
//!     │
//!     ├──> combine ──> render URL
//!     │
//!     └──> AuditLog::append (best-effort)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use codeflow_diagram::ChatCompletionsClient;
//! use codeflow_pipeline::{CodeflowConfig, Pipeline};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CodeflowConfig::load(None)?;
//!     let client = ChatCompletionsClient::from_env(config.llm.clone())?;
//!     let pipeline = Pipeline::new(Arc::new(client), &config)?;
//!
//!     let run = pipeline.run("x = 1\ny = 2\n", Default::default()).await?;
//!     println!("{}", run.svg_url);
//!     Ok(())
//! }
//! ```

mod audit;
mod config;
mod error;
mod orchestrator;

pub use audit::AuditLog;
pub use config::{
    AuditConfig, ChunkingConfig, CodeflowConfig, CONFIG_PATH_ENV, DEFAULT_AUDIT_DIR,
    DEFAULT_CONFIG_FILE, DEFAULT_LIST_LIMIT, DEFAULT_MAX_CODE_CHARS, LLM_BASE_URL_ENV,
    LLM_MODEL_ENV, LOG_DIR_ENV,
};
pub use error::{FailureKind, PipelineError, Result};
pub use orchestrator::{plan_submission, ChunkPlan, FlowchartRun, Pipeline};
