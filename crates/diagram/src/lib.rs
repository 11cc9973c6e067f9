//! # Codeflow Diagram
//!
//! Turns planned chunks into a single renderable Mermaid flowchart.
//!
//! ## Flow
//!
//! ```text
//! Chunk ──> build_prompt (C<i>_ node prefix, hints, rules, worked example)
//!              │
//!              ▼
//!        DiagramGenerator::complete  (ChatCompletionsClient in production)
//!              │  error / timeout ──> placeholder fragment (degraded)
//!              ▼
//!        sanitize_completion (strip fences, ensure directive)
//!              │
//!              ▼
//!        combine (SUB<i> subgraphs chained START ──> ... ──> END)
//!              │
//!              ▼
//!        MermaidInkRenderer::render_url
//! ```

mod client;
mod combine;
mod error;
mod generator;
mod prompt;
mod render;
mod sanitize;

pub use client::{
    ChatCompletionsClient, LlmConfig, DEFAULT_API_KEY_ENV, DEFAULT_LLM_BASE_URL,
    DEFAULT_LLM_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
};
pub use combine::{combine, shared_node_ids, subgraph_id, END_NODE, START_NODE};
pub use error::{DiagramError, Result};
pub use generator::{fallback_diagram, generate_fragment, DiagramFragment, DiagramGenerator};
pub use prompt::{build_prompt, NodePrefix, MAX_PROMPT_CALLS};
pub use render::{
    html_embed, MermaidInkRenderer, RenderConfig, DEFAULT_RENDER_BASE_URL, DEFAULT_RENDER_FORMAT,
};
pub use sanitize::{has_directive, sanitize_completion, DEFAULT_DIRECTIVE};
