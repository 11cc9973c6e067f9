//! Request and response bodies of the Codeflow HTTP API.
//!
//! The server serializes these types and the CLI reuses them for its JSON
//! output, so both surfaces stay byte-compatible.

mod envelope;

pub use envelope::{ErrorCode, ErrorEnvelope};

use serde::{Deserialize, Serialize};

/// Language selector accepted when none is given.
pub const AUTO_LANGUAGE: &str = "auto";

/// Session id reported for one-shot generation requests.
pub const DIRECT_SESSION_ID: &str = "direct";

fn auto_language() -> String {
    AUTO_LANGUAGE.to_string()
}

/// Line count used in every response (`str::lines` semantics).
pub fn count_lines(code: &str) -> usize {
    code.lines().count()
}

/// Escape raw source so it can be pasted inside a JSON string literal.
pub fn escape_for_json(raw: &str) -> String {
    let quoted = serde_json::Value::String(raw.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub total_complexity: u32,
    pub function_count: usize,
    pub total_lines: usize,
    pub chunks: usize,
    pub language: String,
}

/// One persisted generation, as written to the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// RFC 3339 timestamp.
    pub timestamp: String,
    /// Submitted code, truncated with a trailing `...` when long.
    pub code: String,
    pub language: String,
    pub svg_url: String,
    pub mermaid_code: String,
    pub analysis: Analysis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeForm {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub code: String,
    #[serde(default = "auto_language")]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLanguageRequest {
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitCodeResponse {
    pub success: bool,
    pub session_id: String,
    pub message: String,
    pub code_length: usize,
    pub lines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLanguageResponse {
    pub success: bool,
    pub session_id: String,
    pub language: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowchartResponse {
    pub success: bool,
    pub html_svg: String,
    pub mermaid_code: String,
    /// Newline-separated progress trace.
    pub status: String,
    pub svg_url: String,
    pub analysis: Analysis,
    pub session_id: String,
    /// Names of chunks whose diagram is the error placeholder.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded_chunks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub has_code: bool,
    pub language: String,
    pub code_length: usize,
    pub lines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSessionResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub active_sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentResponse {
    pub svg_url: String,
    pub mermaid_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    pub success: bool,
    pub logs: Vec<AuditRecord>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertToJsonResponse {
    pub success: bool,
    pub json_safe_code: String,
    pub json_payload: GenerateRequest,
    pub example_curl: String,
}

impl ConvertToJsonResponse {
    /// Build the payload and a ready-to-run curl line against `base_url`.
    pub fn for_code(code: &str, base_url: &str) -> Self {
        let json_payload = GenerateRequest {
            code: code.to_string(),
            language: auto_language(),
        };
        let body = serde_json::to_string(&json_payload).unwrap_or_default();
        let example_curl = format!(
            "curl -X POST \"{}/generate\" -H \"Content-Type: application/json\" -d '{}'",
            base_url.trim_end_matches('/'),
            body.replace('\'', r"'\''")
        );
        Self {
            success: true,
            json_safe_code: escape_for_json(code),
            json_payload,
            example_curl,
        }
    }
}
