//! Audit log listing and the JSON conversion helper.

use std::sync::Arc;

use axum::extract::State;
use axum::{Form, Json};
use codeflow_protocol::{CodeForm, ConvertToJsonResponse, LogsResponse};

use crate::error::ApiError;
use crate::state::AppState;

pub(crate) async fn list_logs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LogsResponse>, ApiError> {
    let logs = match state.pipeline.audit_log() {
        Some(audit) => audit.recent(state.list_limit).await?,
        None => Vec::new(),
    };

    Ok(Json(LogsResponse {
        success: true,
        count: logs.len(),
        logs,
    }))
}

pub(crate) async fn convert_to_json(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CodeForm>,
) -> Json<ConvertToJsonResponse> {
    Json(ConvertToJsonResponse::for_code(&form.code, &state.public_url))
}
