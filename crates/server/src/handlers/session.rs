//! Session endpoints: submit, set language, inspect, delete.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::{Form, Json};
use codeflow_protocol::{
    count_lines, CodeForm, DeleteSessionResponse, SessionInfo, SetLanguageRequest,
    SetLanguageResponse, SubmitCodeResponse,
};

use crate::error::ApiError;
use crate::state::AppState;

pub(crate) async fn submit_code(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CodeForm>,
) -> Result<Json<SubmitCodeResponse>, ApiError> {
    if form.code.trim().is_empty() {
        return Err(ApiError::InvalidRequest("Code cannot be empty".into()));
    }

    let code_length = form.code.chars().count();
    let lines = count_lines(&form.code);
    let id = state.sessions.create(form.code).await;
    log::info!("Created session {id} ({lines} lines)");

    Ok(Json(SubmitCodeResponse {
        success: true,
        session_id: id.to_string(),
        message: "Code submitted successfully".to_string(),
        code_length,
        lines,
    }))
}

pub(crate) async fn set_language(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<SetLanguageRequest>,
) -> Result<Json<SetLanguageResponse>, ApiError> {
    let selector = state
        .sessions
        .set_language(&session_id, &request.language)
        .await?;

    Ok(Json(SetLanguageResponse {
        success: true,
        session_id,
        language: selector.to_string(),
        message: "Language set successfully".to_string(),
    }))
}

pub(crate) async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionInfo>, ApiError> {
    let session = state.sessions.get(&session_id).await?;

    Ok(Json(SessionInfo {
        session_id,
        has_code: !session.code.is_empty(),
        language: session.language.to_string(),
        code_length: session.code.chars().count(),
        lines: count_lines(&session.code),
    }))
}

pub(crate) async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<DeleteSessionResponse>, ApiError> {
    state.sessions.delete(&session_id).await?;
    log::info!("Deleted session {session_id}");

    Ok(Json(DeleteSessionResponse {
        success: true,
        message: "Session deleted successfully".to_string(),
    }))
}
