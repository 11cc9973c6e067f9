//! Flowchart generation endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use codeflow_chunker::LanguageSelector;
use codeflow_pipeline::FlowchartRun;
use codeflow_protocol::{CurrentResponse, FlowchartResponse, GenerateRequest, DIRECT_SESSION_ID};

use crate::error::ApiError;
use crate::state::AppState;

fn flowchart_response(run: FlowchartRun, session_id: String) -> FlowchartResponse {
    let status = run.status_text();
    let degraded_chunks = run.degraded_chunks();
    FlowchartResponse {
        success: true,
        html_svg: run.html_svg,
        mermaid_code: run.mermaid_code,
        status,
        svg_url: run.svg_url,
        analysis: run.analysis,
        session_id,
        degraded_chunks,
    }
}

pub(crate) async fn generate_for_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<FlowchartResponse>, ApiError> {
    let session = state.sessions.get(&session_id).await?;
    if session.code.is_empty() {
        return Err(ApiError::InvalidRequest("No code found in session".into()));
    }

    log::info!("Generating flowchart for session {session_id}");
    let run = state.pipeline.run(&session.code, session.language).await?;

    Ok(Json(flowchart_response(run, session_id)))
}

pub(crate) async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<FlowchartResponse>, ApiError> {
    let selector: LanguageSelector = request.language.parse().map_err(|_| {
        ApiError::InvalidRequest(format!(
            "Invalid language '{}'. Must be one of: {}",
            request.language,
            LanguageSelector::ACCEPTED.join(", ")
        ))
    })?;

    let run = state.pipeline.run(&request.code, selector).await?;

    Ok(Json(flowchart_response(run, DIRECT_SESSION_ID.to_string())))
}

/// Most recent diagram, read back from the audit log.
pub(crate) async fn current(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CurrentResponse>, ApiError> {
    let latest = match state.pipeline.audit_log() {
        Some(audit) => audit.latest().await?,
        None => None,
    };

    latest
        .map(|record| {
            Json(CurrentResponse {
                svg_url: record.svg_url,
                mermaid_code: record.mermaid_code,
            })
        })
        .ok_or_else(|| ApiError::NotFound("No flowchart generated yet".into()))
}
