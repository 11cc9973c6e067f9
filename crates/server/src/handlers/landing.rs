//! Landing page and health check.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::Json;
use codeflow_protocol::HealthResponse;

use crate::state::AppState;

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Codeflow API</title>
    <style>
        body { font-family: Arial, sans-serif; max-width: 1000px; margin: 40px auto; padding: 20px; }
        h1 { color: #2563eb; }
        .endpoint { background: #f3f4f6; padding: 12px 15px; margin: 12px 0; border-radius: 8px; }
        .method { display: inline-block; padding: 3px 8px; border-radius: 4px; font-weight: bold; color: white; }
        .post { background: #10b981; }
        .get { background: #3b82f6; }
        .delete { background: #ef4444; }
        code { background: #e5e7eb; padding: 2px 6px; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>Codeflow API</h1>
    <p>Turns Python, JavaScript and C source into Mermaid flowcharts.</p>

    <h2>Session workflow</h2>
    <div class="endpoint"><span class="method post">POST</span> <strong>/submit-code</strong>
        <p>Form field <code>code</code>. Returns a <code>session_id</code>.</p></div>
    <div class="endpoint"><span class="method post">POST</span> <strong>/set-language/{session_id}</strong>
        <p>Body <code>{"language": "python"}</code>; one of auto, python, javascript, c.</p></div>
    <div class="endpoint"><span class="method post">POST</span> <strong>/generate-flowchart/{session_id}</strong>
        <p>Generates the flowchart for the stored code.</p></div>
    <div class="endpoint"><span class="method get">GET</span> <strong>/session/{session_id}</strong>
        <p>Session details.</p></div>
    <div class="endpoint"><span class="method delete">DELETE</span> <strong>/session/{session_id}</strong>
        <p>Removes the session.</p></div>

    <h2>One-shot and utilities</h2>
    <div class="endpoint"><span class="method post">POST</span> <strong>/generate</strong>
        <p>Body <code>{"code": "...", "language": "auto"}</code>.</p></div>
    <div class="endpoint"><span class="method get">GET</span> <strong>/current</strong>
        <p>Most recently generated diagram.</p></div>
    <div class="endpoint"><span class="method get">GET</span> <strong>/logs</strong>
        <p>Recent generations, newest first.</p></div>
    <div class="endpoint"><span class="method post">POST</span> <strong>/convert-to-json</strong>
        <p>Form field <code>code</code>. Returns a JSON-safe payload for <code>/generate</code>.</p></div>
    <div class="endpoint"><span class="method get">GET</span> <strong>/health</strong>
        <p>Liveness and active session count.</p></div>
</body>
</html>
"#;

pub(crate) async fn landing() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

pub(crate) async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        active_sessions: state.sessions.len().await,
    })
}
