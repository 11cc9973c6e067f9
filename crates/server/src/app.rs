//! Router construction.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::handlers::{flowchart, landing, logs, session};
use crate::state::AppState;

/// Build the application router with permissive CORS.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(landing::landing))
        .route("/health", get(landing::health))
        .route("/submit-code", post(session::submit_code))
        .route("/set-language/:session_id", post(session::set_language))
        .route(
            "/generate-flowchart/:session_id",
            post(flowchart::generate_for_session),
        )
        .route(
            "/session/:session_id",
            get(session::get_session).delete(session::delete_session),
        )
        .route("/generate", post(flowchart::generate))
        .route("/current", get(flowchart::current))
        .route("/logs", get(logs::list_logs))
        .route("/convert-to-json", post(logs::convert_to_json))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
