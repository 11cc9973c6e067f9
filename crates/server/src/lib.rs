//! HTTP server for Codeflow.
//!
//! Exposes the flowchart pipeline as a session-oriented JSON API.
//!
//! # Architecture
//!
//! ```text
//! Client ──HTTP──► axum router (CORS permissive)
//!                      │
//!                      ├─► /submit-code, /set-language, /session ──► SessionStore
//!                      │
//!                      ├─► /generate-flowchart, /generate ──► Pipeline::run
//!                      │
//!                      └─► /current, /logs ──► AuditLog
//! ```

mod app;
mod error;
mod handlers;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use codeflow_pipeline::Pipeline;

pub use app::create_router;
pub use error::ApiError;
pub use session::{Session, SessionError, SessionStore};
pub use state::AppState;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum number of audit records returned by `/logs`.
    pub list_limit: usize,
    /// Externally reachable base URL; derived from host and port when `None`.
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            list_limit: codeflow_pipeline::DEFAULT_LIST_LIMIT,
            public_url: None,
        }
    }
}

impl ServerConfig {
    pub fn public_url(&self) -> String {
        self.public_url.clone().unwrap_or_else(|| {
            let host = if self.host == "0.0.0.0" {
                "localhost"
            } else {
                self.host.as_str()
            };
            format!("http://{host}:{}", self.port)
        })
    }
}

/// Bind and serve until Ctrl-C.
pub async fn run_server(config: ServerConfig, pipeline: Arc<Pipeline>) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(
        pipeline,
        config.list_limit,
        config.public_url(),
    ));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    log::info!("Starting server at http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {err}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url() {
        let config = ServerConfig::default();
        assert_eq!(config.public_url(), "http://localhost:8000");

        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 9000,
            ..ServerConfig::default()
        };
        assert_eq!(config.public_url(), "http://127.0.0.1:9000");

        let config = ServerConfig {
            public_url: Some("https://flow.example.com".into()),
            ..ServerConfig::default()
        };
        assert_eq!(config.public_url(), "https://flow.example.com");
    }
}
