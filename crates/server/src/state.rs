//! Application state shared by all handlers.

use std::sync::Arc;

use codeflow_pipeline::Pipeline;

use crate::session::SessionStore;

pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub sessions: SessionStore,
    /// Maximum number of records returned by `/logs`.
    pub list_limit: usize,
    /// Base URL used in generated curl examples.
    pub public_url: String,
    pub version: String,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>, list_limit: usize, public_url: impl Into<String>) -> Self {
        Self {
            pipeline,
            sessions: SessionStore::new(),
            list_limit,
            public_url: public_url.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
