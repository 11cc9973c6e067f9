//! Codeflow HTTP server.
//!
//! ## Usage
//!
//! ```text
//! GROQ_API_KEY=... codeflow-server --port 8000
//! ```
//!
//! Configuration is read from `--config`, `$CODEFLOW_CONFIG` or
//! `./codeflow.toml`; a `.env` file in the working directory is honoured.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use codeflow_diagram::ChatCompletionsClient;
use codeflow_pipeline::{CodeflowConfig, Pipeline};
use codeflow_server::{run_server, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "codeflow-server", version, about = "Serve the Codeflow flowchart API")]
struct Args {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Path to a codeflow.toml configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL advertised in generated examples
    #[arg(long, env = "CODEFLOW_PUBLIC_URL")]
    public_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("Warning: failed to read .env: {err}");
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();

    let config = CodeflowConfig::load(args.config.as_deref()).context("Failed to load config")?;
    let client = ChatCompletionsClient::from_env(config.llm.clone())
        .context("Failed to create the chat completions client")?;
    log::info!(
        "Using model {} at {}",
        client.config().model,
        client.config().base_url
    );

    let pipeline = Pipeline::new(Arc::new(client), &config).context("Invalid pipeline config")?;
    if let Some(audit) = pipeline.audit_log() {
        log::info!("Audit records go to {}", audit.dir().display());
    }

    let server_config = ServerConfig {
        host: args.host,
        port: args.port,
        list_limit: config.audit.list_limit,
        public_url: args.public_url,
    };

    run_server(server_config, Arc::new(pipeline)).await
}
