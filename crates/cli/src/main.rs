//! `codeflow`: run the flowchart pipeline from the terminal.

mod command;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "codeflow", version, about = "Turn source code into Mermaid flowcharts")]
struct Cli {
    /// Path to a codeflow.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a flowchart (calls the language model)
    Generate {
        /// Source file; stdin when omitted or "-"
        file: Option<PathBuf>,

        /// auto, python, javascript or c
        #[arg(short, long, default_value = "auto")]
        language: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Mermaid)]
        format: OutputFormat,
    },

    /// Print the structure report and chunk plan as JSON (no model call)
    Analyze {
        file: Option<PathBuf>,

        #[arg(short, long, default_value = "auto")]
        language: String,
    },

    /// Print the sniffed language
    Detect { file: Option<PathBuf> },

    /// Print recent audit records as JSON, newest first
    Logs {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Combined Mermaid source
    Mermaid,
    /// mermaid.ink render URL
    Url,
    /// Full response as JSON
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("Warning: failed to read .env: {err}");
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let output = command::execute(cli.command, cli.config.as_deref()).await?;
    println!("{output}");
    Ok(())
}
