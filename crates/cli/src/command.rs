use crate::{Command, OutputFormat};
use anyhow::{Context, Result};
use codeflow_chunker::{sniff_language, ChunkPlanner, LanguageSelector};
use codeflow_diagram::ChatCompletionsClient;
use codeflow_pipeline::{plan_submission, AuditLog, CodeflowConfig, Pipeline};
use codeflow_protocol::{FlowchartResponse, DIRECT_SESSION_ID};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Run one subcommand and return what should be printed to stdout.
pub async fn execute(command: Command, config_path: Option<&Path>) -> Result<String> {
    match command {
        Command::Detect { file } => {
            let code = read_source(file.as_deref())?;
            Ok(sniff_language(&code).to_string())
        }
        Command::Analyze { file, language } => {
            let config = load_config(config_path)?;
            let selector = parse_selector(&language)?;
            let code = read_source(file.as_deref())?;
            let planner = ChunkPlanner::new(config.chunking.max_chunk_lines)?;
            let plan = plan_submission(&code, selector, &planner)?;
            Ok(serde_json::to_string_pretty(&plan)?)
        }
        Command::Generate {
            file,
            language,
            format,
        } => {
            let config = load_config(config_path)?;
            let selector = parse_selector(&language)?;
            let code = read_source(file.as_deref())?;
            generate(&config, &code, selector, format).await
        }
        Command::Logs { limit } => {
            let config = load_config(config_path)?;
            let audit = AuditLog::new(&config.audit.dir, config.audit.max_code_chars);
            let records = audit
                .recent(limit.unwrap_or(config.audit.list_limit))
                .await
                .with_context(|| format!("Failed to read logs from {}", audit.dir().display()))?;
            Ok(serde_json::to_string_pretty(&records)?)
        }
    }
}

async fn generate(
    config: &CodeflowConfig,
    code: &str,
    selector: LanguageSelector,
    format: OutputFormat,
) -> Result<String> {
    let client = ChatCompletionsClient::from_env(config.llm.clone()).with_context(|| {
        format!(
            "Set {} (or point llm.api_key_env at another variable)",
            config.llm.api_key_env
        )
    })?;
    let pipeline = Pipeline::new(Arc::new(client), config)?;
    let run = pipeline.run(code, selector).await?;

    for line in &run.status {
        log::info!("{line}");
    }
    let degraded = run.degraded_chunks();
    if !degraded.is_empty() {
        log::warn!("Placeholder diagrams used for: {}", degraded.join(", "));
    }

    Ok(match format {
        OutputFormat::Mermaid => run.mermaid_code,
        OutputFormat::Url => run.svg_url,
        OutputFormat::Json => {
            let response = FlowchartResponse {
                success: true,
                status: run.status_text(),
                degraded_chunks: degraded,
                html_svg: run.html_svg,
                mermaid_code: run.mermaid_code,
                svg_url: run.svg_url,
                analysis: run.analysis,
                session_id: DIRECT_SESSION_ID.to_string(),
            };
            serde_json::to_string_pretty(&response)?
        }
    })
}

fn load_config(path: Option<&Path>) -> Result<CodeflowConfig> {
    CodeflowConfig::load(path).context("Failed to load config")
}

fn parse_selector(language: &str) -> Result<LanguageSelector> {
    language.parse::<LanguageSelector>().with_context(|| {
        format!(
            "Invalid language '{language}'. Must be one of: {}",
            LanguageSelector::ACCEPTED.join(", ")
        )
    })
}

fn read_source(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut code = String::new();
            std::io::stdin()
                .read_to_string(&mut code)
                .context("Failed to read stdin")?;
            Ok(code)
        }
    }
}
