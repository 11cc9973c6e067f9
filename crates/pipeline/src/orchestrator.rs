use crate::audit::AuditLog;
use crate::config::CodeflowConfig;
use crate::error::{PipelineError, Result};
use codeflow_chunker::{
    Chunk, ChunkPlanner, Language, LanguageSelector, StructureExtractor, StructureReport,
};
use codeflow_diagram::{
    combine, generate_fragment, html_embed, DiagramFragment, DiagramGenerator, MermaidInkRenderer,
};
use codeflow_protocol::{count_lines, Analysis};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Everything produced by one orchestration.
#[derive(Debug, Clone, Serialize)]
pub struct FlowchartRun {
    pub language: Language,
    pub mermaid_code: String,
    pub svg_url: String,
    pub html_svg: String,
    /// Progress trace, one entry per step.
    pub status: Vec<String>,
    pub analysis: Analysis,
    pub fragments: Vec<DiagramFragment>,
}

impl FlowchartRun {
    pub fn status_text(&self) -> String {
        self.status.join("\n")
    }

    pub fn degraded_chunks(&self) -> Vec<String> {
        self.fragments
            .iter()
            .filter(|fragment| fragment.degraded)
            .map(|fragment| fragment.chunk_name.clone())
            .collect()
    }
}

/// Static analysis of a submission, without any model call.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkPlan {
    pub language: Language,
    pub structure: StructureReport,
    pub chunks: Vec<Chunk>,
}

/// Resolve the language, extract structure and plan chunks.
pub fn plan_submission(
    code: &str,
    selector: LanguageSelector,
    planner: &ChunkPlanner,
) -> Result<ChunkPlan> {
    if code.trim().is_empty() {
        return Err(PipelineError::InvalidArgument(
            "code must not be empty".into(),
        ));
    }

    let language = selector.resolve(code);
    let structure = StructureExtractor::new(language)?.extract(code);
    let chunks = planner.plan(&structure, code);

    Ok(ChunkPlan {
        language,
        structure,
        chunks,
    })
}

/// Runs submissions through extraction, planning, generation, combination and rendering.
pub struct Pipeline {
    generator: Arc<dyn DiagramGenerator>,
    planner: ChunkPlanner,
    renderer: MermaidInkRenderer,
    generation_timeout: Duration,
    audit: Option<AuditLog>,
}

impl Pipeline {
    pub fn new(generator: Arc<dyn DiagramGenerator>, config: &CodeflowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            generator,
            planner: ChunkPlanner::new(config.chunking.max_chunk_lines)?,
            renderer: MermaidInkRenderer::new(config.render.clone()),
            generation_timeout: config.llm.timeout(),
            audit: AuditLog::from_config(&config.audit),
        })
    }

    pub fn audit_log(&self) -> Option<&AuditLog> {
        self.audit.as_ref()
    }

    pub fn renderer(&self) -> &MermaidInkRenderer {
        &self.renderer
    }

    pub fn plan(&self, code: &str, selector: LanguageSelector) -> Result<ChunkPlan> {
        plan_submission(code, selector, &self.planner)
    }

    /// Produce a combined flowchart for `code`.
    ///
    /// Per-chunk generation failures degrade to placeholders; every other
    /// failure aborts the run. The audit record is best-effort.
    pub async fn run(&self, code: &str, selector: LanguageSelector) -> Result<FlowchartRun> {
        let ChunkPlan {
            language,
            structure,
            chunks,
        } = self.plan(code, selector)?;

        let mut status = vec![
            format!("Language: {language}"),
            format!("Code length: {} characters", code.chars().count()),
            format!("Lines: {}", count_lines(code)),
            format!(
                "Found {} functions, {} lines",
                structure.function_count, structure.total_lines
            ),
        ];

        if chunks.is_empty() {
            return Err(PipelineError::NothingToDiagram {
                lines: structure.total_lines,
            });
        }
        status.push(format!("Split into {} chunks", chunks.len()));

        log::info!(
            "Generating {} chunk diagrams for {} lines of {language}",
            chunks.len(),
            structure.total_lines
        );

        let mut fragments = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let fragment = generate_fragment(
                self.generator.as_ref(),
                chunk,
                index,
                chunks.len(),
                self.generation_timeout,
            )
            .await;
            let mut line = format!("Processing: {} (complexity: {})", chunk.name, chunk.complexity);
            if fragment.degraded {
                line.push_str(" [fallback]");
            }
            status.push(line);
            fragments.push(fragment);
        }
        status.push("All chunks processed".to_string());

        let mermaid_code = combine(&fragments);
        status.push(format!("Flowchart combined ({} fragments)", fragments.len()));

        let svg_url = self.renderer.render_url(&mermaid_code);
        let html_svg = html_embed(&svg_url);
        status.push("Render URL ready".to_string());
        status.push("Complete".to_string());

        let total_complexity = chunks
            .iter()
            .map(|chunk| chunk.complexity)
            .fold(0, u32::saturating_add);
        let analysis = Analysis {
            total_complexity,
            function_count: structure.function_count,
            total_lines: structure.total_lines,
            chunks: chunks.len(),
            language: language.to_string(),
        };
        status.extend([
            "Analysis:".to_string(),
            format!("  - Total Complexity: {total_complexity}"),
            format!("  - Functions: {}", structure.function_count),
            format!("  - Code Lines: {}", structure.total_lines),
        ]);

        if let Some(audit) = &self.audit {
            let record = audit.record(code, &svg_url, &mermaid_code, &analysis);
            if let Err(err) = audit.append(&record).await {
                log::warn!("Could not save audit record: {err}");
            }
        }

        Ok(FlowchartRun {
            language,
            mermaid_code,
            svg_url,
            html_svg,
            status,
            analysis,
            fragments,
        })
    }
}
