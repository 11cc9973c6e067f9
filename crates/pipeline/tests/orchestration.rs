use async_trait::async_trait;
use codeflow_chunker::{Language, LanguageSelector};
use codeflow_diagram::{DiagramError, DiagramGenerator};
use codeflow_pipeline::{CodeflowConfig, FailureKind, Pipeline, PipelineError};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const TWO_FUNCTIONS: &str = "def fibonacci(n):
    if n <= 1:
        return n
    return fibonacci(n - 1) + fibonacci(n - 2)

def process_numbers(limit):
    for i in range(limit):
        print(fibonacci(i))
";

/// Answers every prompt with a fixed two-node diagram, counting calls.
#[derive(Default)]
struct Scripted {
    calls: AtomicUsize,
}

#[async_trait]
impl DiagramGenerator for Scripted {
    async fn complete(&self, prompt: &str) -> codeflow_diagram::Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(prompt.contains(&format!("must start with C{n}_")));
        Ok(format!(
            "```mermaid\ngraph TD\n    C{n}_1([Start]) --> C{n}_2([End])\n```"
        ))
    }
}

struct Unavailable;

#[async_trait]
impl DiagramGenerator for Unavailable {
    async fn complete(&self, _prompt: &str) -> codeflow_diagram::Result<String> {
        Err(DiagramError::Status {
            status: 503,
            body: "try later".into(),
        })
    }
}

fn config_in(dir: &Path, max_chunk_lines: usize) -> CodeflowConfig {
    let mut config = CodeflowConfig::default();
    config.audit.dir = dir.join("logs");
    config.chunking.max_chunk_lines = max_chunk_lines;
    config
}

#[tokio::test]
async fn short_submission_is_one_full_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let generator = Arc::new(Scripted::default());
    let pipeline = Pipeline::new(generator.clone(), &config_in(dir.path(), 500)).unwrap();

    let run = pipeline
        .run("x = 1\ny = 2\n", LanguageSelector::Auto)
        .await
        .unwrap();

    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(run.language, Language::Python);
    assert_eq!(run.mermaid_code, "graph TD\n    C0_1([Start]) --> C0_2([End])");
    assert_eq!(run.analysis.total_complexity, 0);
    assert_eq!(run.analysis.function_count, 0);
    assert_eq!(run.analysis.total_lines, 2);
    assert_eq!(run.analysis.chunks, 1);
    assert!(run.status.contains(&"Processing: Main Flow (complexity: 0)".to_string()));
    assert_eq!(
        pipeline.renderer().decode_payload(&run.svg_url),
        Some(run.mermaid_code.clone())
    );
    assert!(run.html_svg.contains(&run.svg_url));

    let audit = pipeline.audit_log().unwrap();
    let latest = audit.latest().await.unwrap().unwrap();
    assert_eq!(latest.svg_url, run.svg_url);
    assert_eq!(latest.code, "x = 1\ny = 2\n");
    assert_eq!(latest.language, "python");
}

#[tokio::test]
async fn long_submission_splits_per_function() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(Arc::new(Scripted::default()), &config_in(dir.path(), 5)).unwrap();

    let run = pipeline
        .run(TWO_FUNCTIONS, LanguageSelector::Explicit(Language::Python))
        .await
        .unwrap();

    assert_eq!(run.analysis.chunks, 2);
    assert_eq!(run.analysis.function_count, 2);
    assert_eq!(run.analysis.total_complexity, 5);

    let subgraphs: Vec<&str> = run
        .mermaid_code
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("subgraph "))
        .collect();
    assert_eq!(
        subgraphs,
        vec!["subgraph SUB0[fibonacci]", "subgraph SUB1[process_numbers]"]
    );
    assert!(run.mermaid_code.ends_with("SUB1 --> END([Program End])"));

    let processing: Vec<&String> = run
        .status
        .iter()
        .filter(|line| line.starts_with("Processing: "))
        .collect();
    assert_eq!(
        processing,
        vec![
            "Processing: fibonacci (complexity: 2)",
            "Processing: process_numbers (complexity: 3)",
        ]
    );
}

#[tokio::test]
async fn generator_outage_degrades_every_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(Arc::new(Unavailable), &config_in(dir.path(), 5)).unwrap();

    let run = pipeline
        .run(TWO_FUNCTIONS, LanguageSelector::Auto)
        .await
        .unwrap();

    assert_eq!(run.degraded_chunks(), vec!["fibonacci", "process_numbers"]);
    assert!(run.mermaid_code.contains("ERR[Error: fibonacci]"));
    assert!(run
        .status_text()
        .contains("Processing: process_numbers (complexity: 3) [fallback]"));
}

#[tokio::test]
async fn blank_code_rejected_before_generation() {
    let dir = tempfile::tempdir().unwrap();
    let generator = Arc::new(Scripted::default());
    let pipeline = Pipeline::new(generator.clone(), &config_in(dir.path(), 500)).unwrap();

    let err = pipeline
        .run("  \n\t\n", LanguageSelector::Auto)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::InvalidArgument);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    assert!(!dir.path().join("logs").exists());
}

#[tokio::test]
async fn comments_only_over_threshold_has_nothing_to_diagram() {
    let dir = tempfile::tempdir().unwrap();
    let generator = Arc::new(Scripted::default());
    let pipeline = Pipeline::new(generator.clone(), &config_in(dir.path(), 1)).unwrap();

    let err = pipeline
        .run("# first\n# second\n", LanguageSelector::Explicit(Language::Python))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::NothingToDiagram { lines: 2 }));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn disabled_audit_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path(), 500);
    config.audit.enabled = false;
    let pipeline = Pipeline::new(Arc::new(Scripted::default()), &config).unwrap();

    pipeline.run("x = 1", LanguageSelector::Auto).await.unwrap();

    assert!(pipeline.audit_log().is_none());
    assert!(!dir.path().join("logs").exists());
}

#[test]
fn plan_without_model_call() {
    let pipeline = Pipeline::new(Arc::new(Scripted::default()), &CodeflowConfig::default()).unwrap();
    let plan = pipeline
        .plan("int main() { return 0; }", LanguageSelector::Auto)
        .unwrap();

    assert_eq!(plan.language, Language::C);
    assert_eq!(plan.structure.units[0].name, "main");
    assert_eq!(plan.chunks.len(), 1);
}
