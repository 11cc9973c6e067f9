use crate::error::{DiagramError, Result};
use crate::prompt::build_prompt;
use crate::sanitize::sanitize_completion;
use async_trait::async_trait;
use codeflow_chunker::Chunk;
use serde::Serialize;
use std::time::Duration;

/// Something that turns a prompt into raw model text.
#[async_trait]
pub trait DiagramGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Mermaid text produced for one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramFragment {
    pub chunk_name: String,
    pub source: String,
    /// `true` when `source` is the error placeholder rather than model output.
    pub degraded: bool,
}

impl DiagramFragment {
    pub fn placeholder(chunk_name: &str) -> Self {
        Self {
            chunk_name: chunk_name.to_string(),
            source: fallback_diagram(chunk_name),
            degraded: true,
        }
    }
}

pub fn fallback_diagram(chunk_name: &str) -> String {
    format!("graph TD\n    ERR[Error: {chunk_name}]")
}

/// Request a diagram for `chunk` and post-process the reply.
///
/// Never fails: a generator error or timeout yields the placeholder
/// fragment with `degraded` set.
pub async fn generate_fragment(
    generator: &dyn DiagramGenerator,
    chunk: &Chunk,
    index: usize,
    total: usize,
    timeout: Duration,
) -> DiagramFragment {
    let prompt = build_prompt(chunk, index, total);

    let outcome = match tokio::time::timeout(timeout, generator.complete(&prompt)).await {
        Ok(result) => result,
        Err(_) => Err(DiagramError::Timeout(timeout)),
    };

    match outcome {
        Ok(raw) => DiagramFragment {
            chunk_name: chunk.name.clone(),
            source: sanitize_completion(&raw),
            degraded: false,
        },
        Err(err) => {
            log::warn!(
                "Diagram generation failed for chunk '{}' ({}transient): {err}",
                chunk.name,
                if err.is_transient() { "" } else { "non-" }
            );
            DiagramFragment::placeholder(&chunk.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeflow_chunker::ChunkKind;
    use pretty_assertions::assert_eq;

    struct Failing;

    #[async_trait]
    impl DiagramGenerator for Failing {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(DiagramError::EmptyCompletion)
        }
    }

    struct Slow;

    #[async_trait]
    impl DiagramGenerator for Slow {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("graph TD\n    C0_1[late]".into())
        }
    }

    struct Echo(&'static str);

    #[async_trait]
    impl DiagramGenerator for Echo {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn chunk() -> Chunk {
        Chunk {
            name: "fibonacci".into(),
            kind: ChunkKind::Full,
            complexity: 2,
            code: "def fibonacci(n): ...".into(),
        }
    }

    #[tokio::test]
    async fn test_failure_degrades_to_placeholder() {
        let fragment = generate_fragment(&Failing, &chunk(), 0, 1, Duration::from_secs(5)).await;
        assert!(fragment.degraded);
        assert_eq!(fragment.source, "graph TD\n    ERR[Error: fibonacci]");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_degrades_to_placeholder() {
        let fragment = generate_fragment(&Slow, &chunk(), 0, 1, Duration::from_secs(1)).await;
        assert!(fragment.degraded);
        assert_eq!(fragment.chunk_name, "fibonacci");
    }

    #[tokio::test]
    async fn test_reply_is_sanitized() {
        let generator = Echo("```mermaid\nC0_1[Start] --> C0_2[End]\n```");
        let fragment = generate_fragment(&generator, &chunk(), 0, 1, Duration::from_secs(5)).await;
        assert!(!fragment.degraded);
        assert_eq!(fragment.source, "graph TD\nC0_1[Start] --> C0_2[End]");
    }
}
