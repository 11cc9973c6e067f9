use crate::error::{ChunkerError, Result};
use crate::structure::StructureReport;
use serde::Serialize;

/// Submissions with at most this many lines are sent as a single chunk.
pub const DEFAULT_MAX_CHUNK_LINES: usize = 500;

pub const FULL_CHUNK_NAME: &str = "Main Flow";
pub const TOP_LEVEL_CHUNK_NAME: &str = "Main Execution";

/// Complexity assigned to the aggregate top-level chunk.
pub const TOP_LEVEL_COMPLEXITY: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChunkKind {
    /// The whole submission.
    Full,
    /// One extracted function.
    Function {
        has_loops: bool,
        has_conditionals: bool,
        calls: Vec<String>,
    },
    /// Every top-level snippet joined together.
    #[serde(rename = "main")]
    TopLevel,
}

impl ChunkKind {
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Function { .. } => "function",
            Self::TopLevel => "main",
        }
    }
}

/// A unit of code text submitted as one diagram request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub name: String,
    #[serde(flatten)]
    pub kind: ChunkKind,
    pub complexity: u32,
    pub code: String,
}

impl Chunk {
    pub fn has_loops(&self) -> bool {
        matches!(self.kind, ChunkKind::Function { has_loops: true, .. })
    }

    pub fn has_conditionals(&self) -> bool {
        matches!(
            self.kind,
            ChunkKind::Function {
                has_conditionals: true,
                ..
            }
        )
    }

    pub fn calls(&self) -> &[String] {
        match &self.kind {
            ChunkKind::Function { calls, .. } => calls,
            ChunkKind::Full | ChunkKind::TopLevel => &[],
        }
    }
}

/// Decides how a submission is split into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlanner {
    max_chunk_lines: usize,
}

impl Default for ChunkPlanner {
    fn default() -> Self {
        Self {
            max_chunk_lines: DEFAULT_MAX_CHUNK_LINES,
        }
    }
}

impl ChunkPlanner {
    pub fn new(max_chunk_lines: usize) -> Result<Self> {
        if max_chunk_lines == 0 {
            return Err(ChunkerError::InvalidThreshold(max_chunk_lines));
        }
        Ok(Self { max_chunk_lines })
    }

    pub const fn max_chunk_lines(&self) -> usize {
        self.max_chunk_lines
    }

    /// Plan chunks for one submission.
    ///
    /// The returned list may be empty (a long submission with neither
    /// functions nor top-level statements); callers treat that as having
    /// nothing to diagram.
    pub fn plan(&self, report: &StructureReport, code: &str) -> Vec<Chunk> {
        if report.total_lines <= self.max_chunk_lines {
            return vec![Chunk {
                name: FULL_CHUNK_NAME.to_string(),
                kind: ChunkKind::Full,
                complexity: report.total_unit_complexity(),
                code: code.to_string(),
            }];
        }

        let mut chunks: Vec<Chunk> = report
            .units
            .iter()
            .map(|unit| Chunk {
                name: unit.name.clone(),
                kind: ChunkKind::Function {
                    has_loops: unit.has_loops,
                    has_conditionals: unit.has_conditionals,
                    calls: unit.calls.clone(),
                },
                complexity: unit.complexity,
                code: unit.code.clone(),
            })
            .collect();

        if !report.top_level.is_empty() {
            chunks.push(Chunk {
                name: TOP_LEVEL_CHUNK_NAME.to_string(),
                kind: ChunkKind::TopLevel,
                complexity: TOP_LEVEL_COMPLEXITY,
                code: report.top_level.join("\n"),
            });
        }

        log::debug!(
            "Planned {} chunks for {} lines (threshold {})",
            chunks.len(),
            report.total_lines,
            self.max_chunk_lines
        );

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_threshold_rejected() {
        assert!(ChunkPlanner::new(0).is_err());
        assert_eq!(ChunkPlanner::new(10).unwrap().max_chunk_lines(), 10);
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(ChunkKind::Full.tag(), "full");
        assert_eq!(ChunkKind::TopLevel.tag(), "main");
        let function = ChunkKind::Function {
            has_loops: true,
            has_conditionals: false,
            calls: vec!["helper".into()],
        };
        assert_eq!(function.tag(), "function");
    }

    #[test]
    fn test_full_chunk_has_no_function_metadata() {
        let chunk = Chunk {
            name: FULL_CHUNK_NAME.into(),
            kind: ChunkKind::Full,
            complexity: 0,
            code: String::new(),
        };
        assert!(!chunk.has_loops());
        assert!(!chunk.has_conditionals());
        assert!(chunk.calls().is_empty());
    }
}
