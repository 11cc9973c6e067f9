//! # Codeflow Chunker
//!
//! Static analysis front half of the flowchart pipeline.
//!
//! ## Pipeline
//!
//! ```text
//! Source text
//!     │
//!     ├──> Language sniffer (keyword heuristic, when "auto")
//!     │
//!     ├──> Structure extractor (tree-sitter walk)
//!     │      ├─ Function units (name, span, loops, conditionals, calls)
//!     │      └─ Top-level snippets
//!     │
//!     └──> Chunk planner
//!            ├─ ≤ threshold lines: one full-submission chunk
//!            └─ otherwise: one chunk per function + aggregate top-level chunk
//! ```
//!
//! ## Example
//!
//! ```
//! use codeflow_chunker::{extract_structure, sniff_language, ChunkPlanner};
//!
//! let code = "def double(x):\n    return x * 2\n";
//! let language = sniff_language(code);
//! let report = extract_structure(code, language).unwrap();
//! let chunks = ChunkPlanner::default().plan(&report, code);
//!
//! assert_eq!(report.function_count, 1);
//! assert_eq!(chunks.len(), 1);
//! ```

mod complexity;
mod error;
mod language;
mod planner;
mod structure;

pub use complexity::{estimate_complexity, BASE_COMPLEXITY, COMPLEXITY_KEYWORDS};
pub use error::{ChunkerError, Result};
pub use language::{sniff_language, Language, LanguageSelector};
pub use planner::{
    Chunk, ChunkKind, ChunkPlanner, DEFAULT_MAX_CHUNK_LINES, FULL_CHUNK_NAME,
    TOP_LEVEL_CHUNK_NAME, TOP_LEVEL_COMPLEXITY,
};
pub use structure::{
    extract_structure, CodeUnit, StructureExtractor, StructureReport, EXCLUDED_CALLS,
    MAX_TRAVERSAL_DEPTH, SNIPPET_MAX_CHARS, UNKNOWN_NAME,
};
