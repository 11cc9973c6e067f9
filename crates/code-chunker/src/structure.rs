use crate::complexity::estimate_complexity;
use crate::error::{ChunkerError, Result};
use crate::language::Language;
use serde::Serialize;
use tree_sitter::{Node, Parser};

/// Nodes deeper than this are not visited.
pub const MAX_TRAVERSAL_DEPTH: usize = 20;

/// Expression/assignment statements deeper than this are not recorded as top-level snippets.
pub const SNIPPET_MAX_DEPTH: usize = 2;

/// Top-level snippets keep at most this many characters of their first line.
pub const SNIPPET_MAX_CHARS: usize = 80;

/// Callee names never reported as calls.
pub const EXCLUDED_CALLS: &[&str] = &["print", "len", "range", "str", "int", "float"];

/// Name given to a function whose identifier could not be located.
pub const UNKNOWN_NAME: &str = "unknown";

const FUNCTION_KINDS: &[&str] = &["function_definition", "function_declaration", "method_definition"];
const LOOP_KINDS: &[&str] = &["for_statement", "while_statement", "for_in_statement", "do_statement"];
const CONDITIONAL_KINDS: &[&str] = &["if_statement"];
const CALL_KINDS: &[&str] = &["call", "call_expression"];
const CALLEE_KINDS: &[&str] = &["identifier", "attribute", "member_expression", "field_expression"];
const NAME_KINDS: &[&str] = &["identifier", "property_identifier"];
const SNIPPET_KINDS: &[&str] = &["expression_statement", "assignment"];

/// A function-like construct found in the parse tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeUnit {
    pub name: String,
    /// 0-based row of the first line.
    pub start_line: usize,
    /// 0-based row of the last line (`>= start_line`).
    pub end_line: usize,
    pub code: String,
    pub has_loops: bool,
    pub has_conditionals: bool,
    /// Callee names in traversal order, duplicates kept.
    pub calls: Vec<String>,
    pub complexity: u32,
}

impl CodeUnit {
    pub fn new(
        name: impl Into<String>,
        start_line: usize,
        end_line: usize,
        code: impl Into<String>,
        has_loops: bool,
        has_conditionals: bool,
        calls: Vec<String>,
    ) -> Self {
        let code = code.into();
        let complexity = estimate_complexity(&code);
        Self {
            name: name.into(),
            start_line,
            end_line: end_line.max(start_line),
            code,
            has_loops,
            has_conditionals,
            calls,
            complexity,
        }
    }
}

/// Result of one extraction pass over a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructureReport {
    /// Units in depth-first traversal order.
    pub units: Vec<CodeUnit>,
    /// First lines of shallow expression/assignment statements, one entry per
    /// matching node in encounter order (nested matches repeat).
    pub top_level: Vec<String>,
    pub total_lines: usize,
    pub function_count: usize,
}

impl StructureReport {
    #[must_use]
    pub fn total_unit_complexity(&self) -> u32 {
        self.units
            .iter()
            .map(|unit| unit.complexity)
            .fold(0, u32::saturating_add)
    }
}

/// Walks a tree-sitter parse of one language and collects [`CodeUnit`]s.
pub struct StructureExtractor {
    language: Language,
    parser: Parser,
}

impl StructureExtractor {
    pub fn new(language: Language) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.tree_sitter_language())
            .map_err(|e| ChunkerError::Grammar {
                language: language.as_str(),
                message: e.to_string(),
            })?;

        Ok(Self { language, parser })
    }

    pub const fn language(&self) -> Language {
        self.language
    }

    /// Extract units and top-level snippets from `code`.
    ///
    /// Syntax errors never fail extraction: tree-sitter recovers and the
    /// walk simply sees fewer function nodes.
    pub fn extract(&mut self, code: &str) -> StructureReport {
        let mut report = StructureReport {
            total_lines: code.lines().count(),
            ..StructureReport::default()
        };

        let Some(tree) = self.parser.parse(code, None) else {
            log::warn!(
                "{} parser produced no tree; reporting zero functions",
                self.language
            );
            return report;
        };

        Self::traverse(tree.root_node(), code, 0, &mut report);
        report.function_count = report.units.len();

        log::debug!(
            "Extracted {} functions and {} top-level snippets from {} lines of {}",
            report.function_count,
            report.top_level.len(),
            report.total_lines,
            self.language
        );

        report
    }

    fn traverse(node: Node, source: &str, depth: usize, report: &mut StructureReport) {
        if depth > MAX_TRAVERSAL_DEPTH {
            return;
        }

        let kind = node.kind();
        if FUNCTION_KINDS.contains(&kind) {
            report.units.push(Self::code_unit(node, source));
        } else if SNIPPET_KINDS.contains(&kind) && depth <= SNIPPET_MAX_DEPTH {
            // A Python assignment inside its expression_statement is recorded again.
            report.top_level.push(first_line_truncated(&node_text(node, source)));
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            Self::traverse(child, source, depth + 1, report);
        }
    }

    fn code_unit(node: Node, source: &str) -> CodeUnit {
        let name = Self::function_name(node, source).unwrap_or_else(|| UNKNOWN_NAME.to_string());

        let has_loops = Self::has_direct_child(node, LOOP_KINDS);
        let has_conditionals = Self::has_direct_child(node, CONDITIONAL_KINDS);

        let mut calls = Vec::new();
        Self::collect_calls(node, source, &mut calls);

        CodeUnit::new(
            name,
            node.start_position().row,
            node.end_position().row,
            node_text(node, source),
            has_loops,
            has_conditionals,
            calls,
        )
    }

    fn function_name(node: Node, source: &str) -> Option<String> {
        let mut cursor = node.walk();
        let direct = node
            .children(&mut cursor)
            .find(|child| NAME_KINDS.contains(&child.kind()));
        if let Some(ident) = direct {
            return Some(node_text(ident, source));
        }

        // C keeps the name inside (possibly nested) declarators.
        let mut declarator = node.child_by_field_name("declarator");
        while let Some(current) = declarator {
            if NAME_KINDS.contains(&current.kind()) {
                return Some(node_text(current, source));
            }
            declarator = current.child_by_field_name("declarator");
        }
        None
    }

    /// Only the function node's own children count; statements nested in its
    /// body block do not.
    fn has_direct_child(node: Node, kinds: &[&str]) -> bool {
        let mut cursor = node.walk();
        let found = node
            .children(&mut cursor)
            .any(|child| kinds.contains(&child.kind()));
        found
    }

    fn collect_calls(node: Node, source: &str, calls: &mut Vec<String>) {
        if CALL_KINDS.contains(&node.kind()) {
            if let Some(callee) = node
                .child_by_field_name("function")
                .filter(|callee| CALLEE_KINDS.contains(&callee.kind()))
            {
                let name = node_text(callee, source);
                if !EXCLUDED_CALLS.contains(&name.as_str()) {
                    calls.push(name);
                }
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            Self::collect_calls(child, source, calls);
        }
    }
}

/// Convenience wrapper: build an extractor for `language` and run it once.
pub fn extract_structure(code: &str, language: Language) -> Result<StructureReport> {
    Ok(StructureExtractor::new(language)?.extract(code))
}

fn node_text(node: Node, source: &str) -> String {
    source
        .get(node.byte_range())
        .map_or_else(
            || String::from_utf8_lossy(&source.as_bytes()[node.byte_range()]).into_owned(),
            str::to_string,
        )
}

fn first_line_truncated(text: &str) -> String {
    text.lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(SNIPPET_MAX_CHARS)
        .collect()
}
