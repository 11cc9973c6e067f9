use crate::generator::DiagramFragment;
use crate::sanitize::{has_directive, DEFAULT_DIRECTIVE};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

pub const START_NODE: &str = "START([Program Start])";
pub const END_NODE: &str = "END([Program End])";

const INDENT: &str = "    ";

static NODE_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|-->|---|==>|-\.->)\s*(?:\|[^|]*\|\s*)?([A-Za-z_][A-Za-z0-9_]*)")
        .expect("node id regex must compile")
});

const NON_NODE_WORDS: &[&str] = &[
    "subgraph", "end", "style", "classDef", "class", "linkStyle", "click", "direction",
];

/// Subgraph identifier for the fragment at `index`.
pub fn subgraph_id(index: usize) -> String {
    format!("SUB{index}")
}

/// Merge per-chunk fragments into one diagram.
///
/// A single fragment is returned unchanged. Otherwise every fragment becomes a
/// `SUB<i>` subgraph chained between synthetic start and end nodes. Fragment
/// lines are copied verbatim; node ids that appear in more than one fragment
/// are reported but not renamed.
pub fn combine(fragments: &[DiagramFragment]) -> String {
    match fragments {
        [] => String::new(),
        [only] => only.source.clone(),
        _ => combine_many(fragments),
    }
}

fn combine_many(fragments: &[DiagramFragment]) -> String {
    let shared = shared_node_ids(fragments);
    if !shared.is_empty() {
        log::warn!(
            "Node ids shared across diagram fragments may collide: {}",
            shared.join(", ")
        );
    }

    let mut out = String::new();
    let _ = writeln!(out, "{DEFAULT_DIRECTIVE}");
    let _ = writeln!(out, "{INDENT}{START_NODE}");

    for (index, fragment) in fragments.iter().enumerate() {
        let _ = writeln!(
            out,
            "{INDENT}subgraph {}[{}]",
            subgraph_id(index),
            fragment.chunk_name.replace(' ', "_")
        );
        for line in body_lines(&fragment.source) {
            let _ = writeln!(out, "{INDENT}{line}");
        }
        let _ = writeln!(out, "{INDENT}end");
    }

    let _ = writeln!(out, "{INDENT}START --> {}", subgraph_id(0));
    for index in 1..fragments.len() {
        let _ = writeln!(
            out,
            "{INDENT}{} --> {}",
            subgraph_id(index - 1),
            subgraph_id(index)
        );
    }
    let _ = write!(
        out,
        "{INDENT}{} --> {END_NODE}",
        subgraph_id(fragments.len() - 1)
    );

    out
}

fn body_lines(source: &str) -> impl Iterator<Item = &str> {
    source
        .lines()
        .filter(|line| !line.trim().is_empty() && !has_directive(line))
}

/// Node ids referenced by more than one fragment, sorted.
pub fn shared_node_ids(fragments: &[DiagramFragment]) -> Vec<String> {
    let mut owners: BTreeMap<String, usize> = BTreeMap::new();
    for fragment in fragments {
        let ids: BTreeSet<&str> = body_lines(&fragment.source)
            .flat_map(|line| NODE_ID_RE.captures_iter(line.trim_start()))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .filter(|id| !NON_NODE_WORDS.contains(id))
            .collect();
        for id in ids {
            *owners.entry(id.to_string()).or_default() += 1;
        }
    }
    owners
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fragment(name: &str, source: &str) -> DiagramFragment {
        DiagramFragment {
            chunk_name: name.into(),
            source: source.into(),
            degraded: false,
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(combine(&[]), "");
    }

    #[test]
    fn test_single_fragment_passthrough() {
        let only = fragment("Main Flow", "graph TD\n\n    C0_1[x]  \n");
        assert_eq!(combine(std::slice::from_ref(&only)), only.source);
    }

    #[test]
    fn test_two_fragments_layout() {
        let combined = combine(&[
            fragment("fibonacci", "graph TD\n    C0_1([Start])\n\n    C0_1 --> C0_2"),
            fragment("Main Execution", "flowchart TD\n    C1_1[print]"),
        ]);
        let expected = "graph TD
    START([Program Start])
    subgraph SUB0[fibonacci]
        C0_1([Start])
        C0_1 --> C0_2
    end
    subgraph SUB1[Main_Execution]
        C1_1[print]
    end
    START --> SUB0
    SUB0 --> SUB1
    SUB1 --> END([Program End])";
        assert_eq!(combined, expected);
    }

    #[test]
    fn test_shared_ids_detected() {
        let fragments = [
            fragment("a", "graph TD\n    A1[x] --> A2[y]"),
            fragment("b", "graph TD\n    A1[z] -->|Yes| B2"),
            fragment("c", "graph TD\n    C2_1[w]"),
        ];
        assert_eq!(shared_node_ids(&fragments), vec!["A1".to_string()]);
    }

    #[test]
    fn test_prefixed_ids_do_not_collide() {
        let fragments = [
            fragment("a", "graph TD\n    C0_1[x] --> C0_2{y?}\n    subgraph inner\n    end"),
            fragment("b", "graph TD\n    C1_1[x] --> C1_2"),
        ];
        assert!(shared_node_ids(&fragments).is_empty());
    }
}
