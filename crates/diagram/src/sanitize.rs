use once_cell::sync::Lazy;
use regex::Regex;

/// Directive prepended to fragments that lack one.
pub const DEFAULT_DIRECTIVE: &str = "graph TD";

const FENCE: &str = "```";
const MERMAID_FENCE: &str = "```mermaid";

static DIRECTIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(graph|flowchart)\b").expect("directive regex must compile"));

/// Whether `text` opens with a flowchart directive (`graph`/`flowchart`, any direction).
pub fn has_directive(text: &str) -> bool {
    DIRECTIVE_RE.is_match(text)
}

/// Turn a raw model reply into a Mermaid fragment.
pub fn sanitize_completion(raw: &str) -> String {
    let body = extract_fenced(raw).trim();
    if has_directive(body) {
        body.to_string()
    } else {
        format!("{DEFAULT_DIRECTIVE}\n{body}")
    }
}

fn extract_fenced(raw: &str) -> &str {
    if let Some(pos) = raw.find(MERMAID_FENCE) {
        return until_closing_fence(&raw[pos + MERMAID_FENCE.len()..]);
    }

    if let Some(pos) = raw.find(FENCE) {
        let inner = until_closing_fence(&raw[pos + FENCE.len()..]);
        return strip_info_line(inner);
    }

    raw
}

fn until_closing_fence(text: &str) -> &str {
    text.find(FENCE).map_or(text, |end| &text[..end])
}

/// Drop a leading info string such as `mmd` from a generic fence body.
fn strip_info_line(inner: &str) -> &str {
    let Some((first, rest)) = inner.split_once('\n') else {
        return inner;
    };
    let first = first.trim();
    if first.is_empty() || (!first.contains(char::is_whitespace) && !has_directive(first)) {
        rest
    } else {
        inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mermaid_fence_extracted() {
        let raw = "Here you go:\n```mermaid\ngraph TD\n    C0_1[Start]\n```\nEnjoy!";
        assert_eq!(sanitize_completion(raw), "graph TD\n    C0_1[Start]");
    }

    #[test]
    fn test_generic_fence_with_info_line() {
        let raw = "```mmd\nflowchart LR\n    C0_1 --> C0_2\n```";
        assert_eq!(sanitize_completion(raw), "flowchart LR\n    C0_1 --> C0_2");
    }

    #[test]
    fn test_generic_fence_without_info_line() {
        let raw = "```\ngraph TD\n    C1_1[x]\n```";
        assert_eq!(sanitize_completion(raw), "graph TD\n    C1_1[x]");
    }

    #[test]
    fn test_missing_directive_prepended() {
        assert_eq!(
            sanitize_completion("  C0_1[Start] --> C0_2[End]  "),
            "graph TD\nC0_1[Start] --> C0_2[End]"
        );
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let raw = "```mermaid\ngraph TD\n    C0_1[Only]";
        assert_eq!(sanitize_completion(raw), "graph TD\n    C0_1[Only]");
    }

    #[test]
    fn test_directive_detection() {
        assert!(has_directive("graph TD"));
        assert!(has_directive("  flowchart LR\nA-->B"));
        assert!(has_directive("graph"));
        assert!(!has_directive("graphic TD"));
        assert!(!has_directive("sequenceDiagram"));
    }
}
