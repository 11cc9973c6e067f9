use crate::error::{ChunkerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source language understood by the structure extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    C,
}

impl Language {
    pub const ALL: [Self; 3] = [Self::Python, Self::JavaScript, Self::C];

    /// Get language name as string
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::C => "c",
        }
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::C => tree_sitter_c::LANGUAGE.into(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ChunkerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "python" => Ok(Self::Python),
            "javascript" => Ok(Self::JavaScript),
            "c" => Ok(Self::C),
            other => Err(ChunkerError::unsupported_language(other)),
        }
    }
}

/// Language choice attached to a submission: either sniffed or given explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LanguageSelector {
    #[default]
    Auto,
    Explicit(Language),
}

impl LanguageSelector {
    /// Every accepted selector string, in display order.
    pub const ACCEPTED: [&'static str; 4] = ["auto", "python", "javascript", "c"];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Explicit(lang) => lang.as_str(),
        }
    }

    /// Resolve to a concrete language, sniffing `code` when the selector is `auto`.
    pub fn resolve(self, code: &str) -> Language {
        match self {
            Self::Auto => sniff_language(code),
            Self::Explicit(lang) => lang,
        }
    }
}

impl fmt::Display for LanguageSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageSelector {
    type Err = ChunkerError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "auto" {
            return Ok(Self::Auto);
        }
        s.parse().map(Self::Explicit)
    }
}

impl Serialize for LanguageSelector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LanguageSelector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

const PYTHON_LEADING: &[&str] = &["def ", "class ", "import ", "from ", "async "];
const JAVASCRIPT_MARKERS: &[&str] = &["function ", "const ", "=>", "class "];

/// Keyword-sniffing heuristic, not a classifier.
///
/// Looks only at superficial markers in the trimmed text, in priority order:
/// Python leading keywords, then C include/`main(` patterns, then JavaScript
/// syntax markers. Anything else (including empty input) is treated as Python.
pub fn sniff_language(code: &str) -> Language {
    let s = code.trim();
    if PYTHON_LEADING.iter().any(|kw| s.starts_with(kw)) {
        return Language::Python;
    }
    if s.starts_with("#include") || s.contains(" main(") {
        return Language::C;
    }
    if JAVASCRIPT_MARKERS.iter().any(|marker| s.contains(marker)) {
        return Language::JavaScript;
    }
    Language::Python
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_python_leading_keywords() {
        assert_eq!(sniff_language("def foo():\n    pass"), Language::Python);
        assert_eq!(sniff_language("  import os\n"), Language::Python);
        assert_eq!(sniff_language("class Foo {}"), Language::Python);
    }

    #[test]
    fn test_sniff_c() {
        assert_eq!(sniff_language("#include <stdio.h>\nint main() {}"), Language::C);
        assert_eq!(sniff_language("int main(void) { return 0; }"), Language::C);
    }

    #[test]
    fn test_sniff_javascript() {
        assert_eq!(sniff_language("let f = (a) => a + 1;"), Language::JavaScript);
        assert_eq!(sniff_language("x = 1;\nfunction go() {}"), Language::JavaScript);
    }

    #[test]
    fn test_sniff_defaults_to_python() {
        assert_eq!(sniff_language(""), Language::Python);
        assert_eq!(sniff_language("x = 1\ny = 2\n"), Language::Python);
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!("auto".parse::<LanguageSelector>().unwrap(), LanguageSelector::Auto);
        assert_eq!(
            "c".parse::<LanguageSelector>().unwrap(),
            LanguageSelector::Explicit(Language::C)
        );
        assert!("rust".parse::<LanguageSelector>().is_err());
        assert!("Python".parse::<LanguageSelector>().is_err());
    }

    #[test]
    fn test_selector_resolve() {
        assert_eq!(LanguageSelector::Auto.resolve("#include <x.h>"), Language::C);
        assert_eq!(
            LanguageSelector::Explicit(Language::JavaScript).resolve("def f(): pass"),
            Language::JavaScript
        );
    }

    #[test]
    fn test_tree_sitter_language_loads() {
        for lang in Language::ALL {
            let mut parser = tree_sitter::Parser::new();
            assert!(parser.set_language(&lang.tree_sitter_language()).is_ok());
        }
    }
}
