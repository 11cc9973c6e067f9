//! Lexical complexity heuristic.
//!
//! This is a keyword count, not a cyclomatic complexity computed over
//! control-flow edges. It overcounts keywords inside strings and comments,
//! and substring matching means `elif ` also counts as `if ` and `for ` also
//! counts as `or `. Treat the score as an ordinal signal only.

/// Keywords counted by [`estimate_complexity`], each including its trailing space.
pub const COMPLEXITY_KEYWORDS: [&str; 6] = ["if ", "elif ", "for ", "while ", "and ", "or "];

/// Baseline score for text containing no counted keyword.
pub const BASE_COMPLEXITY: u32 = 1;

/// Estimate complexity as `1 + occurrences` of every keyword in [`COMPLEXITY_KEYWORDS`].
#[must_use]
pub fn estimate_complexity(text: &str) -> u32 {
    COMPLEXITY_KEYWORDS
        .iter()
        .map(|kw| u32::try_from(text.matches(kw).count()).unwrap_or(u32::MAX))
        .fold(BASE_COMPLEXITY, u32::saturating_add)
}
