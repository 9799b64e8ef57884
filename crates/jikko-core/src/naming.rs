//! Handler identifier derivation.
//!
//! A command path such as `ai sd generate` maps to the identifier
//! `AI::SD::Generate`. Each segment is split on `_` and `-`, every piece is
//! capitalized, and the pieces are joined. Segments in [`ACRONYMS`] are
//! upper-cased whole instead.

/// Segments that upper-case whole rather than capitalize.
pub const ACRONYMS: &[&str] = &["ai", "sd", "api", "ui", "cf", "cl", "ps", "psn"];

pub const IDENTIFIER_SEPARATOR: &str = "::";

pub fn is_acronym(segment: &str) -> bool {
    ACRONYMS.iter().any(|a| a.eq_ignore_ascii_case(segment))
}

/// Camelize one path segment: `log_detailed` → `LogDetailed`, `cf` → `CF`.
pub fn camelize(segment: &str) -> String {
    if is_acronym(segment) {
        return segment.to_uppercase();
    }
    segment
        .split(['_', '-'])
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("")
}

/// Join camelized segments into the fully-qualified handler identifier.
pub fn handler_identifier<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| camelize(s.as_ref()))
        .collect::<Vec<_>>()
        .join(IDENTIFIER_SEPARATOR)
}

// First char upper, rest lower.
fn capitalize(piece: &str) -> String {
    let mut chars = piece.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}
