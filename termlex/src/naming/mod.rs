//! Terminal naming: identifier legality, the curated substitution table and
//! the normalizer that combines them.
//!
//! A normalized name only ever contains `[A-Za-z0-9_]`.

mod normalizer;
mod substitution;

pub use normalizer::TerminalNormalizer;
pub use substitution::{SubstitutionError, SubstitutionTable};

/// Whether `c` may appear in a normalized terminal name
pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns false iff `s` contains a character outside `[A-Za-z0-9_]`.
///
/// The empty string is legal.
pub fn is_legal(s: &str) -> bool {
    s.chars().all(is_identifier_char)
}
