//! Raw and output token types

use crate::utils::Position;
use serde::{Deserialize, Serialize};

/// Channel of tokens that are kept
pub const DEFAULT_CHANNEL: u32 = 0;

/// Channel for whitespace and comments
pub const HIDDEN_CHANNEL: u32 = 1;

/// Category reserved for end of input. Engines never emit it.
pub const EOF_CATEGORY: u32 = 0;

/// A token as produced by a lexer engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    /// Exact matched substring
    pub literal: String,
    /// Token type id in the engine's vocabulary
    pub category: u32,
    pub channel: u32,
    /// Start of the match
    pub position: Position,
}

impl RawToken {
    pub fn new(literal: impl Into<String>, category: u32, channel: u32, position: Position) -> Self {
        Self {
            literal: literal.into(),
            category,
            channel,
            position,
        }
    }

    pub fn is_default_channel(&self) -> bool {
        self.channel == DEFAULT_CHANNEL
    }
}

/// One element of an output artifact.
///
/// Serializes as `{"terminal": ..., "literal": ...}` in that key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Identifier-safe terminal name
    pub terminal: String,
    /// Original source text
    pub literal: String,
}

impl TokenRecord {
    pub fn new(terminal: impl Into<String>, literal: impl Into<String>) -> Self {
        Self {
            terminal: terminal.into(),
            literal: literal.into(),
        }
    }
}
