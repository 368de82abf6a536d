//! Engine error types

use crate::file_processor::FileProcessorError;
use crate::logging::codes;
use crate::utils::Position;
use std::path::PathBuf;

/// Errors raised while reading a grammar source into an engine
#[derive(Debug, Clone, thiserror::Error)]
pub enum GrammarError {
    #[error("Grammar syntax error at {line}:{column}: {message}")]
    Syntax {
        line: u32,
        column: u32,
        message: String,
    },

    #[error("Rule {rule} references undefined rule {reference}")]
    UndefinedRule { rule: String, reference: String },

    #[error("Rule {rule} references channel {channel}, which is not declared")]
    UnknownChannel { rule: String, channel: String },

    #[error("Rule {rule} is recursive through {path}")]
    RecursiveRule { rule: String, path: String },

    #[error("Rule {rule} cannot be compiled: {message}")]
    InvalidPattern { rule: String, message: String },

    #[error("Unsupported grammar construct at line {line}: {construct}")]
    Unsupported { construct: String, line: u32 },

    #[error("Too many token rules: {count} (max {max})")]
    TooManyRules { count: usize, max: usize },
}

impl GrammarError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            GrammarError::Syntax { .. } => codes::grammar::GRAMMAR_SYNTAX_ERROR,
            GrammarError::UndefinedRule { .. } | GrammarError::UnknownChannel { .. } => {
                codes::grammar::UNDEFINED_RULE
            }
            GrammarError::RecursiveRule { .. } => codes::grammar::RECURSIVE_RULE,
            GrammarError::InvalidPattern { .. } => codes::grammar::INVALID_PATTERN,
            GrammarError::Unsupported { .. } => codes::grammar::UNSUPPORTED_CONSTRUCT,
            GrammarError::TooManyRules { .. } => codes::grammar::TOO_MANY_RULES,
        }
    }
}

/// Errors raised while lexing one input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("No viable alternative at {position}: {text:?}")]
    NoViableAlternative { position: Position, text: String },

    #[error("Unterminated string literal starting at {position}")]
    UnterminatedString { position: Position },

    #[error("Unindent at {position} does not match any outer indentation level")]
    InconsistentDedent { position: Position },

    #[error("Too many tokens: more than {max}")]
    TooManyTokens { max: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::NoViableAlternative { .. } => codes::lexical::NO_VIABLE_ALTERNATIVE,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::InconsistentDedent { .. } => codes::lexical::INCONSISTENT_DEDENT,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            LexerError::NoViableAlternative { position, .. }
            | LexerError::UnterminatedString { position }
            | LexerError::InconsistentDedent { position } => Some(*position),
            LexerError::TooManyTokens { .. } => None,
        }
    }
}

/// Failures of the lexer engine boundary
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("Cannot read grammar: {0}")]
    GrammarSource(#[from] FileProcessorError),

    #[error("Invalid grammar {path}: {source}")]
    Grammar {
        path: PathBuf,
        #[source]
        source: GrammarError,
    },

    #[error(transparent)]
    Lexer(#[from] LexerError),
}

impl EngineError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            EngineError::GrammarSource(e) => e.error_code(),
            EngineError::Grammar { source, .. } => source.error_code(),
            EngineError::Lexer(e) => e.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let error = LexerError::NoViableAlternative {
            position: Position::new(3, 1, 4),
            text: "$".to_string(),
        };
        assert_eq!(error.error_code().as_str(), "E040");
        assert_eq!(error.position(), Some(Position::new(3, 1, 4)));
        assert_eq!(error.to_string(), "No viable alternative at 1:4: \"$\"");

        let engine_error = EngineError::from(error);
        assert_eq!(engine_error.error_code().as_str(), "E040");

        let grammar_error = EngineError::Grammar {
            path: PathBuf::from("Expr.g4"),
            source: GrammarError::RecursiveRule {
                rule: "A".to_string(),
                path: "A -> B -> A".to_string(),
            },
        };
        assert_eq!(grammar_error.error_code().as_str(), "E032");
    }
}
