//! Lexer engines
//!
//! An engine owns a [`Vocabulary`] and turns source text into an ordered
//! sequence of [`RawToken`]s with categories and channels. Two engines exist:
//!
//! - [`GrammarEngine`] reads a lexer grammar (an ANTLR-style subset) and
//!   interprets it with compiled regular expressions;
//! - [`Python3Engine`] is a built-in Python 3 lexer with indentation tracking.
//!
//! [`LexerSpec`] selects between them from the first command-line argument.

mod error;
pub mod grammar;
pub mod python3;

pub use error::{EngineError, GrammarError, LexerError};
pub use grammar::GrammarEngine;
pub use python3::Python3Engine;

use crate::config::defaults::BUILT_IN_LANGUAGE;
use crate::logging::codes;
use crate::tokens::{RawToken, Vocabulary};
use crate::{log_error, log_success};
use std::fmt;
use std::path::{Path, PathBuf};

/// A compiled lexer, shared read-only across every file of a batch
pub trait LexerEngine: Send + Sync {
    /// Short description for logs
    fn name(&self) -> &str;

    /// Vocabulary used to classify this engine's tokens
    fn vocabulary(&self) -> &Vocabulary;

    /// Lex a whole source text. End of input is never emitted as a token.
    fn tokenize(&self, source: &str) -> Result<Vec<RawToken>, LexerError>;
}

/// Languages with a built-in engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python3,
}

impl Language {
    /// Identifier accepted on the command line
    pub fn id(&self) -> &'static str {
        match self {
            Language::Python3 => BUILT_IN_LANGUAGE,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            BUILT_IN_LANGUAGE => Some(Language::Python3),
            _ => None,
        }
    }
}

/// Where a batch's lexer comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexerSpec {
    BuiltIn(Language),
    CustomGrammar(PathBuf),
}

impl LexerSpec {
    /// Interpret a command-line value: a built-in language id, otherwise a grammar path
    pub fn parse(value: &str) -> Self {
        match Language::from_id(value) {
            Some(language) => LexerSpec::BuiltIn(language),
            None => LexerSpec::CustomGrammar(PathBuf::from(value)),
        }
    }

    /// Build the engine. Grammar read or compile failures abort the whole batch.
    pub fn load(&self) -> Result<Box<dyn LexerEngine>, EngineError> {
        let engine: Box<dyn LexerEngine> = match self {
            LexerSpec::BuiltIn(Language::Python3) => Box::new(Python3Engine::new()),
            LexerSpec::CustomGrammar(path) => Box::new(load_grammar(path)?),
        };

        log_success!(codes::success::ENGINE_READY, "Lexer engine ready",
            "engine" => engine.name(),
            "token_types" => engine.vocabulary().max_token_type()
        );

        Ok(engine)
    }
}

impl fmt::Display for LexerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerSpec::BuiltIn(language) => write!(f, "{}", language.id()),
            LexerSpec::CustomGrammar(path) => write!(f, "{}", path.display()),
        }
    }
}

fn load_grammar(path: &Path) -> Result<GrammarEngine, EngineError> {
    let source = crate::file_processor::read_grammar(path)?;

    GrammarEngine::from_source(&source.content).map_err(|e| {
        log_error!(e.error_code(), "Grammar cannot be compiled",
            "path" => path.display(),
            "error" => &e
        );
        EngineError::Grammar {
            path: path.to_path_buf(),
            source: e,
        }
    })
}
