//! Per-file tokenization: lex, keep the default channel, classify.
//!
//! The engine and the substitution table are borrowed for the whole batch;
//! nothing here keeps state between files.

mod error;

pub use error::TokenizeError;

use crate::config::compile_time::lexical::MAX_TOKEN_COUNT;
use crate::engine::{LexerEngine, LexerError};
use crate::file_processor;
use crate::logging::codes;
use crate::naming::{SubstitutionTable, TerminalNormalizer};
use crate::tokens::{TokenClassifier, TokenRecord};
use crate::{log_debug, log_error, log_success};
use std::path::Path;

/// Turns source text into output records with one engine and one table
#[derive(Clone, Copy)]
pub struct Tokenizer<'e, 't> {
    engine: &'e dyn LexerEngine,
    table: &'t SubstitutionTable,
}

impl<'e, 't> Tokenizer<'e, 't> {
    pub fn new(engine: &'e dyn LexerEngine, table: &'t SubstitutionTable) -> Self {
        Self { engine, table }
    }

    pub fn engine(&self) -> &'e dyn LexerEngine {
        self.engine
    }

    /// Tokenize source text.
    ///
    /// Records follow source order. Only default-channel tokens are kept, and
    /// the first literal without a substitution aborts the whole input.
    pub fn tokenize_source(&self, source: &str) -> Result<Vec<TokenRecord>, TokenizeError> {
        let raw_tokens = self.engine.tokenize(source).map_err(|e| {
            log_error!(e.error_code(), "Lexing failed", "error" => &e);
            e
        })?;

        let classifier = TokenClassifier::new(
            self.engine.vocabulary(),
            TerminalNormalizer::new(self.table),
        );

        let mut records = Vec::new();
        for token in raw_tokens.iter().filter(|t| t.is_default_channel()) {
            if records.len() >= MAX_TOKEN_COUNT {
                let error = LexerError::TooManyTokens {
                    max: MAX_TOKEN_COUNT,
                };
                log_error!(error.error_code(), "Token limit exceeded",
                    position = token.position,
                    "max" => MAX_TOKEN_COUNT
                );
                return Err(error.into());
            }

            let record = classifier.classify(token).map_err(|e| {
                log_debug!("Classification aborted", "position" => token.position);
                e
            })?;
            records.push(record);
        }

        log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization completed",
            "tokens" => records.len(),
            "hidden" => raw_tokens.len() - records.len()
        );

        Ok(records)
    }

    /// Read and tokenize one input file
    pub fn tokenize_file(&self, path: &Path) -> Result<Vec<TokenRecord>, TokenizeError> {
        let source = file_processor::read_input(path)?;
        self.tokenize_source(&source.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{RawToken, Vocabulary, DEFAULT_CHANNEL, HIDDEN_CHANNEL};
    use crate::utils::Position;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::tempdir;

    /// Replays a fixed token list regardless of input
    struct ScriptedEngine {
        vocabulary: Vocabulary,
        tokens: Vec<RawToken>,
    }

    impl ScriptedEngine {
        const NAME: u32 = 1;
        const PLUS: u32 = 2;
        const INCREMENT: u32 = 3;
        const WS: u32 = 4;

        fn new(script: &[(&str, u32, u32)]) -> Self {
            let mut vocabulary = Vocabulary::new();
            vocabulary.define_symbolic("NAME");
            vocabulary.define_literal("+");
            vocabulary.define_literal("++");
            vocabulary.define_symbolic("WS");

            let mut position = Position::start();
            let tokens = script
                .iter()
                .map(|&(literal, category, channel)| {
                    let token = RawToken::new(literal, category, channel, position);
                    position = position.advance_str(literal);
                    token
                })
                .collect();

            Self { vocabulary, tokens }
        }
    }

    impl LexerEngine for ScriptedEngine {
        fn name(&self) -> &str {
            "scripted"
        }

        fn vocabulary(&self) -> &Vocabulary {
            &self.vocabulary
        }

        fn tokenize(&self, _source: &str) -> Result<Vec<RawToken>, LexerError> {
            Ok(self.tokens.clone())
        }
    }

    struct FailingEngine(Vocabulary);

    impl LexerEngine for FailingEngine {
        fn name(&self) -> &str {
            "failing"
        }

        fn vocabulary(&self) -> &Vocabulary {
            &self.0
        }

        fn tokenize(&self, _source: &str) -> Result<Vec<RawToken>, LexerError> {
            Err(LexerError::NoViableAlternative {
                position: Position::new(2, 1, 3),
                text: "$".to_string(),
            })
        }
    }

    fn table() -> SubstitutionTable {
        SubstitutionTable::from_json_str(r#"{"+": "PLUS"}"#).unwrap()
    }

    #[test]
    fn test_hidden_tokens_are_dropped_and_order_kept() {
        let engine = ScriptedEngine::new(&[
            ("x", ScriptedEngine::NAME, DEFAULT_CHANNEL),
            (" ", ScriptedEngine::WS, HIDDEN_CHANNEL),
            ("+", ScriptedEngine::PLUS, DEFAULT_CHANNEL),
            (" ", ScriptedEngine::WS, HIDDEN_CHANNEL),
            ("y", ScriptedEngine::NAME, DEFAULT_CHANNEL),
        ]);
        let table = table();

        let records = Tokenizer::new(&engine, &table).tokenize_source("x + y").unwrap();
        assert_eq!(
            records,
            vec![
                TokenRecord::new("NAME", "x"),
                TokenRecord::new("Lit_PLUS", "+"),
                TokenRecord::new("NAME", "y"),
            ]
        );
    }

    #[test]
    fn test_missing_substitution_aborts_input() {
        let engine = ScriptedEngine::new(&[
            ("i", ScriptedEngine::NAME, DEFAULT_CHANNEL),
            ("++", ScriptedEngine::INCREMENT, DEFAULT_CHANNEL),
        ]);
        let table = table();

        let error = Tokenizer::new(&engine, &table)
            .tokenize_source("i++")
            .unwrap_err();
        assert!(error.is_fatal());
        assert_eq!(error.error_code().as_str(), "E003");
        assert_matches!(
            error,
            TokenizeError::Substitution(crate::naming::SubstitutionError::MissingEntry { literal })
                if literal == "++"
        );
    }

    #[test]
    fn test_hidden_illegal_literal_needs_no_substitution() {
        let engine = ScriptedEngine::new(&[
            ("++", ScriptedEngine::INCREMENT, HIDDEN_CHANNEL),
            ("a", ScriptedEngine::NAME, DEFAULT_CHANNEL),
        ]);
        let table = table();

        let records = Tokenizer::new(&engine, &table).tokenize_source("++a").unwrap();
        assert_eq!(records, vec![TokenRecord::new("NAME", "a")]);
    }

    #[test]
    fn test_lexer_failure_is_reported() {
        let engine = FailingEngine(Vocabulary::new());
        let table = table();

        let error = Tokenizer::new(&engine, &table)
            .tokenize_source("x $")
            .unwrap_err();
        assert!(!error.is_fatal());
        assert_matches!(
            error,
            TokenizeError::Lexer(LexerError::NoViableAlternative { .. })
        );
    }

    #[test]
    fn test_tokenize_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.py");
        fs::write(&path, "").unwrap();

        let engine = ScriptedEngine::new(&[]);
        let table = table();
        let tokenizer = Tokenizer::new(&engine, &table);

        assert!(tokenizer.tokenize_file(&path).unwrap().is_empty());
        assert_matches!(
            tokenizer.tokenize_file(&dir.path().join("missing.py")),
            Err(TokenizeError::Input(_))
        );
    }

    fn script_strategy() -> impl Strategy<Value = Vec<(String, bool)>> {
        prop::collection::vec(("[a-z]{1,6}", any::<bool>()), 0..40)
    }

    proptest! {
        #[test]
        fn prop_output_is_default_channel_subsequence(script in script_strategy()) {
            let owned: Vec<(&str, u32, u32)> = script
                .iter()
                .map(|(literal, hidden)| {
                    let channel = if *hidden { HIDDEN_CHANNEL } else { DEFAULT_CHANNEL };
                    (literal.as_str(), ScriptedEngine::NAME, channel)
                })
                .collect();
            let engine = ScriptedEngine::new(&owned);
            let table = table();

            let records = Tokenizer::new(&engine, &table).tokenize_source("").unwrap();
            let expected: Vec<&str> = script
                .iter()
                .filter(|(_, hidden)| !hidden)
                .map(|(literal, _)| literal.as_str())
                .collect();
            let literals: Vec<&str> = records.iter().map(|r| r.literal.as_str()).collect();
            prop_assert_eq!(literals, expected);
            prop_assert!(records.iter().all(|r| r.terminal == "NAME"));
        }
    }
}
