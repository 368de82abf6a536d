//! Grammar-driven lexer engine
//!
//! A grammar source is parsed once into token rules, each rule is compiled
//! to an anchored regular expression, and the resulting engine is shared by
//! every input of the batch.
//!
//! Token types are numbered in this order: names from `tokens { ... }`, then
//! the literals used by parser rules (anonymous, no symbolic name), then the
//! non-fragment lexer rules in source order. A parser literal that is exactly
//! the body of a lexer rule (`ASSIGN : '=' ;`) uses that rule's type instead.
//!
//! At each position the longest match wins and ties go to the lowest token
//! type. This holds inside a rule too: `OP : '=' | '==' ;` matches `==`
//! whole. Rules containing a non-greedy repeat (`*?`, `+?`, `??`) are the
//! exception and stop at the first match the repeat allows.

mod ast;
mod compiler;
mod lexer;
mod parser;

pub use ast::{Grammar, TokenAction};
pub use parser::parse_grammar;

use super::{GrammarError, LexerEngine, LexerError};
use crate::config::compile_time::grammar::MAX_RULES;
use crate::tokens::{RawToken, Vocabulary, DEFAULT_CHANNEL};
use crate::utils::Position;
use crate::{log_debug, log_info};
use compiler::{RuleCompiler, RulePattern};
use regex::RegexSet;
use regex_automata::meta::{self, Regex as LongestRegex};
use regex_automata::{Anchored, Input, MatchKind};
use std::collections::HashMap;
use std::fmt;

/// Anchored search strategy for one token rule
enum RuleRegex {
    /// Reports the longest match of any alternative
    Longest(LongestRegex),
    /// Leftmost-first, so non-greedy repeats keep their meaning
    FirstMatch(regex::Regex),
}

impl RuleRegex {
    fn new(pattern: &RulePattern) -> Result<Self, String> {
        let source = format!("^{}", pattern.source);
        if pattern.lazy {
            return regex::Regex::new(&source)
                .map(RuleRegex::FirstMatch)
                .map_err(|e| e.to_string());
        }
        LongestRegex::builder()
            .configure(meta::Config::new().match_kind(MatchKind::All))
            .build(&source)
            .map(RuleRegex::Longest)
            .map_err(|e| e.to_string())
    }

    /// Length of the match at the start of `rest`
    fn match_len(&self, rest: &str) -> Option<usize> {
        match self {
            RuleRegex::Longest(regex) => regex
                .find(Input::new(rest).anchored(Anchored::Yes))
                .map(|m| m.end()),
            RuleRegex::FirstMatch(regex) => regex.find(rest).map(|m| m.end()),
        }
    }
}

struct TokenMatcher {
    category: u32,
    source: String,
    regex: RuleRegex,
    action: TokenAction,
}

impl fmt::Debug for TokenMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenMatcher")
            .field("category", &self.category)
            .field("source", &self.source)
            .field("longest", &matches!(self.regex, RuleRegex::Longest(_)))
            .field("action", &self.action)
            .finish()
    }
}

/// Lexer interpreter for a compiled grammar
#[derive(Debug)]
pub struct GrammarEngine {
    name: String,
    vocabulary: Vocabulary,
    matchers: Vec<TokenMatcher>,
    /// Same patterns as `matchers`, in the same order
    candidates: RegexSet,
}

impl GrammarEngine {
    /// Parse and compile a grammar source
    pub fn from_source(source: &str) -> Result<Self, GrammarError> {
        let grammar = parse_grammar(source)?;
        Self::from_grammar(&grammar)
    }

    pub fn from_grammar(grammar: &Grammar) -> Result<Self, GrammarError> {
        let aliases: HashMap<&str, &str> = grammar
            .lexer_rules
            .iter()
            .filter_map(|rule| rule.literal_alias().map(|lit| (lit, rule.name.as_str())))
            .collect();

        let implicit: Vec<&str> = grammar
            .parser_literals
            .iter()
            .map(String::as_str)
            .filter(|lit| !aliases.contains_key(lit))
            .collect();

        let rule_count = implicit.len() + grammar.lexer_rules.len();
        if rule_count > MAX_RULES {
            return Err(GrammarError::TooManyRules {
                count: rule_count,
                max: MAX_RULES,
            });
        }

        let mut vocabulary = Vocabulary::new();
        for name in &grammar.declared_tokens {
            if grammar.rule(name).is_none() {
                vocabulary.define_symbolic(name);
            }
        }

        let mut patterns = Vec::new();
        let mut categories = Vec::new();

        for literal in implicit {
            let category = vocabulary.define_literal(literal);
            patterns.push((
                literal.to_string(),
                RulePattern::literal(literal),
                TokenAction::Emit(DEFAULT_CHANNEL),
            ));
            categories.push(category);
        }

        let mut compiler = RuleCompiler::new(grammar);
        for rule in &grammar.lexer_rules {
            // fragments are compiled too so that their errors surface
            let pattern = compiler.compile(&rule.name)?;
            if rule.fragment {
                continue;
            }
            let category = vocabulary.define(rule.literal_alias(), Some(&rule.name));
            patterns.push((rule.name.clone(), pattern, rule.action));
            categories.push(category);
        }

        let mut matchers = Vec::with_capacity(patterns.len());
        let mut anchored = Vec::with_capacity(patterns.len());
        for ((rule, pattern, action), category) in patterns.into_iter().zip(categories) {
            let regex = RuleRegex::new(&pattern).map_err(|message| {
                GrammarError::InvalidPattern {
                    rule: rule.clone(),
                    message,
                }
            })?;
            log_debug!("Compiled token rule",
                "rule" => rule,
                "category" => category,
                "non_greedy" => pattern.lazy
            );
            let source = format!("^{}", pattern.source);
            anchored.push(source.clone());
            matchers.push(TokenMatcher {
                category,
                source,
                regex,
                action,
            });
        }

        let candidates = RegexSet::new(&anchored).map_err(|e| GrammarError::InvalidPattern {
            rule: grammar.name.clone(),
            message: e.to_string(),
        })?;

        log_info!("Grammar compiled",
            "grammar" => grammar.name,
            "token_types" => vocabulary.max_token_type(),
            "matchers" => matchers.len()
        );

        Ok(Self {
            name: format!("grammar {}", grammar.name),
            vocabulary,
            matchers,
            candidates,
        })
    }

    /// Longest non-empty match at the start of `rest`; ties keep the lowest type
    fn longest_match(&self, rest: &str) -> Option<(usize, &TokenMatcher)> {
        let mut best: Option<(usize, &TokenMatcher)> = None;
        for index in self.candidates.matches(rest).iter() {
            let matcher = &self.matchers[index];
            let Some(length) = matcher.regex.match_len(rest) else {
                continue;
            };
            if length > 0 && best.map_or(true, |(best_length, _)| length > best_length) {
                best = Some((length, matcher));
            }
        }
        best
    }
}

impl LexerEngine for GrammarEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn tokenize(&self, source: &str) -> Result<Vec<RawToken>, LexerError> {
        let mut tokens = Vec::new();
        let mut position = Position::start();

        while position.offset < source.len() {
            let rest = &source[position.offset..];
            let Some((length, matcher)) = self.longest_match(rest) else {
                return Err(LexerError::NoViableAlternative {
                    position,
                    text: rest.chars().next().map(String::from).unwrap_or_default(),
                });
            };

            let text = &rest[..length];
            if let TokenAction::Emit(channel) = matcher.action {
                tokens.push(RawToken::new(text, matcher.category, channel, position));
            }
            position = position.advance_str(text);
        }

        Ok(tokens)
    }
}
