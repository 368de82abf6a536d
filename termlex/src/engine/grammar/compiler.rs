//! Translation of lexer rules into regular expression source
//!
//! Every character is emitted as a `\x{...}` escape so grammar text never
//! needs regex quoting. Rule references are inlined; recursion is rejected.

use super::ast::{Alternative, Element, Grammar, Quantifier, SetItem};
use crate::engine::GrammarError;
use std::collections::HashMap;
use std::fmt::Write;

/// Regex source of a rule body, without anchors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulePattern {
    pub source: String,
    /// Some repeat in the body (or an inlined rule) is non-greedy
    pub lazy: bool,
}

impl RulePattern {
    pub fn literal(text: &str) -> Self {
        Self {
            source: literal_pattern(text),
            lazy: false,
        }
    }
}

pub struct RuleCompiler<'g> {
    grammar: &'g Grammar,
    compiled: HashMap<String, RulePattern>,
}

impl<'g> RuleCompiler<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            compiled: HashMap::new(),
        }
    }

    pub fn compile(&mut self, rule: &str) -> Result<RulePattern, GrammarError> {
        self.compile_rule(rule, &mut Vec::new())
    }

    fn compile_rule(
        &mut self,
        name: &str,
        stack: &mut Vec<String>,
    ) -> Result<RulePattern, GrammarError> {
        if let Some(pattern) = self.compiled.get(name) {
            return Ok(pattern.clone());
        }

        if stack.iter().any(|r| r == name) {
            let mut path = stack.clone();
            path.push(name.to_string());
            return Err(GrammarError::RecursiveRule {
                rule: name.to_string(),
                path: path.join(" -> "),
            });
        }

        let grammar = self.grammar;
        let rule = grammar
            .rule(name)
            .ok_or_else(|| GrammarError::UndefinedRule {
                rule: stack.last().cloned().unwrap_or_default(),
                reference: name.to_string(),
            })?;

        stack.push(name.to_string());
        let pattern = self.alternatives(&rule.alternatives, stack)?;
        stack.pop();

        self.compiled.insert(name.to_string(), pattern.clone());
        Ok(pattern)
    }

    fn alternatives(
        &mut self,
        alternatives: &[Alternative],
        stack: &mut Vec<String>,
    ) -> Result<RulePattern, GrammarError> {
        let mut parts = Vec::with_capacity(alternatives.len());
        let mut lazy = false;
        for alternative in alternatives {
            let mut part = String::new();
            for element in alternative {
                let pattern = self.element(element, stack)?;
                lazy |= pattern.lazy;
                part.push_str(&pattern.source);
            }
            parts.push(part);
        }
        Ok(RulePattern {
            source: format!("(?:{})", parts.join("|")),
            lazy,
        })
    }

    fn element(
        &mut self,
        element: &Element,
        stack: &mut Vec<String>,
    ) -> Result<RulePattern, GrammarError> {
        let plain = |source: String| RulePattern {
            source,
            lazy: false,
        };
        Ok(match element {
            Element::Literal(text) => RulePattern::literal(text),
            Element::Set { negated, items } => plain(char_class(*negated, items)),
            Element::Any => plain("(?s:.)".to_string()),
            Element::RuleRef(name) => self.compile_rule(name, stack)?,
            Element::Group(alternatives) => self.alternatives(alternatives, stack)?,
            Element::Repeat {
                element,
                quantifier,
                greedy,
            } => {
                let operator = match quantifier {
                    Quantifier::Optional => "?",
                    Quantifier::ZeroOrMore => "*",
                    Quantifier::OneOrMore => "+",
                };
                let inner = self.element(element, stack)?;
                RulePattern {
                    source: format!(
                        "(?:{}){}{}",
                        inner.source,
                        operator,
                        if *greedy { "" } else { "?" }
                    ),
                    lazy: inner.lazy || !*greedy,
                }
            }
        })
    }
}

/// Regex source matching exactly `text`
fn literal_pattern(text: &str) -> String {
    text.chars().map(escape_char).collect()
}

fn escape_char(c: char) -> String {
    format!("\\x{{{:X}}}", c as u32)
}

fn char_class(negated: bool, items: &[SetItem]) -> String {
    let mut class = String::from(if negated { "[^" } else { "[" });
    for item in items {
        match item {
            SetItem::Char(c) => class.push_str(&escape_char(*c)),
            SetItem::Range(from, to) => {
                let _ = write!(class, "{}-{}", escape_char(*from), escape_char(*to));
            }
        }
    }
    class.push(']');
    class
}
