//! Recursive descent parser for lexer grammars
//!
//! Accepts `lexer grammar` and combined `grammar` sources. Parser rules of a
//! combined grammar are only skimmed for the quoted literals they use.

use super::ast::{Alternative, Element, Grammar, LexerRule, Quantifier, SetItem, TokenAction};
use super::lexer::{tokenize_grammar, GrammarToken, Spanned};
use crate::engine::GrammarError;
use crate::log_warning;
use crate::tokens::{DEFAULT_CHANNEL, HIDDEN_CHANNEL};

/// First id given to a channel declared in a `channels { ... }` block
const FIRST_CUSTOM_CHANNEL: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GrammarKind {
    Lexer,
    Combined,
}

/// Parse a grammar source
pub fn parse_grammar(source: &str) -> Result<Grammar, GrammarError> {
    let tokens = tokenize_grammar(source)?;
    Parser {
        tokens,
        pos: 0,
        current_rule: String::new(),
    }
    .grammar()
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    current_rule: String,
}

impl Parser {
    fn peek(&self) -> Option<&GrammarToken> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn next(&mut self) -> Option<GrammarToken> {
        let token = self.tokens.get(self.pos).map(|t| t.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn line(&self) -> u32 {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn error(&self, message: impl Into<String>) -> GrammarError {
        let (line, column) = self
            .tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| (t.line, t.column))
            .unwrap_or((1, 1));
        GrammarError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    fn unsupported(&self, construct: &str) -> GrammarError {
        GrammarError::Unsupported {
            construct: construct.to_string(),
            line: self.line(),
        }
    }

    fn expect(&mut self, expected: GrammarToken, what: &str) -> Result<(), GrammarError> {
        if self.peek() == Some(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected {}", what)))
        }
    }

    fn identifier(&mut self) -> Result<String, GrammarError> {
        match self.next() {
            Some(GrammarToken::TokenRef(name)) | Some(GrammarToken::RuleRef(name)) => Ok(name),
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.error("expected identifier"))
            }
        }
    }

    fn is_word(&self, word: &str) -> bool {
        matches!(self.peek(), Some(GrammarToken::RuleRef(w)) if w == word)
    }

    fn grammar(mut self) -> Result<Grammar, GrammarError> {
        let kind = if self.is_word("lexer") {
            self.pos += 1;
            GrammarKind::Lexer
        } else if self.is_word("parser") {
            return Err(self.unsupported("parser grammar (no lexer rules)"));
        } else {
            GrammarKind::Combined
        };

        if !self.is_word("grammar") {
            return Err(self.error("expected grammar declaration"));
        }
        self.pos += 1;

        let mut grammar = Grammar {
            name: self.identifier()?,
            ..Grammar::default()
        };
        self.expect(GrammarToken::Semi, "';' after grammar name")?;

        while let Some(token) = self.peek().cloned() {
            match token {
                GrammarToken::RuleRef(word) if word == "options" => {
                    self.pos += 1;
                    self.action_block("options")?;
                }
                GrammarToken::RuleRef(word) if word == "tokens" => {
                    self.pos += 1;
                    let body = self.action_block("tokens")?;
                    grammar.declared_tokens.extend(self.name_list(&body)?);
                }
                GrammarToken::RuleRef(word) if word == "channels" => {
                    self.pos += 1;
                    let body = self.action_block("channels")?;
                    grammar.channels.extend(self.name_list(&body)?);
                }
                GrammarToken::RuleRef(word) if word == "import" => {
                    return Err(self.unsupported("grammar imports"));
                }
                GrammarToken::RuleRef(word) if word == "mode" => {
                    return Err(self.unsupported("lexer modes"));
                }
                GrammarToken::At => {
                    self.named_action()?;
                }
                GrammarToken::RuleRef(word) if word == "fragment" => {
                    self.pos += 1;
                    let rule = self.lexer_rule(&grammar, true)?;
                    self.add_rule(&mut grammar, rule)?;
                }
                GrammarToken::TokenRef(_) => {
                    let rule = self.lexer_rule(&grammar, false)?;
                    self.add_rule(&mut grammar, rule)?;
                }
                GrammarToken::RuleRef(_) => {
                    if kind == GrammarKind::Lexer {
                        return Err(self.error("parser rule in a lexer grammar"));
                    }
                    self.parser_rule(&mut grammar)?;
                }
                _ => return Err(self.error("expected a rule")),
            }
        }

        Ok(grammar)
    }

    fn add_rule(&self, grammar: &mut Grammar, rule: LexerRule) -> Result<(), GrammarError> {
        if grammar.rule(&rule.name).is_some() {
            return Err(GrammarError::Syntax {
                line: rule.line,
                column: 1,
                message: format!("rule {} redefined", rule.name),
            });
        }
        grammar.lexer_rules.push(rule);
        Ok(())
    }

    fn action_block(&mut self, owner: &str) -> Result<String, GrammarError> {
        match self.next() {
            Some(GrammarToken::Action(body)) => Ok(body),
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.error(format!("expected '{{' after {}", owner)))
            }
        }
    }

    /// Comma-separated identifiers of a `tokens` or `channels` block
    fn name_list(&self, body: &str) -> Result<Vec<String>, GrammarError> {
        body.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                let valid = name.chars().next().is_some_and(char::is_alphabetic)
                    && name.chars().all(|c| c.is_alphanumeric() || c == '_');
                if valid {
                    Ok(name.to_string())
                } else {
                    Err(self.error(format!("invalid name {:?}", name)))
                }
            })
            .collect()
    }

    /// `@name { ... }` or `@scope::name { ... }`, ignored
    fn named_action(&mut self) -> Result<(), GrammarError> {
        self.pos += 1;
        let mut name = self.identifier()?;
        if self.peek() == Some(&GrammarToken::ColonColon) {
            self.pos += 1;
            name = format!("{}::{}", name, self.identifier()?);
        }
        self.action_block(&format!("@{}", name))?;
        log_warning!("Ignoring grammar action", "action" => name);
        Ok(())
    }

    fn parser_rule(&mut self, grammar: &mut Grammar) -> Result<(), GrammarError> {
        let name = self.identifier()?;

        if name == "catch" || name == "finally" {
            // exception handlers trailing the previous parser rule
            if let Some(GrammarToken::CharSet(_)) = self.peek() {
                self.pos += 1;
            }
            self.action_block(&name)?;
            return Ok(());
        }

        loop {
            match self.next() {
                Some(GrammarToken::Semi) => return Ok(()),
                Some(GrammarToken::Literal(text)) => {
                    if !text.is_empty() && !grammar.parser_literals.contains(&text) {
                        grammar.parser_literals.push(text);
                    }
                }
                Some(_) => {}
                None => return Err(self.error(format!("rule {} is missing ';'", name))),
            }
        }
    }

    fn lexer_rule(&mut self, grammar: &Grammar, fragment: bool) -> Result<LexerRule, GrammarError> {
        let line = self.line();
        let name = match self.next() {
            Some(GrammarToken::TokenRef(name)) => name,
            _ => {
                self.pos = self.pos.saturating_sub(1);
                return Err(self.error("lexer rule names start with an uppercase letter"));
            }
        };
        self.current_rule = name.clone();

        if self.is_word("options") {
            self.pos += 1;
            self.action_block("options")?;
        }
        self.expect(GrammarToken::Colon, "':' after rule name")?;

        let mut alternatives = Vec::new();
        let mut actions = Vec::new();
        loop {
            alternatives.push(self.sequence()?);
            actions.push(if self.peek() == Some(&GrammarToken::Arrow) {
                self.pos += 1;
                self.commands(grammar)?
            } else {
                TokenAction::Emit(DEFAULT_CHANNEL)
            });

            match self.next() {
                Some(GrammarToken::Pipe) => continue,
                Some(GrammarToken::Semi) => break,
                _ => {
                    self.pos = self.pos.saturating_sub(1);
                    return Err(self.error(format!("expected '|' or ';' in rule {}", name)));
                }
            }
        }

        let action = actions[0];
        if actions.iter().any(|a| *a != action) {
            return Err(self.unsupported("different lexer commands per alternative"));
        }

        Ok(LexerRule {
            name,
            fragment,
            alternatives,
            action,
            line,
        })
    }

    fn commands(&mut self, grammar: &Grammar) -> Result<TokenAction, GrammarError> {
        let mut action = TokenAction::Emit(DEFAULT_CHANNEL);
        loop {
            let command = self.identifier()?;
            match command.as_str() {
                "skip" => action = TokenAction::Skip,
                "channel" => {
                    self.expect(GrammarToken::LParen, "'(' after channel")?;
                    let channel = self.channel_id(grammar)?;
                    self.expect(GrammarToken::RParen, "')' after channel")?;
                    if action != TokenAction::Skip {
                        action = TokenAction::Emit(channel);
                    }
                }
                "more" | "type" | "mode" | "pushMode" | "popMode" => {
                    return Err(self.unsupported(&format!("lexer command '{}'", command)));
                }
                other => return Err(self.error(format!("unknown lexer command '{}'", other))),
            }

            if self.peek() == Some(&GrammarToken::Comma) {
                self.pos += 1;
            } else {
                return Ok(action);
            }
        }
    }

    fn channel_id(&mut self, grammar: &Grammar) -> Result<u32, GrammarError> {
        match self.next() {
            Some(GrammarToken::Int(n)) => Ok(n),
            Some(GrammarToken::TokenRef(name)) | Some(GrammarToken::RuleRef(name)) => {
                match name.as_str() {
                    "HIDDEN" => Ok(HIDDEN_CHANNEL),
                    "DEFAULT_TOKEN_CHANNEL" => Ok(DEFAULT_CHANNEL),
                    _ => grammar
                        .channels
                        .iter()
                        .position(|c| *c == name)
                        .map(|index| FIRST_CUSTOM_CHANNEL + index as u32)
                        .ok_or_else(|| GrammarError::UnknownChannel {
                            rule: self.current_rule.clone(),
                            channel: name,
                        }),
                }
            }
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.error("expected channel name or number"))
            }
        }
    }

    fn starts_element(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                GrammarToken::Literal(_)
                    | GrammarToken::CharSet(_)
                    | GrammarToken::Dot
                    | GrammarToken::TokenRef(_)
                    | GrammarToken::RuleRef(_)
                    | GrammarToken::Tilde
                    | GrammarToken::LParen
                    | GrammarToken::Action(_)
            )
        )
    }

    fn sequence(&mut self) -> Result<Alternative, GrammarError> {
        let mut elements = Vec::new();
        while self.starts_element() {
            if let Some(GrammarToken::Action(_)) = self.peek() {
                self.pos += 1;
                if self.peek() == Some(&GrammarToken::Question) {
                    return Err(self.unsupported("semantic predicates"));
                }
                log_warning!("Ignoring embedded action", "rule" => self.current_rule);
                continue;
            }

            let atom = self.atom()?;
            elements.push(self.quantified(atom));
        }
        Ok(elements)
    }

    fn quantified(&mut self, element: Element) -> Element {
        let quantifier = match self.peek() {
            Some(GrammarToken::Question) => Quantifier::Optional,
            Some(GrammarToken::Star) => Quantifier::ZeroOrMore,
            Some(GrammarToken::Plus) => Quantifier::OneOrMore,
            _ => return element,
        };
        self.pos += 1;

        let greedy = if self.peek() == Some(&GrammarToken::Question) {
            self.pos += 1;
            false
        } else {
            true
        };

        Element::Repeat {
            element: Box::new(element),
            quantifier,
            greedy,
        }
    }

    fn atom(&mut self) -> Result<Element, GrammarError> {
        match self.next() {
            Some(GrammarToken::Literal(text)) => {
                if text.is_empty() {
                    self.pos -= 1;
                    return Err(self.error("empty string literal"));
                }
                if self.peek() == Some(&GrammarToken::DotDot) {
                    self.pos += 1;
                    let end = match self.next() {
                        Some(GrammarToken::Literal(end)) => end,
                        _ => return Err(self.error("expected literal after '..'")),
                    };
                    let (from, to) = match (single_char(&text), single_char(&end)) {
                        (Some(from), Some(to)) if from <= to => (from, to),
                        _ => return Err(self.error("range bounds must be single characters")),
                    };
                    return Ok(Element::Set {
                        negated: false,
                        items: vec![SetItem::Range(from, to)],
                    });
                }
                Ok(Element::Literal(text))
            }
            Some(GrammarToken::CharSet(items)) => Ok(Element::Set {
                negated: false,
                items,
            }),
            Some(GrammarToken::Dot) => Ok(Element::Any),
            Some(GrammarToken::TokenRef(name)) => {
                if name == "EOF" {
                    return Err(self.unsupported("EOF in lexer rules"));
                }
                Ok(Element::RuleRef(name))
            }
            Some(GrammarToken::RuleRef(name)) => {
                self.pos -= 1;
                Err(self.error(format!("parser rule reference '{}' in lexer rule", name)))
            }
            Some(GrammarToken::Tilde) => {
                let operand = self.atom()?;
                let items = self
                    .set_items(&operand)
                    .ok_or_else(|| self.error("'~' applies only to character sets"))?;
                Ok(Element::Set {
                    negated: true,
                    items,
                })
            }
            Some(GrammarToken::LParen) => {
                let mut alternatives = vec![self.sequence()?];
                while self.peek() == Some(&GrammarToken::Pipe) {
                    self.pos += 1;
                    alternatives.push(self.sequence()?);
                }
                if self.peek() == Some(&GrammarToken::Arrow) {
                    return Err(self.error("lexer commands must end an outer alternative"));
                }
                self.expect(GrammarToken::RParen, "')'")?;
                Ok(Element::Group(alternatives))
            }
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.error("expected a lexer element"))
            }
        }
    }

    /// Character set items of an operand of `~`
    fn set_items(&self, element: &Element) -> Option<Vec<SetItem>> {
        match element {
            Element::Set {
                negated: false,
                items,
            } => Some(items.clone()),
            Element::Literal(text) => single_char(text).map(|c| vec![SetItem::Char(c)]),
            Element::Group(alternatives) => {
                let mut items = Vec::new();
                for alternative in alternatives {
                    match alternative.as_slice() {
                        [element] => items.extend(self.set_items(element)?),
                        _ => return None,
                    }
                }
                Some(items)
            }
            _ => None,
        }
    }
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_combined_grammar() {
        let grammar = parse_grammar(
            r"
            grammar Expr;
            stat : NAME '=' expr NEWLINE? ;
            expr : expr '+' expr | NUMBER | NAME ;
            ASSIGN : '=' ;
            NAME : [a-zA-Z_] [a-zA-Z_0-9]* ;
            NUMBER : DIGIT+ ;
            fragment DIGIT : '0'..'9' ;
            WS : [ \t\r\n]+ -> skip ;
            ",
        )
        .unwrap();

        assert_eq!(grammar.name, "Expr");
        assert_eq!(grammar.parser_literals, vec!["=", "+"]);
        assert_eq!(grammar.lexer_rules.len(), 5);

        let digit = grammar.rule("DIGIT").unwrap();
        assert!(digit.fragment);
        assert_eq!(
            digit.alternatives,
            vec![vec![Element::Set {
                negated: false,
                items: vec![SetItem::Range('0', '9')]
            }]]
        );
        assert_eq!(grammar.rule("WS").unwrap().action, TokenAction::Skip);
        assert_eq!(grammar.rule("ASSIGN").unwrap().literal_alias(), Some("="));
    }

    #[test]
    fn test_channels_and_commands() {
        let grammar = parse_grammar(
            r"
            lexer grammar Chan;
            channels { COMMENTS, DIRECTIVES }
            LINE_COMMENT : '//' ~[\r\n]* -> channel(COMMENTS) ;
            HASH : '#' ~('\n')* -> channel(HIDDEN) ;
            SPACE : ' ' -> channel(7) ;
            ",
        )
        .unwrap();

        assert_eq!(grammar.channels, vec!["COMMENTS", "DIRECTIVES"]);
        assert_eq!(
            grammar.rule("LINE_COMMENT").unwrap().action,
            TokenAction::Emit(2)
        );
        assert_eq!(
            grammar.rule("HASH").unwrap().action,
            TokenAction::Emit(HIDDEN_CHANNEL)
        );
        assert_eq!(grammar.rule("SPACE").unwrap().action, TokenAction::Emit(7));
    }

    #[test]
    fn test_quantifiers_and_negation() {
        let grammar = parse_grammar(
            r#"
            lexer grammar Q;
            COMMENT : '/*' .*? '*/' ;
            NOT_QUOTE : ~'"' ;
            "#,
        )
        .unwrap();

        let comment = &grammar.rule("COMMENT").unwrap().alternatives[0];
        assert_matches!(
            &comment[1],
            Element::Repeat {
                quantifier: Quantifier::ZeroOrMore,
                greedy: false,
                ..
            }
        );

        let not_quote = &grammar.rule("NOT_QUOTE").unwrap().alternatives[0];
        assert_eq!(
            not_quote[0],
            Element::Set {
                negated: true,
                items: vec![SetItem::Char('"')]
            }
        );
    }

    #[test]
    fn test_tokens_block_and_ignored_sections() {
        let grammar = parse_grammar(
            r"
            grammar T;
            options { caseInsensitive = false; }
            tokens { INDENT, DEDENT }
            @header { package demo; }
            @lexer::members { int depth = 0; }
            file : stmt* EOF ;
            stmt : 'pass' ';' ;
            catch [Exception e] { }
            ",
        )
        .unwrap();

        assert_eq!(grammar.declared_tokens, vec!["INDENT", "DEDENT"]);
        assert_eq!(grammar.parser_literals, vec!["pass", ";"]);
    }

    #[test]
    fn test_rejected_constructs() {
        assert_matches!(
            parse_grammar("parser grammar P; a : 'x' ;"),
            Err(GrammarError::Unsupported { .. })
        );
        assert_matches!(
            parse_grammar("lexer grammar L; mode INSIDE;"),
            Err(GrammarError::Unsupported { .. })
        );
        assert_matches!(
            parse_grammar("lexer grammar L; A : 'a' {isOk()}? ;"),
            Err(GrammarError::Unsupported { .. })
        );
        assert_matches!(
            parse_grammar("lexer grammar L; A : 'a' -> pushMode(X) ;"),
            Err(GrammarError::Unsupported { .. })
        );
        assert_matches!(
            parse_grammar("lexer grammar L; A : 'a' -> channel(NOPE) ;"),
            Err(GrammarError::UnknownChannel { .. })
        );
        assert_matches!(
            parse_grammar("lexer grammar L; a : 'x' ;"),
            Err(GrammarError::Syntax { .. })
        );
        assert_matches!(
            parse_grammar("lexer grammar L; A : 'a' ; A : 'b' ;"),
            Err(GrammarError::Syntax { .. })
        );
        assert_matches!(
            parse_grammar("lexer grammar L; A : 'a' "),
            Err(GrammarError::Syntax { .. })
        );
        assert_matches!(parse_grammar("A : 'a' ;"), Err(GrammarError::Syntax { .. }));
    }

    #[test]
    fn test_plain_action_is_ignored() {
        let grammar = parse_grammar("lexer grammar L; A : 'a' { count++; } ;").unwrap();
        assert_eq!(
            grammar.rule("A").unwrap().alternatives,
            vec![vec![Element::Literal("a".to_string())]]
        );
    }
}
