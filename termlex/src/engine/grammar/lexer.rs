//! Tokenizer for grammar sources

use super::ast::SetItem;
use crate::engine::GrammarError;
use crate::utils::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarToken {
    /// Identifier starting with an uppercase letter
    TokenRef(String),
    /// Identifier starting with anything else
    RuleRef(String),
    Literal(String),
    CharSet(Vec<SetItem>),
    /// Body of a `{ ... }` block
    Action(String),
    Int(u32),
    Colon,
    ColonColon,
    Semi,
    Pipe,
    LParen,
    RParen,
    Question,
    Star,
    Plus,
    PlusAssign,
    Assign,
    Tilde,
    Dot,
    DotDot,
    Arrow,
    Comma,
    At,
    Pound,
    Lt,
    Gt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: GrammarToken,
    pub line: u32,
    pub column: u32,
}

struct Scanner<'s> {
    source: &'s str,
    position: Position,
}

impl<'s> Scanner<'s> {
    fn rest(&self) -> &'s str {
        &self.source[self.position.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position = self.position.advance(c);
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> GrammarError {
        GrammarError::Syntax {
            line: self.position.line,
            column: self.position.column,
            message: message.into(),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), GrammarError> {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => return Err(self.error("unterminated comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn identifier(&mut self) -> String {
        let start = self.position.offset;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        self.source[start..self.position.offset].to_string()
    }

    fn integer(&mut self) -> Result<u32, GrammarError> {
        let start = self.position.offset;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        self.source[start..self.position.offset]
            .parse()
            .map_err(|_| self.error("integer out of range"))
    }

    /// Decode the character after a backslash
    fn escape(&mut self, in_set: bool) -> Result<char, GrammarError> {
        let c = self
            .bump()
            .ok_or_else(|| self.error("unterminated escape sequence"))?;
        match c {
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'b' => Ok('\u{8}'),
            'f' => Ok('\u{c}'),
            '\\' | '\'' | '"' => Ok(c),
            ']' | '[' | '-' if in_set => Ok(c),
            'u' => self.unicode_escape(),
            'p' | 'P' => Err(GrammarError::Unsupported {
                construct: "unicode property escape".to_string(),
                line: self.position.line,
            }),
            other => Err(self.error(format!("invalid escape sequence '\\{}'", other))),
        }
    }

    fn unicode_escape(&mut self) -> Result<char, GrammarError> {
        let digits = if self.peek() == Some('{') {
            self.bump();
            let mut digits = String::new();
            loop {
                match self.bump() {
                    Some('}') => break,
                    Some(c) if c.is_ascii_hexdigit() => digits.push(c),
                    _ => return Err(self.error("malformed \\u{...} escape")),
                }
            }
            digits
        } else {
            let mut digits = String::new();
            for _ in 0..4 {
                match self.bump() {
                    Some(c) if c.is_ascii_hexdigit() => digits.push(c),
                    _ => return Err(self.error("\\u escape needs four hex digits")),
                }
            }
            digits
        };

        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(format!("invalid code point U+{}", digits)))
    }

    fn literal(&mut self) -> Result<String, GrammarError> {
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('\'') => return Ok(text),
                Some('\\') => text.push(self.escape(false)?),
                Some('\n') | None => return Err(self.error("unterminated string literal")),
                Some(c) => text.push(c),
            }
        }
    }

    fn char_set(&mut self) -> Result<Vec<SetItem>, GrammarError> {
        self.bump();
        // (char, was escaped)
        let mut chars = Vec::new();
        loop {
            match self.bump() {
                Some(']') => break,
                Some('\\') => chars.push((self.escape(true)?, true)),
                Some(c) => chars.push((c, false)),
                None => return Err(self.error("unterminated character set")),
            }
        }

        let mut items = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            let (c, _) = chars[i];
            let is_range = i + 2 < chars.len() && chars[i + 1] == ('-', false);
            if is_range {
                let (end, _) = chars[i + 2];
                if end < c {
                    return Err(self.error(format!("reversed range {}-{}", c, end)));
                }
                items.push(SetItem::Range(c, end));
                i += 3;
            } else {
                items.push(SetItem::Char(c));
                i += 1;
            }
        }

        if items.is_empty() {
            return Err(self.error("empty character set"));
        }
        Ok(items)
    }

    fn action(&mut self) -> Result<String, GrammarError> {
        self.bump();
        let start = self.position.offset;
        let mut depth = 1;
        loop {
            let end = self.position.offset;
            match self.bump() {
                Some('{') => depth += 1,
                Some('}') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(self.source[start..end].to_string());
                    }
                }
                Some(quote @ ('\'' | '"')) => loop {
                    match self.bump() {
                        Some('\\') => {
                            self.bump();
                        }
                        Some(c) if c == quote => break,
                        Some(_) => {}
                        None => return Err(self.error("unterminated action block")),
                    }
                },
                Some(_) => {}
                None => return Err(self.error("unterminated action block")),
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Spanned>, GrammarError> {
        self.skip_trivia()?;
        let (line, column) = (self.position.line, self.position.column);

        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let token = match c {
            '\'' => GrammarToken::Literal(self.literal()?),
            '[' => GrammarToken::CharSet(self.char_set()?),
            '{' => GrammarToken::Action(self.action()?),
            c if c.is_ascii_digit() => GrammarToken::Int(self.integer()?),
            c if c.is_alphabetic() || c == '_' => {
                let name = self.identifier();
                if c.is_uppercase() {
                    GrammarToken::TokenRef(name)
                } else {
                    GrammarToken::RuleRef(name)
                }
            }
            _ => {
                self.bump();
                let next = self.peek();
                let (token, consume_next) = match (c, next) {
                    (':', Some(':')) => (GrammarToken::ColonColon, true),
                    (':', _) => (GrammarToken::Colon, false),
                    ('.', Some('.')) => (GrammarToken::DotDot, true),
                    ('.', _) => (GrammarToken::Dot, false),
                    ('-', Some('>')) => (GrammarToken::Arrow, true),
                    ('+', Some('=')) => (GrammarToken::PlusAssign, true),
                    ('+', _) => (GrammarToken::Plus, false),
                    (';', _) => (GrammarToken::Semi, false),
                    ('|', _) => (GrammarToken::Pipe, false),
                    ('(', _) => (GrammarToken::LParen, false),
                    (')', _) => (GrammarToken::RParen, false),
                    ('?', _) => (GrammarToken::Question, false),
                    ('*', _) => (GrammarToken::Star, false),
                    ('=', _) => (GrammarToken::Assign, false),
                    ('~', _) => (GrammarToken::Tilde, false),
                    (',', _) => (GrammarToken::Comma, false),
                    ('@', _) => (GrammarToken::At, false),
                    ('#', _) => (GrammarToken::Pound, false),
                    ('<', _) => (GrammarToken::Lt, false),
                    ('>', _) => (GrammarToken::Gt, false),
                    _ => {
                        return Err(GrammarError::Syntax {
                            line,
                            column,
                            message: format!("unexpected character {:?}", c),
                        })
                    }
                };
                if consume_next {
                    self.bump();
                }
                token
            }
        };

        Ok(Some(Spanned {
            token,
            line,
            column,
        }))
    }
}

/// Split a grammar source into tokens, dropping whitespace and comments
pub fn tokenize_grammar(source: &str) -> Result<Vec<Spanned>, GrammarError> {
    let mut scanner = Scanner {
        source,
        position: Position::start(),
    };
    let mut tokens = Vec::new();
    while let Some(token) = scanner.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn kinds(source: &str) -> Vec<GrammarToken> {
        tokenize_grammar(source)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_rule_tokens() {
        assert_eq!(
            kinds("ID : [a-z_]+ -> skip ; // trailing"),
            vec![
                GrammarToken::TokenRef("ID".to_string()),
                GrammarToken::Colon,
                GrammarToken::CharSet(vec![SetItem::Range('a', 'z'), SetItem::Char('_')]),
                GrammarToken::Plus,
                GrammarToken::Arrow,
                GrammarToken::RuleRef("skip".to_string()),
                GrammarToken::Semi,
            ]
        );
    }

    #[test]
    fn test_literal_escapes() {
        assert_eq!(
            kinds(r"'\n' '\'' 'A' '\u{1F600}' 'a'..'z'"),
            vec![
                GrammarToken::Literal("\n".to_string()),
                GrammarToken::Literal("'".to_string()),
                GrammarToken::Literal("A".to_string()),
                GrammarToken::Literal("\u{1F600}".to_string()),
                GrammarToken::Literal("a".to_string()),
                GrammarToken::DotDot,
                GrammarToken::Literal("z".to_string()),
            ]
        );
    }

    #[test]
    fn test_char_set_dashes_and_escapes() {
        assert_eq!(
            kinds(r"[-+] [\]\-] [ \t]"),
            vec![
                GrammarToken::CharSet(vec![SetItem::Char('-'), SetItem::Char('+')]),
                GrammarToken::CharSet(vec![SetItem::Char(']'), SetItem::Char('-')]),
                GrammarToken::CharSet(vec![SetItem::Char(' '), SetItem::Char('\t')]),
            ]
        );
    }

    #[test]
    fn test_action_blocks_and_comments() {
        let tokens = kinds("/* block\ncomment */ @members { int x = '}'; { } }");
        assert_eq!(tokens[0], GrammarToken::At);
        assert_eq!(tokens[1], GrammarToken::RuleRef("members".to_string()));
        assert_matches!(&tokens[2], GrammarToken::Action(body) if body.contains("int x"));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize_grammar("grammar G;\n  A : 'a' ;").unwrap();
        assert_eq!((tokens[3].line, tokens[3].column), (2, 3));
    }

    #[test]
    fn test_errors() {
        assert_matches!(
            tokenize_grammar("A : 'abc"),
            Err(GrammarError::Syntax { .. })
        );
        assert_matches!(tokenize_grammar("A : [];"), Err(GrammarError::Syntax { .. }));
        assert_matches!(tokenize_grammar("A : '\\q';"), Err(GrammarError::Syntax { .. }));
        assert_matches!(
            tokenize_grammar("A : [\\p{L}];"),
            Err(GrammarError::Unsupported { .. })
        );
        assert_matches!(tokenize_grammar("A : $"), Err(GrammarError::Syntax { .. }));
    }
}
