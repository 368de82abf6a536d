//! Built-in Python 3 lexer
//!
//! Keywords and operators are anonymous literal tokens, numbered first.
//! Named categories follow: `STRING`, `NUMBER`, `INTEGER`, `NAME`, `NEWLINE`,
//! `INDENT`, `DEDENT`, `SKIP_` and `COMMENT`. `INTEGER` exists in the
//! vocabulary only; integers are lexed as `NUMBER`.
//!
//! Every character of the input ends up in exactly one token, so joining
//! all token literals reproduces the source. The only exceptions are the
//! synthetic `DEDENT` tokens and a final empty `NEWLINE`, which have no text.

use super::{LexerEngine, LexerError};
use crate::tokens::{RawToken, Vocabulary, DEFAULT_CHANNEL, HIDDEN_CHANNEL};
use crate::utils::Position;
use std::collections::HashMap;

const KEYWORDS: &[&str] = &[
    "def", "return", "raise", "from", "import", "as", "global", "nonlocal", "assert", "if",
    "elif", "else", "while", "for", "in", "try", "finally", "with", "except", "lambda", "or",
    "and", "not", "is", "None", "True", "False", "class", "yield", "del", "pass", "continue",
    "break", "async", "await",
];

const OPERATORS: &[&str] = &[
    ".", "...", "*", "(", ")", ",", ":", ";", "**", "=", "[", "]", "|", "^", "&", "<<", ">>",
    "+", "-", "/", "%", "//", "~", "{", "}", "<", ">", "==", ">=", "<=", "<>", "!=", "@", "->",
    "+=", "-=", "*=", "@=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", "**=", "//=", ":=",
];

const STRING_PREFIXES: &[&str] = &["br", "rb", "fr", "rf", "r", "u", "b", "f"];

const TAB_SIZE: usize = 8;

#[derive(Debug, Clone, Copy)]
struct Categories {
    string: u32,
    number: u32,
    name: u32,
    newline: u32,
    indent: u32,
    dedent: u32,
    skip: u32,
    comment: u32,
}

pub struct Python3Engine {
    vocabulary: Vocabulary,
    keywords: HashMap<&'static str, u32>,
    /// Longest operators first
    operators: Vec<(&'static str, u32)>,
    categories: Categories,
}

impl Python3Engine {
    pub fn new() -> Self {
        let mut vocabulary = Vocabulary::new();

        let keywords: HashMap<&'static str, u32> = KEYWORDS
            .iter()
            .map(|&keyword| (keyword, vocabulary.define_literal(keyword)))
            .collect();

        let mut operators: Vec<(&'static str, u32)> = OPERATORS
            .iter()
            .map(|&operator| (operator, vocabulary.define_literal(operator)))
            .collect();
        operators.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let string = vocabulary.define_symbolic("STRING");
        let number = vocabulary.define_symbolic("NUMBER");
        vocabulary.define_symbolic("INTEGER");
        let categories = Categories {
            string,
            number,
            name: vocabulary.define_symbolic("NAME"),
            newline: vocabulary.define_symbolic("NEWLINE"),
            indent: vocabulary.define_symbolic("INDENT"),
            dedent: vocabulary.define_symbolic("DEDENT"),
            skip: vocabulary.define_symbolic("SKIP_"),
            comment: vocabulary.define_symbolic("COMMENT"),
        };

        Self {
            vocabulary,
            keywords,
            operators,
            categories,
        }
    }
}

impl Default for Python3Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl LexerEngine for Python3Engine {
    fn name(&self) -> &str {
        "python3"
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn tokenize(&self, source: &str) -> Result<Vec<RawToken>, LexerError> {
        Scanner::new(self, source).run()
    }
}

struct Scanner<'e, 's> {
    engine: &'e Python3Engine,
    source: &'s str,
    position: Position,
    tokens: Vec<RawToken>,
    /// Indentation widths; the bottom entry is always 0
    indents: Vec<usize>,
    paren_depth: usize,
    at_line_start: bool,
    /// A default-channel token was emitted since the last NEWLINE
    pending_content: bool,
}

impl<'e, 's> Scanner<'e, 's> {
    fn new(engine: &'e Python3Engine, source: &'s str) -> Self {
        Self {
            engine,
            source,
            position: Position::start(),
            tokens: Vec::new(),
            indents: vec![0],
            paren_depth: 0,
            at_line_start: true,
            pending_content: false,
        }
    }

    fn rest(&self) -> &'s str {
        &self.source[self.position.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    /// Emit the next `length` bytes as one token
    fn emit(&mut self, length: usize, category: u32, channel: u32) {
        let text = &self.rest()[..length];
        self.tokens
            .push(RawToken::new(text, category, channel, self.position));
        self.position = self.position.advance_str(text);
        if channel == DEFAULT_CHANNEL && category != self.engine.categories.newline {
            self.pending_content = true;
        }
    }

    fn emit_empty(&mut self, category: u32) {
        self.tokens
            .push(RawToken::new("", category, DEFAULT_CHANNEL, self.position));
    }

    fn run(mut self) -> Result<Vec<RawToken>, LexerError> {
        let categories = self.engine.categories;

        while let Some(c) = self.peek() {
            if self.at_line_start {
                self.at_line_start = false;
                self.indentation()?;
                continue;
            }

            match c {
                '\n' | '\r' => self.line_end(),
                ' ' | '\t' | '\x0C' => {
                    let length = whitespace_len(self.rest());
                    self.emit(length, categories.skip, HIDDEN_CHANNEL);
                }
                '\\' if matches!(self.peek_second(), Some('\n' | '\r')) => {
                    let length = 1 + line_break_len(&self.rest()[1..]);
                    self.emit(length, categories.skip, HIDDEN_CHANNEL);
                }
                '#' => {
                    let length = self.rest().find(['\n', '\r']).unwrap_or(self.rest().len());
                    self.emit(length, categories.comment, HIDDEN_CHANNEL);
                }
                _ => self.content(c)?,
            }
        }

        if self.pending_content {
            self.emit_empty(categories.newline);
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.emit_empty(categories.dedent);
        }

        Ok(self.tokens)
    }

    fn line_end(&mut self) {
        let categories = self.engine.categories;
        let length = line_break_len(self.rest());
        if self.paren_depth == 0 && self.pending_content {
            self.emit(length, categories.newline, DEFAULT_CHANNEL);
            self.pending_content = false;
        } else {
            self.emit(length, categories.skip, HIDDEN_CHANNEL);
        }
        self.at_line_start = self.paren_depth == 0;
    }

    /// Leading whitespace of a logical line. Blank and comment-only lines
    /// leave the indentation stack alone.
    fn indentation(&mut self) -> Result<(), LexerError> {
        let categories = self.engine.categories;
        let length = whitespace_len(self.rest());
        let width = indent_width(&self.rest()[..length]);

        let blank = matches!(
            self.rest()[length..].chars().next(),
            None | Some('\n' | '\r' | '#')
        );
        let current = self.indents.last().copied().unwrap_or(0);

        if blank || width == current {
            if length > 0 {
                self.emit(length, categories.skip, HIDDEN_CHANNEL);
            }
        } else if width > current {
            self.indents.push(width);
            self.emit(length, categories.indent, DEFAULT_CHANNEL);
        } else {
            if length > 0 {
                self.emit(length, categories.skip, HIDDEN_CHANNEL);
            }
            while self.indents.last().is_some_and(|&top| top > width) {
                self.indents.pop();
                self.emit_empty(categories.dedent);
            }
            if self.indents.last().copied() != Some(width) {
                return Err(LexerError::InconsistentDedent {
                    position: self.position,
                });
            }
        }
        Ok(())
    }

    fn content(&mut self, c: char) -> Result<(), LexerError> {
        let categories = self.engine.categories;
        let rest = self.rest();

        if let Some(prefix) = string_prefix_len(rest) {
            let length = self.string_len(prefix)?;
            self.emit(length, categories.string, DEFAULT_CHANNEL);
        } else if c.is_ascii_digit()
            || (c == '.' && self.peek_second().is_some_and(|d| d.is_ascii_digit()))
        {
            self.emit(number_len(rest), categories.number, DEFAULT_CHANNEL);
        } else if c.is_alphabetic() || c == '_' {
            let length = rest
                .find(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
                .unwrap_or(rest.len());
            let category = self
                .engine
                .keywords
                .get(&rest[..length])
                .copied()
                .unwrap_or(categories.name);
            self.emit(length, category, DEFAULT_CHANNEL);
        } else if let Some(&(operator, category)) = self
            .engine
            .operators
            .iter()
            .find(|(operator, _)| rest.starts_with(operator))
        {
            match operator {
                "(" | "[" | "{" => self.paren_depth += 1,
                ")" | "]" | "}" => self.paren_depth = self.paren_depth.saturating_sub(1),
                _ => {}
            }
            self.emit(operator.len(), category, DEFAULT_CHANNEL);
        } else {
            return Err(LexerError::NoViableAlternative {
                position: self.position,
                text: c.to_string(),
            });
        }
        Ok(())
    }

    /// Byte length of the string literal at the current position, whose
    /// prefix is `prefix` bytes long
    fn string_len(&self, prefix: usize) -> Result<usize, LexerError> {
        let rest = self.rest();
        let unterminated = LexerError::UnterminatedString {
            position: self.position,
        };

        let body = &rest[prefix..];
        let Some(quote) = body.chars().next() else {
            return Err(unterminated);
        };
        let triple: String = std::iter::repeat(quote).take(3).collect();
        let is_triple = body.starts_with(&triple);
        let open = if is_triple { 3 } else { 1 };

        let mut chars = body[open..].char_indices();
        while let Some((index, ch)) = chars.next() {
            match ch {
                '\\' => {
                    if chars.next().is_none() {
                        return Err(unterminated);
                    }
                }
                '\n' | '\r' if !is_triple => return Err(unterminated),
                _ if ch == quote => {
                    let after = open + index;
                    if !is_triple {
                        return Ok(prefix + after + 1);
                    }
                    if body[after..].starts_with(&triple) {
                        return Ok(prefix + after + 3);
                    }
                }
                _ => {}
            }
        }
        Err(unterminated)
    }
}

fn whitespace_len(text: &str) -> usize {
    text.find(|c: char| !matches!(c, ' ' | '\t' | '\x0C'))
        .unwrap_or(text.len())
}

fn line_break_len(text: &str) -> usize {
    if text.starts_with("\r\n") {
        2
    } else if text.starts_with(['\n', '\r']) {
        1
    } else {
        0
    }
}

/// Column width of leading whitespace; tabs advance to the next multiple of
/// eight and a form feed resets the count
fn indent_width(whitespace: &str) -> usize {
    whitespace.chars().fold(0, |width, c| match c {
        '\t' => (width / TAB_SIZE + 1) * TAB_SIZE,
        '\x0C' => 0,
        _ => width + 1,
    })
}

/// Length of a string prefix (possibly empty) when a string literal starts here
fn string_prefix_len(text: &str) -> Option<usize> {
    if text.starts_with(['\'', '"']) {
        return Some(0);
    }
    STRING_PREFIXES.iter().find_map(|prefix| {
        let candidate = text.get(..prefix.len())?;
        let quoted = text[prefix.len()..].starts_with(['\'', '"']);
        (quoted && candidate.eq_ignore_ascii_case(prefix)).then_some(prefix.len())
    })
}

fn digits_len(text: &str, accept: impl Fn(u8) -> bool) -> usize {
    text.bytes()
        .position(|b| !(accept(b) || b == b'_'))
        .unwrap_or(text.len())
}

/// Byte length of the numeric literal at the start of `text`
fn number_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    if bytes.len() > 2 && bytes[0] == b'0' {
        // byte 1 is ASCII in every arm, so index 2 is a char boundary
        match bytes[1] {
            b'x' | b'X' => return 2 + digits_len(&text[2..], |b| b.is_ascii_hexdigit()),
            b'o' | b'O' => return 2 + digits_len(&text[2..], |b| (b'0'..=b'7').contains(&b)),
            b'b' | b'B' => return 2 + digits_len(&text[2..], |b| b == b'0' || b == b'1'),
            _ => {}
        }
    }

    let mut length = digits_len(text, |b| b.is_ascii_digit());
    if text[length..].starts_with('.') {
        length += 1;
        length += digits_len(&text[length..], |b| b.is_ascii_digit());
    }

    let exponent = &text[length..];
    if exponent.starts_with(['e', 'E']) {
        let sign = usize::from(exponent[1..].starts_with(['+', '-']));
        let digits = digits_len(&exponent[1 + sign..], |b| b.is_ascii_digit());
        if digits > 0 {
            length += 1 + sign + digits;
        }
    }

    if text[length..].starts_with(['j', 'J']) {
        length += 1;
    }
    length
}
