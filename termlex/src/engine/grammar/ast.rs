//! Parsed form of a lexer grammar

/// One member of a character set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetItem {
    Char(char),
    Range(char, char),
}

/// Repetition operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Optional,
    ZeroOrMore,
    OneOrMore,
}

/// A lexer rule element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Quoted literal, escapes already decoded
    Literal(String),
    /// `[a-z]`, `~[...]`, `~'x'`, `'a'..'z'`
    Set { negated: bool, items: Vec<SetItem> },
    /// `.`
    Any,
    /// Reference to another lexer rule or fragment
    RuleRef(String),
    /// Parenthesized alternatives
    Group(Vec<Alternative>),
    Repeat {
        element: Box<Element>,
        quantifier: Quantifier,
        greedy: bool,
    },
}

/// A sequence of elements
pub type Alternative = Vec<Element>;

/// What happens to a token once a rule matched it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAction {
    /// Emit on the given channel
    Emit(u32),
    /// Drop the matched text
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerRule {
    pub name: String,
    pub fragment: bool,
    pub alternatives: Vec<Alternative>,
    pub action: TokenAction,
    /// Line of the rule name in the grammar source
    pub line: u32,
}

impl LexerRule {
    /// The literal text when the whole rule is exactly one quoted literal
    pub fn literal_alias(&self) -> Option<&str> {
        match self.alternatives.as_slice() {
            [alternative] => match alternative.as_slice() {
                [Element::Literal(text)] if !self.fragment => Some(text.as_str()),
                _ => None,
            },
            _ => None,
        }
    }
}

/// A whole grammar after parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    pub name: String,
    /// Names from a `tokens { ... }` block
    pub declared_tokens: Vec<String>,
    /// Names from a `channels { ... }` block; ids start at 2
    pub channels: Vec<String>,
    /// Distinct literals used by parser rules, in order of first use
    pub parser_literals: Vec<String>,
    pub lexer_rules: Vec<LexerRule>,
}

impl Grammar {
    pub fn rule(&self, name: &str) -> Option<&LexerRule> {
        self.lexer_rules.iter().find(|rule| rule.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(alternatives: Vec<Alternative>, fragment: bool) -> LexerRule {
        LexerRule {
            name: "ASSIGN".to_string(),
            fragment,
            alternatives,
            action: TokenAction::Emit(0),
            line: 1,
        }
    }

    #[test]
    fn test_literal_alias() {
        let single = rule(vec![vec![Element::Literal("=".to_string())]], false);
        assert_eq!(single.literal_alias(), Some("="));

        let fragment = rule(vec![vec![Element::Literal("=".to_string())]], true);
        assert_eq!(fragment.literal_alias(), None);

        let two = rule(
            vec![
                vec![Element::Literal("=".to_string())],
                vec![Element::Literal(":=".to_string())],
            ],
            false,
        );
        assert_eq!(two.literal_alias(), None);
    }
}
