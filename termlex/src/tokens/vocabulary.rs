//! Token vocabulary
//!
//! Maps a numeric category to an optional literal name (the quoted text of an
//! anonymous literal rule, e.g. `'+'`) and an optional symbolic name (e.g.
//! `NAME`). Category 0 is end of input; real categories start at 1.

use super::token::EOF_CATEGORY;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    literal_names: Vec<Option<String>>,
    symbolic_names: Vec<Option<String>>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self {
            literal_names: vec![None],
            symbolic_names: vec![Some("EOF".to_string())],
        }
    }

    /// Register the next category and return its id
    pub fn define(&mut self, literal_name: Option<&str>, symbolic_name: Option<&str>) -> u32 {
        self.literal_names
            .push(literal_name.map(|l| format!("'{}'", l)));
        self.symbolic_names.push(symbolic_name.map(str::to_string));
        self.max_token_type()
    }

    /// Register an anonymous literal category
    pub fn define_literal(&mut self, literal: &str) -> u32 {
        self.define(Some(literal), None)
    }

    /// Register a named category
    pub fn define_symbolic(&mut self, name: &str) -> u32 {
        self.define(None, Some(name))
    }

    /// Symbolic name of a category, or `None` for anonymous literal rules
    /// and unknown categories
    pub fn symbolic_name(&self, category: u32) -> Option<&str> {
        self.symbolic_names
            .get(category as usize)
            .and_then(|name| name.as_deref())
    }

    /// Quoted literal name of a category, if it was defined by a literal rule
    pub fn literal_name(&self, category: u32) -> Option<&str> {
        if category == EOF_CATEGORY {
            return None;
        }
        self.literal_names
            .get(category as usize)
            .and_then(|name| name.as_deref())
    }

    /// Name for diagnostics: literal name, then symbolic name, then the id
    pub fn display_name(&self, category: u32) -> String {
        self.literal_name(category)
            .or_else(|| self.symbolic_name(category))
            .map(str::to_string)
            .unwrap_or_else(|| category.to_string())
    }

    /// Highest category id defined
    pub fn max_token_type(&self) -> u32 {
        self.symbolic_names.len().saturating_sub(1) as u32
    }

    /// Find the category carrying a symbolic name
    pub fn category_of(&self, symbolic_name: &str) -> Option<u32> {
        self.symbolic_names
            .iter()
            .position(|name| name.as_deref() == Some(symbolic_name))
            .map(|index| index as u32)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_start_at_one() {
        let mut vocabulary = Vocabulary::new();
        let plus = vocabulary.define_literal("+");
        let name = vocabulary.define_symbolic("NAME");

        assert_eq!(plus, 1);
        assert_eq!(name, 2);
        assert_eq!(vocabulary.max_token_type(), 2);
        assert_eq!(vocabulary.symbolic_name(EOF_CATEGORY), Some("EOF"));
    }

    #[test]
    fn test_symbolic_and_literal_names() {
        let mut vocabulary = Vocabulary::new();
        let plus = vocabulary.define_literal("+");
        let assign = vocabulary.define(Some("="), Some("ASSIGN"));

        assert_eq!(vocabulary.symbolic_name(plus), None);
        assert_eq!(vocabulary.literal_name(plus), Some("'+'"));
        assert_eq!(vocabulary.symbolic_name(assign), Some("ASSIGN"));
        assert_eq!(vocabulary.display_name(assign), "'='");
        assert_eq!(vocabulary.display_name(99), "99");
        assert_eq!(vocabulary.category_of("ASSIGN"), Some(assign));
    }

    #[test]
    fn test_default_vocabulary_is_usable() {
        let mut vocabulary = Vocabulary::default();
        assert_eq!(vocabulary.define_symbolic("NAME"), 1);
    }
}
