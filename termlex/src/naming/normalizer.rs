//! Terminal normalizer

use super::{is_legal, SubstitutionError, SubstitutionTable};

/// Produces an identifier-safe name for any literal.
///
/// Legal literals pass through unchanged; everything else goes through the
/// substitution table. No case folding, truncation or deduplication happens
/// here.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNormalizer<'t> {
    table: &'t SubstitutionTable,
}

impl<'t> TerminalNormalizer<'t> {
    pub fn new(table: &'t SubstitutionTable) -> Self {
        Self { table }
    }

    pub fn normalize<'a>(&self, literal: &'a str) -> Result<&'a str, SubstitutionError>
    where
        't: 'a,
    {
        let table: &'t SubstitutionTable = self.table;
        if is_legal(literal) {
            Ok(literal)
        } else {
            table.substitute(literal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn table() -> SubstitutionTable {
        let entries = [("+", "PLUS"), ("==", "EQEQUAL"), ("(", "OPEN_PAREN")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        SubstitutionTable::from_map(entries).unwrap()
    }

    #[test]
    fn test_legal_literal_is_unchanged() {
        let table = table();
        let normalizer = TerminalNormalizer::new(&table);
        assert_eq!(normalizer.normalize("while").unwrap(), "while");
        assert_eq!(normalizer.normalize("").unwrap(), "");
    }

    #[test]
    fn test_illegal_literal_is_substituted() {
        let table = table();
        let normalizer = TerminalNormalizer::new(&table);
        assert_eq!(normalizer.normalize("+").unwrap(), "PLUS");
        assert_eq!(normalizer.normalize("(").unwrap(), "OPEN_PAREN");
    }

    #[test]
    fn test_uncovered_literal_fails() {
        let table = table();
        let normalizer = TerminalNormalizer::new(&table);
        assert!(normalizer.normalize("++").is_err());
    }

    proptest! {
        #[test]
        fn legal_strings_normalize_to_themselves(s in "[A-Za-z0-9_]+") {
            let table = table();
            let normalizer = TerminalNormalizer::new(&table);
            prop_assert_eq!(normalizer.normalize(&s).unwrap(), s.as_str());
        }

        #[test]
        fn covered_illegal_strings_normalize_to_legal_replacement(
            literal in "[A-Za-z0-9_]*[^A-Za-z0-9_][^\\n]*",
            replacement in "[A-Za-z_][A-Za-z0-9_]*",
        ) {
            let mut entries = HashMap::new();
            entries.insert(literal.clone(), replacement.clone());
            let table = SubstitutionTable::from_map(entries).unwrap();
            let normalizer = TerminalNormalizer::new(&table);

            let normalized = normalizer.normalize(&literal).unwrap();
            prop_assert_eq!(normalized, replacement.as_str());
            prop_assert!(is_legal(normalized));
        }
    }
}
