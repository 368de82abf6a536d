//! Token classification

use super::{RawToken, TokenRecord, Vocabulary};
use crate::config::defaults::LITERAL_PREFIX;
use crate::naming::{SubstitutionError, TerminalNormalizer};

/// Decides the terminal name of each raw token for one vocabulary
#[derive(Debug, Clone, Copy)]
pub struct TokenClassifier<'v, 't> {
    vocabulary: &'v Vocabulary,
    normalizer: TerminalNormalizer<'t>,
}

impl<'v, 't> TokenClassifier<'v, 't> {
    pub fn new(vocabulary: &'v Vocabulary, normalizer: TerminalNormalizer<'t>) -> Self {
        Self {
            vocabulary,
            normalizer,
        }
    }

    /// Classify a raw token.
    ///
    /// The only failure is a missing substitution for an illegal literal,
    /// which must abort the batch.
    pub fn classify(&self, token: &RawToken) -> Result<TokenRecord, SubstitutionError> {
        let terminal = match self.vocabulary.symbolic_name(token.category) {
            Some(name) => name.to_string(),
            None => format!(
                "{}{}",
                LITERAL_PREFIX,
                self.normalizer.normalize(&token.literal)?
            ),
        };

        Ok(TokenRecord::new(terminal, token.literal.as_str()))
    }
}
