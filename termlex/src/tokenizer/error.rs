use crate::engine::LexerError;
use crate::file_processor::FileProcessorError;
use crate::naming::SubstitutionError;

/// Failure to tokenize one input
#[derive(Debug, thiserror::Error)]
pub enum TokenizeError {
    #[error(transparent)]
    Input(#[from] FileProcessorError),

    #[error(transparent)]
    Lexer(#[from] LexerError),

    #[error(transparent)]
    Substitution(#[from] SubstitutionError),
}

impl TokenizeError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            TokenizeError::Input(e) => e.error_code(),
            TokenizeError::Lexer(e) => e.error_code(),
            TokenizeError::Substitution(e) => e.error_code(),
        }
    }

    /// A missing substitution means the resource is incomplete for this
    /// lexer; no later file can be trusted either.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TokenizeError::Substitution(_))
    }
}
