//! Name substitution table
//!
//! Maps literals that are not identifier-legal (`+`, `==`, `**=` ...) to a
//! curated legal replacement. Loaded once before any input is tokenized and
//! read-only afterwards.

use super::is_legal;
use crate::config::defaults::SUBSTITUTIONS_PATH;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Substitution table errors. All of them are fatal for a batch run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SubstitutionError {
    #[error("Substitution resource not found: {path}")]
    ResourceNotFound { path: PathBuf },

    #[error("Cannot read substitution resource {path}: {message}")]
    ResourceUnreadable { path: PathBuf, message: String },

    #[error("Malformed substitution resource: {message}")]
    Malformed { message: String },

    #[error("Substitution for {literal:?} is not a string")]
    NonStringValue { literal: String },

    #[error("Replacement {replacement:?} for {literal:?} is not a legal identifier")]
    IllegalReplacement { literal: String, replacement: String },

    #[error("No substitution entry for literal {literal:?}")]
    MissingEntry { literal: String },
}

impl SubstitutionError {
    /// Get the appropriate error code for this error type
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            SubstitutionError::ResourceNotFound { .. }
            | SubstitutionError::ResourceUnreadable { .. } => {
                codes::configuration::SUBSTITUTIONS_NOT_FOUND
            }
            SubstitutionError::Malformed { .. } | SubstitutionError::NonStringValue { .. } => {
                codes::configuration::SUBSTITUTIONS_MALFORMED
            }
            SubstitutionError::IllegalReplacement { .. } => {
                codes::configuration::ILLEGAL_REPLACEMENT
            }
            SubstitutionError::MissingEntry { .. } => codes::configuration::MISSING_SUBSTITUTION,
        }
    }
}

/// Literal to legal-identifier mapping
#[derive(Debug, Clone, Default)]
pub struct SubstitutionTable {
    entries: HashMap<String, String>,
}

impl SubstitutionTable {
    /// Load the table from the fixed resource path relative to the working directory
    pub fn load_default() -> Result<Self, SubstitutionError> {
        Self::load(Path::new(SUBSTITUTIONS_PATH))
    }

    /// Load the table from a JSON object file
    pub fn load(path: &Path) -> Result<Self, SubstitutionError> {
        let content = fs::read_to_string(path).map_err(|e| {
            let error = match e.kind() {
                ErrorKind::NotFound => SubstitutionError::ResourceNotFound {
                    path: path.to_path_buf(),
                },
                _ => SubstitutionError::ResourceUnreadable {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                },
            };
            log_error!(error.error_code(), "Failed to read substitution resource",
                "path" => path.display(),
                "error" => &e
            );
            error
        })?;

        let table = Self::from_json_str(&content).map_err(|error| {
            log_error!(error.error_code(), "Invalid substitution resource",
                "path" => path.display(),
                "error" => &error
            );
            error
        })?;

        log_success!(codes::success::SUBSTITUTIONS_LOADED, "Substitution table loaded",
            "path" => path.display(),
            "entries" => table.len()
        );

        Ok(table)
    }

    /// Parse the table from JSON text holding a single object of string values
    pub fn from_json_str(content: &str) -> Result<Self, SubstitutionError> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| SubstitutionError::Malformed {
                message: e.to_string(),
            })?;

        let object = value.as_object().ok_or_else(|| SubstitutionError::Malformed {
            message: "top-level value must be a JSON object".to_string(),
        })?;

        let mut entries = HashMap::with_capacity(object.len());
        for (literal, replacement) in object {
            let replacement =
                replacement
                    .as_str()
                    .ok_or_else(|| SubstitutionError::NonStringValue {
                        literal: literal.clone(),
                    })?;
            entries.insert(literal.clone(), replacement.to_string());
        }

        Self::from_map(entries)
    }

    /// Build a table from an in-memory map, rejecting illegal replacements
    pub fn from_map(entries: HashMap<String, String>) -> Result<Self, SubstitutionError> {
        if let Some((literal, replacement)) = entries.iter().find(|(_, r)| !is_legal(r)) {
            return Err(SubstitutionError::IllegalReplacement {
                literal: literal.clone(),
                replacement: replacement.clone(),
            });
        }

        Ok(Self { entries })
    }

    /// Look up the replacement for a literal already known to be illegal.
    ///
    /// A missing entry means the curated table does not cover the grammar in
    /// use; callers must treat it as fatal.
    pub fn substitute(&self, literal: &str) -> Result<&str, SubstitutionError> {
        match self.entries.get(literal) {
            Some(replacement) => {
                log_debug!("Substituted literal", "literal" => literal, "replacement" => replacement);
                Ok(replacement.as_str())
            }
            None => {
                let error = SubstitutionError::MissingEntry {
                    literal: literal.to_string(),
                };
                log_error!(error.error_code(), "Literal has no substitution entry",
                    "literal" => literal
                );
                Err(error)
            }
        }
    }

    pub fn contains(&self, literal: &str) -> bool {
        self.entries.contains_key(literal)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_json_str() {
        let table = SubstitutionTable::from_json_str(r#"{"+": "PLUS", "==": "EQEQUAL"}"#).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.substitute("+").unwrap(), "PLUS");
        assert_eq!(table.substitute("==").unwrap(), "EQEQUAL");
    }

    #[test]
    fn test_missing_entry_is_error() {
        let table = SubstitutionTable::from_json_str(r#"{"+": "PLUS"}"#).unwrap();
        let error = table.substitute("++").unwrap_err();
        assert_matches!(&error, SubstitutionError::MissingEntry { literal } if literal == "++");
        assert_eq!(error.error_code(), codes::configuration::MISSING_SUBSTITUTION);
    }

    #[test]
    fn test_malformed_resources_are_rejected() {
        assert_matches!(
            SubstitutionTable::from_json_str("{not json"),
            Err(SubstitutionError::Malformed { .. })
        );
        assert_matches!(
            SubstitutionTable::from_json_str(r#"["+", "PLUS"]"#),
            Err(SubstitutionError::Malformed { .. })
        );
        assert_matches!(
            SubstitutionTable::from_json_str(r#"{"+": 1}"#),
            Err(SubstitutionError::NonStringValue { literal }) if literal == "+"
        );
    }

    #[test]
    fn test_illegal_replacement_is_rejected() {
        let result = SubstitutionTable::from_json_str(r#"{"+": "PL US"}"#);
        assert_matches!(result, Err(SubstitutionError::IllegalReplacement { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"->": "RARROW"}}"#).unwrap();

        let table = SubstitutionTable::load(file.path()).unwrap();
        assert!(table.contains("->"));
        assert!(!table.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SubstitutionTable::load(&dir.path().join("absent.json"));
        assert_matches!(result, Err(SubstitutionError::ResourceNotFound { .. }));
    }
}
