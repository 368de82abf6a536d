//! Error and success codes with their classification metadata
//!
//! Single source of truth for every code termlex logs. Each stage error enum
//! maps its variants onto one of these codes via `error_code()`.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Substitution resource error codes
pub mod configuration {
    use super::Code;

    pub const SUBSTITUTIONS_NOT_FOUND: Code = Code::new("E001");
    pub const SUBSTITUTIONS_MALFORMED: Code = Code::new("E002");
    pub const MISSING_SUBSTITUTION: Code = Code::new("E003");
    pub const ILLEGAL_REPLACEMENT: Code = Code::new("E004");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E010");
    pub const FILE_TOO_LARGE: Code = Code::new("E011");
    pub const PERMISSION_DENIED: Code = Code::new("E012");
    pub const INVALID_ENCODING: Code = Code::new("E013");
    pub const IO_ERROR: Code = Code::new("E014");
}

/// Grammar loading error codes
pub mod grammar {
    use super::Code;

    pub const GRAMMAR_SYNTAX_ERROR: Code = Code::new("E030");
    pub const UNDEFINED_RULE: Code = Code::new("E031");
    pub const RECURSIVE_RULE: Code = Code::new("E032");
    pub const INVALID_PATTERN: Code = Code::new("E033");
    pub const UNSUPPORTED_CONSTRUCT: Code = Code::new("E034");
    pub const TOO_MANY_RULES: Code = Code::new("E035");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const NO_VIABLE_ALTERNATIVE: Code = Code::new("E040");
    pub const UNTERMINATED_STRING: Code = Code::new("E041");
    pub const INCONSISTENT_DEDENT: Code = Code::new("E042");
    pub const TOO_MANY_TOKENS: Code = Code::new("E043");
}

/// Artifact output error codes
pub mod output {
    use super::Code;

    pub const OUTPUT_WRITE_FAILURE: Code = Code::new("E060");
    pub const SERIALIZATION_FAILURE: Code = Code::new("E061");
}

/// Batch orchestration error codes
pub mod batch {
    use super::Code;

    pub const DIRECTORY_NOT_FOUND: Code = Code::new("E070");
    pub const DIRECTORY_READ_FAILURE: Code = Code::new("E071");
    pub const TOO_MANY_FILES: Code = Code::new("E072");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const SUBSTITUTIONS_LOADED: Code = Code::new("I002");
    pub const ENGINE_READY: Code = Code::new("I003");
    pub const FILE_READ: Code = Code::new("I010");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const ARTIFACT_WRITTEN: Code = Code::new("I060");
    pub const BATCH_COMPLETED: Code = Code::new("I070");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

const METADATA: &[ErrorMetadata] = &[
    // System
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        false,
        true,
        "Critical internal error",
        "File a bug report with the failing input",
    ),
    ErrorMetadata::new(
        "ERR002",
        "System",
        Severity::Critical,
        false,
        true,
        "System initialization failure",
        "Check logging configuration and environment",
    ),
    // Configuration
    ErrorMetadata::new(
        "E001",
        "Configuration",
        Severity::Critical,
        false,
        true,
        "Name substitution resource not found",
        "Run from the directory containing resources/name_substitutions.json",
    ),
    ErrorMetadata::new(
        "E002",
        "Configuration",
        Severity::Critical,
        false,
        true,
        "Name substitution resource is not a JSON object of strings",
        "Fix the JSON syntax of the substitution resource",
    ),
    ErrorMetadata::new(
        "E003",
        "Configuration",
        Severity::Critical,
        false,
        true,
        "Literal is not identifier-safe and has no substitution entry",
        "Add an entry for the literal to the substitution resource",
    ),
    ErrorMetadata::new(
        "E004",
        "Configuration",
        Severity::Critical,
        false,
        true,
        "Substitution replacement is not identifier-safe",
        "Use only [A-Za-z0-9_] in replacement names",
    ),
    // File processing
    ErrorMetadata::new(
        "E010",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "Input file not found at specified path",
        "Check that the input directory is not modified during the run",
    ),
    ErrorMetadata::new(
        "E011",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "Input file exceeds maximum size limit",
        "Split the input or rebuild with a larger limit",
    ),
    ErrorMetadata::new(
        "E012",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "Permission denied reading file",
        "Check file permissions",
    ),
    ErrorMetadata::new(
        "E013",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "Input file is not valid UTF-8",
        "Convert the file to UTF-8",
    ),
    ErrorMetadata::new(
        "E014",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "I/O error reading file",
        "Check the filesystem and retry",
    ),
    // Grammar
    ErrorMetadata::new(
        "E030",
        "Grammar",
        Severity::Critical,
        false,
        true,
        "Grammar source could not be parsed",
        "Fix the grammar syntax at the reported position",
    ),
    ErrorMetadata::new(
        "E031",
        "Grammar",
        Severity::Critical,
        false,
        true,
        "Lexer rule references an undefined rule",
        "Define the referenced rule or fix its name",
    ),
    ErrorMetadata::new(
        "E032",
        "Grammar",
        Severity::Critical,
        false,
        true,
        "Lexer rule references itself",
        "Rewrite the rule without recursion",
    ),
    ErrorMetadata::new(
        "E033",
        "Grammar",
        Severity::Critical,
        false,
        true,
        "Lexer rule compiles to an invalid pattern",
        "Simplify the rule",
    ),
    ErrorMetadata::new(
        "E034",
        "Grammar",
        Severity::Critical,
        false,
        true,
        "Grammar uses an unsupported construct",
        "Remove modes, imports, predicates or unsupported lexer commands",
    ),
    ErrorMetadata::new(
        "E035",
        "Grammar",
        Severity::Critical,
        false,
        true,
        "Grammar defines too many rules",
        "Reduce the number of rules or rebuild with a larger limit",
    ),
    // Lexical
    ErrorMetadata::new(
        "E040",
        "Lexical",
        Severity::High,
        false,
        true,
        "No lexer rule matches the input",
        "Check the input against the grammar",
    ),
    ErrorMetadata::new(
        "E041",
        "Lexical",
        Severity::High,
        false,
        true,
        "Unterminated string literal",
        "Close the string literal",
    ),
    ErrorMetadata::new(
        "E042",
        "Lexical",
        Severity::High,
        false,
        true,
        "Dedent does not match any outer indentation level",
        "Fix the indentation of the reported line",
    ),
    ErrorMetadata::new(
        "E043",
        "Lexical",
        Severity::High,
        false,
        true,
        "Input produces too many tokens",
        "Split the input or rebuild with a larger limit",
    ),
    // Output
    ErrorMetadata::new(
        "E060",
        "Output",
        Severity::Critical,
        false,
        true,
        "Output artifact could not be written",
        "Check that the output directory exists and is writable",
    ),
    ErrorMetadata::new(
        "E061",
        "Output",
        Severity::Critical,
        false,
        true,
        "Token records could not be serialized",
        "File a bug report with the failing input",
    ),
    // Batch
    ErrorMetadata::new(
        "E070",
        "Batch",
        Severity::Critical,
        false,
        true,
        "Input directory not found",
        "Check the input directory argument",
    ),
    ErrorMetadata::new(
        "E071",
        "Batch",
        Severity::Critical,
        false,
        true,
        "Input directory could not be listed",
        "Check directory permissions",
    ),
    ErrorMetadata::new(
        "E072",
        "Batch",
        Severity::Critical,
        false,
        true,
        "Input directory holds more entries than the batch limit",
        "Split the input directory",
    ),
];

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, &'static ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, &'static ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| METADATA.iter().map(|m| (m.code, m)).collect())
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code).copied()
}

/// Get error severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
