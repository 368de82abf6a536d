//! Batch processing module
//!
//! Tokenizes every file of an input directory with one shared engine and
//! substitution table, writing one JSON artifact per input into the output
//! directory. Files are processed sequentially in sorted path order.

use crate::config::compile_time::batch_processing::MAX_FILES_PER_BATCH;
use crate::config::defaults::{JSON_INDENT, OUTPUT_EXTENSION};
use crate::config::runtime::BatchPreferences;
use crate::engine::LexerEngine;
use crate::logging::{self, codes};
use crate::naming::SubstitutionTable;
use crate::tokenizer::{TokenizeError, Tokenizer};
use crate::tokens::TokenRecord;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

/// Batch processing configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub progress_reporting: bool,
    /// Record per-file failures and keep going. Missing substitutions and
    /// output write failures still abort the batch.
    pub isolate_failures: bool,
    pub max_files: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::from(&BatchPreferences::default())
    }
}

impl From<&BatchPreferences> for BatchConfig {
    fn from(preferences: &BatchPreferences) -> Self {
        Self {
            progress_reporting: preferences.progress_reporting,
            isolate_failures: preferences.isolate_failures,
            max_files: MAX_FILES_PER_BATCH,
        }
    }
}

/// One written artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub token_count: usize,
}

/// Batch processing results
#[derive(Debug)]
pub struct BatchResults {
    pub completed: Vec<FileOutcome>,
    /// Only populated in isolation mode
    pub failed: Vec<(PathBuf, TokenizeError)>,
    pub processing_duration: Duration,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self {
            completed: Vec::new(),
            failed: Vec::new(),
            processing_duration: Duration::new(0, 0),
            files_discovered: 0,
        }
    }

    pub fn success_count(&self) -> usize {
        self.completed.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn total_tokens(&self) -> usize {
        self.completed.iter().map(|outcome| outcome.token_count).sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch completed: {} files discovered, {} written, {} failed, {} tokens, {:.2}s total",
            self.files_discovered,
            self.success_count(),
            self.failure_count(),
            self.total_tokens(),
            self.processing_duration.as_secs_f64()
        )
    }
}

impl Default for BatchResults {
    fn default() -> Self {
        Self::new()
    }
}

/// Batch processing errors
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Cannot list directory {path}: {message}")]
    DirectoryRead { path: PathBuf, message: String },

    #[error("Too many files found: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("Cannot serialize tokens for {path}: {message}")]
    Serialization { path: PathBuf, message: String },

    #[error("Cannot write {path}: {message}")]
    OutputWrite { path: PathBuf, message: String },

    #[error("Failed to tokenize {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: TokenizeError,
    },
}

impl BatchError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            BatchError::DirectoryNotFound { .. } => codes::batch::DIRECTORY_NOT_FOUND,
            BatchError::DirectoryRead { .. } => codes::batch::DIRECTORY_READ_FAILURE,
            BatchError::TooManyFiles { .. } => codes::batch::TOO_MANY_FILES,
            BatchError::Serialization { .. } => codes::output::SERIALIZATION_FAILURE,
            BatchError::OutputWrite { .. } => codes::output::OUTPUT_WRITE_FAILURE,
            BatchError::File { source, .. } => source.error_code(),
        }
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

fn require_directory(path: &Path) -> Result<(), BatchError> {
    if path.is_dir() {
        return Ok(());
    }
    let error = BatchError::DirectoryNotFound {
        path: path.to_path_buf(),
    };
    crate::log_error!(error.error_code(), "Directory not found",
        "path" => path.display()
    );
    Err(error)
}

/// List the files of an input directory in sorted order.
///
/// Not recursive. Subdirectories are skipped with a warning.
pub fn discover_inputs(dir_path: &Path, config: &BatchConfig) -> Result<Vec<PathBuf>, BatchError> {
    require_directory(dir_path)?;

    let read_error = |e: std::io::Error| {
        let error = BatchError::DirectoryRead {
            path: dir_path.to_path_buf(),
            message: e.to_string(),
        };
        crate::log_error!(error.error_code(), "Cannot list input directory",
            "path" => dir_path.display(),
            "error" => e
        );
        error
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir_path).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if path.is_dir() {
            crate::log_warning!("Skipping subdirectory", "path" => path.display());
            continue;
        }
        files.push(path);
    }

    if files.len() > config.max_files {
        let error = BatchError::TooManyFiles {
            count: files.len(),
            max: config.max_files,
        };
        crate::log_error!(error.error_code(), "Too many input files",
            "count" => files.len(),
            "max" => config.max_files
        );
        return Err(error);
    }

    // Sort files for deterministic processing order
    files.sort();

    crate::log_info!("File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

// ============================================================================
// ARTIFACTS
// ============================================================================

/// Output path for an input: its file name with the last extension
/// replaced by `json`, or `.json` appended when it has none
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|name| PathBuf::from(name).with_extension(OUTPUT_EXTENSION))
        .unwrap_or_else(|| PathBuf::from(format!(".{}", OUTPUT_EXTENSION)));
    output_dir.join(file_name)
}

/// Operator-facing progress report for one tokenized input
pub fn progress_line(name: &str, token_count: usize) -> String {
    format!("tokenizing : {}\n# tokens   : {}\n***", name, token_count)
}

/// Pretty-printed JSON array of records, without a trailing newline
pub fn render_artifact(records: &[TokenRecord]) -> Result<String, serde_json::Error> {
    let indent = " ".repeat(JSON_INDENT);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    records.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Serialize records and write them to `path`, replacing any existing file
pub fn write_artifact(path: &Path, records: &[TokenRecord]) -> Result<(), BatchError> {
    let rendered = render_artifact(records).map_err(|e| {
        let error = BatchError::Serialization {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        crate::log_error!(error.error_code(), "Serialization failed", "error" => e);
        error
    })?;

    fs::write(path, rendered).map_err(|e| {
        let error = BatchError::OutputWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        crate::log_error!(error.error_code(), "Cannot write artifact",
            "path" => path.display(),
            "error" => e
        );
        error
    })?;

    crate::log_success!(codes::success::ARTIFACT_WRITTEN, "Artifact written",
        "path" => path.display(),
        "tokens" => records.len()
    );
    Ok(())
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

/// Tokenize every file of `input_dir` into `output_dir`.
///
/// Both directories must exist. By default the first failure aborts the
/// batch; artifacts already written are left in place.
pub fn run(
    engine: &dyn LexerEngine,
    table: &SubstitutionTable,
    input_dir: &Path,
    output_dir: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();

    crate::log_info!("Starting batch processing",
        "engine" => engine.name(),
        "input_dir" => input_dir.display(),
        "output_dir" => output_dir.display()
    );

    require_directory(output_dir)?;
    let inputs = discover_inputs(input_dir, config)?;
    let tokenizer = Tokenizer::new(engine, table);

    let mut results = BatchResults::new();
    results.files_discovered = inputs.len();

    for (file_id, input) in inputs.iter().enumerate() {
        let outcome = logging::with_file_context(input.clone(), file_id, || {
            process_file(&tokenizer, input, output_dir, config)
        });

        match outcome {
            Ok(outcome) => results.completed.push(outcome),
            Err(BatchError::File { path, source }) if config.isolate_failures && !source.is_fatal() => {
                crate::log_warning!("Skipping failed input",
                    "path" => path.display(),
                    "error" => &source
                );
                results.failed.push((path, source));
            }
            Err(error) => return Err(error),
        }
    }

    results.processing_duration = start_time.elapsed();

    crate::log_success!(codes::success::BATCH_COMPLETED, "Batch processing completed",
        "files_processed" => results.success_count(),
        "failed" => results.failure_count(),
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );

    Ok(results)
}

fn process_file(
    tokenizer: &Tokenizer<'_, '_>,
    input: &Path,
    output_dir: &Path,
    config: &BatchConfig,
) -> Result<FileOutcome, BatchError> {
    let records = tokenizer
        .tokenize_file(input)
        .map_err(|source| BatchError::File {
            path: input.to_path_buf(),
            source,
        })?;

    if config.progress_reporting {
        let name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("{}", progress_line(&name, records.len()));
    }

    let output = output_path_for(input, output_dir);
    write_artifact(&output, &records)?;

    Ok(FileOutcome {
        input: input.to_path_buf(),
        output,
        token_count: records.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GrammarEngine;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    const WORDS: &str = "lexer grammar Words;\nWORD : [a-z]+ ;\nWS : [ \\n]+ -> skip ;\n";

    fn quiet() -> BatchConfig {
        BatchConfig {
            progress_reporting: false,
            ..BatchConfig::default()
        }
    }

    #[test]
    fn test_output_path_for() {
        let out = Path::new("out");
        assert_eq!(output_path_for(Path::new("in/a.py"), out), out.join("a.json"));
        assert_eq!(output_path_for(Path::new("in/a.b.txt"), out), out.join("a.b.json"));
        assert_eq!(output_path_for(Path::new("in/README"), out), out.join("README.json"));
        assert_eq!(output_path_for(Path::new("in/.hidden"), out), out.join(".hidden.json"));
    }

    #[test]
    fn test_progress_line() {
        assert_eq!(
            progress_line("add.py", 26),
            "tokenizing : add.py\n# tokens   : 26\n***"
        );
        assert_eq!(progress_line("empty", 0).lines().nth(1), Some("# tokens   : 0"));
    }

    #[test]
    fn test_render_artifact() {
        let records = vec![TokenRecord::new("NAME", "x"), TokenRecord::new("Lit_PLUS", "+")];
        let rendered = render_artifact(&records).unwrap();
        assert_eq!(
            rendered,
            "[\n    {\n        \"terminal\": \"NAME\",\n        \"literal\": \"x\"\n    },\n    {\n        \"terminal\": \"Lit_PLUS\",\n        \"literal\": \"+\"\n    }\n]"
        );
        assert_eq!(render_artifact(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_file_discovery() {
        let temp_dir = tempdir().unwrap();
        let temp_path = temp_dir.path();

        fs::write(temp_path.join("b.txt"), "b").unwrap();
        fs::write(temp_path.join("a.txt"), "a").unwrap();
        fs::create_dir(temp_path.join("nested")).unwrap();

        let files = discover_inputs(temp_path, &quiet()).unwrap();
        assert_eq!(files, vec![temp_path.join("a.txt"), temp_path.join("b.txt")]);
    }

    #[test]
    fn test_file_limit() {
        let temp_dir = tempdir().unwrap();
        for name in ["a", "b", "c"] {
            fs::write(temp_dir.path().join(name), name).unwrap();
        }
        let config = BatchConfig {
            max_files: 2,
            ..quiet()
        };
        assert_matches!(
            discover_inputs(temp_dir.path(), &config),
            Err(BatchError::TooManyFiles { count: 3, max: 2 })
        );
    }

    #[test]
    fn test_missing_directories() {
        let temp_dir = tempdir().unwrap();
        let engine = GrammarEngine::from_source(WORDS).unwrap();
        let table = SubstitutionTable::default();

        let missing = temp_dir.path().join("missing");
        let error = run(&engine, &table, &missing, temp_dir.path(), &quiet()).unwrap_err();
        assert_matches!(error, BatchError::DirectoryNotFound { .. });
        assert_eq!(error.error_code().as_str(), "E070");

        assert_matches!(
            run(&engine, &table, temp_dir.path(), &missing, &quiet()),
            Err(BatchError::DirectoryNotFound { .. })
        );
    }

    #[test]
    fn test_run_writes_one_artifact_per_input() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        fs::write(input.path().join("one.txt"), "hello world").unwrap();
        fs::write(input.path().join("two.txt"), "").unwrap();

        let engine = GrammarEngine::from_source(WORDS).unwrap();
        let table = SubstitutionTable::default();
        let results = run(&engine, &table, input.path(), output.path(), &quiet()).unwrap();

        assert_eq!(results.success_count(), 2);
        assert_eq!(results.total_tokens(), 2);
        assert!(results.summary().contains("2 written"));

        let one = fs::read_to_string(output.path().join("one.json")).unwrap();
        let parsed: Vec<TokenRecord> = serde_json::from_str(&one).unwrap();
        assert_eq!(parsed, vec![TokenRecord::new("WORD", "hello"), TokenRecord::new("WORD", "world")]);
        assert_eq!(fs::read_to_string(output.path().join("two.json")).unwrap(), "[]");
    }

    #[test]
    fn test_isolation_mode_continues_after_lexer_failure() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        fs::write(input.path().join("a.txt"), "ok").unwrap();
        fs::write(input.path().join("b.txt"), "NOT OK").unwrap();
        fs::write(input.path().join("c.txt"), "fine").unwrap();

        let engine = GrammarEngine::from_source(WORDS).unwrap();
        let table = SubstitutionTable::default();

        let aborted = run(&engine, &table, input.path(), output.path(), &quiet()).unwrap_err();
        assert_matches!(aborted, BatchError::File { ref path, .. } if path.ends_with("b.txt"));
        assert!(output.path().join("a.json").exists());
        assert!(!output.path().join("c.json").exists());

        let config = BatchConfig {
            isolate_failures: true,
            ..quiet()
        };
        let results = run(&engine, &table, input.path(), output.path(), &config).unwrap();
        assert_eq!(results.success_count(), 2);
        assert_eq!(results.failure_count(), 1);
        assert!(output.path().join("c.json").exists());
    }
}
