//! File processor implementation

use crate::config::compile_time::file_processing::{LARGE_FILE_THRESHOLD, MAX_FILE_SIZE};
use crate::logging::codes;
use crate::{log_debug, log_error, log_success, log_warning};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File processor specific errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Not a regular file: {path}")]
    NotAFile { path: PathBuf },

    #[error("File too large: {path} is {size} bytes (max: {max_size})")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: PathBuf },

    #[error("I/O error reading {path}: {message}")]
    IoError { path: PathBuf, message: String },
}

impl FileProcessorError {
    /// Get the appropriate error code for this error type
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::PermissionDenied { .. } => {
                codes::file_processing::PERMISSION_DENIED
            }
            FileProcessorError::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            FileProcessorError::NotAFile { .. } | FileProcessorError::IoError { .. } => {
                codes::file_processing::IO_ERROR
            }
        }
    }

    fn from_io(path: &Path, error: std::io::Error) -> Self {
        let path = path.to_path_buf();
        match error.kind() {
            ErrorKind::NotFound => FileProcessorError::FileNotFound { path },
            ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied { path },
            ErrorKind::InvalidData => FileProcessorError::InvalidEncoding { path },
            _ => FileProcessorError::IoError {
                path,
                message: error.to_string(),
            },
        }
    }
}

/// File metadata collected while reading
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    pub extension: Option<String>,
    pub line_count: usize,
}

impl FileMetadata {
    /// Check if file is above the large file threshold
    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

/// A file's text with its metadata
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub content: String,
    pub metadata: FileMetadata,
}

impl SourceFile {
    pub fn path(&self) -> &Path {
        &self.metadata.path
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// Reads whole files as UTF-8 text under a size ceiling
#[derive(Debug, Clone)]
pub struct FileProcessor {
    max_size: u64,
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FileProcessor {
    /// Processor using the compile-time maximum input file size
    pub fn new() -> Self {
        Self {
            max_size: MAX_FILE_SIZE,
        }
    }

    /// Processor with a different ceiling, never above the compile-time maximum
    pub fn with_max_size(max_size: u64) -> Self {
        Self {
            max_size: max_size.min(MAX_FILE_SIZE),
        }
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Read a file. Empty files are valid.
    pub fn read(&self, path: &Path) -> Result<SourceFile, FileProcessorError> {
        log_debug!("Reading file", "path" => path.display());

        let metadata = fs::metadata(path).map_err(|e| {
            let error = FileProcessorError::from_io(path, e);
            log_error!(error.error_code(), "Failed to read file metadata",
                "path" => path.display(),
                "error" => &error
            );
            error
        })?;

        if !metadata.is_file() {
            let error = FileProcessorError::NotAFile {
                path: path.to_path_buf(),
            };
            log_error!(error.error_code(), "Path is not a file", "path" => path.display());
            return Err(error);
        }

        let size = metadata.len();
        if size > self.max_size {
            let error = FileProcessorError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                max_size: self.max_size,
            };
            log_error!(error.error_code(), "File exceeds maximum size limit",
                "path" => path.display(),
                "size" => size,
                "max_size" => self.max_size
            );
            return Err(error);
        }

        let content = fs::read_to_string(path).map_err(|e| {
            let error = FileProcessorError::from_io(path, e);
            log_error!(error.error_code(), "Failed to read file",
                "path" => path.display(),
                "error" => &error
            );
            error
        })?;

        let file_metadata = FileMetadata {
            path: path.to_path_buf(),
            size,
            extension: path
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned()),
            line_count: content.lines().count(),
        };

        if file_metadata.is_large_file() {
            log_warning!("Large file", "path" => path.display(), "size" => size);
        }

        log_success!(codes::success::FILE_READ, "File read",
            "path" => path.display(),
            "size_bytes" => size,
            "lines" => file_metadata.line_count
        );

        Ok(SourceFile {
            content,
            metadata: file_metadata,
        })
    }
}
