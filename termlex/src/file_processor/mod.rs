//! File processor: reads input files and grammar sources as UTF-8 text
//! under the compile-time size limits.

mod processor;

use crate::config::compile_time::file_processing::{LARGE_FILE_THRESHOLD, MAX_FILE_SIZE};
use crate::config::compile_time::grammar::MAX_GRAMMAR_SIZE;
use std::path::Path;

pub use processor::{FileMetadata, FileProcessor, FileProcessorError, SourceFile};

/// Read an input file with the default limits
pub fn read_input(path: &Path) -> Result<SourceFile, FileProcessorError> {
    FileProcessor::new().read(path)
}

/// Read a grammar source with the grammar size limit
pub fn read_grammar(path: &Path) -> Result<SourceFile, FileProcessorError> {
    FileProcessor::with_max_size(MAX_GRAMMAR_SIZE).read(path)
}

/// Get the compile-time maximum input file size
pub fn get_max_file_size() -> u64 {
    MAX_FILE_SIZE
}

/// Get the compile-time large file threshold
pub fn get_large_file_threshold() -> u64 {
    LARGE_FILE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_module_api() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("sample.py");
        fs::write(&file_path, "x = 1\n").unwrap();

        let source = read_input(&file_path).unwrap();
        assert_eq!(source.content, "x = 1\n");
    }

    #[test]
    fn test_compile_time_constants_access() {
        assert!(get_max_file_size() > 0);
        assert!(get_large_file_threshold() <= get_max_file_size());
    }
}
