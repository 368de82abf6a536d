// Internal modules
pub mod batch;
pub mod config;
pub mod engine;
pub mod file_processor;
#[macro_use]
pub mod logging;
pub mod naming;
pub mod tokenizer;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use engine::{LexerEngine, LexerSpec};
pub use naming::{SubstitutionTable, TerminalNormalizer};
pub use tokenizer::{TokenizeError, Tokenizer};
pub use tokens::TokenRecord;
