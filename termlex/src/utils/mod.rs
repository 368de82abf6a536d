//! Shared primitive types used by the engines, the tokenizer and logging

pub mod span;

pub use span::Position;
