//! Token model shared by the lexer engines and the tokenization driver
//!
//! # Overview
//!
//! Engines produce [`RawToken`]s: the exact matched text, a numeric category
//! and a channel. Each engine owns a [`Vocabulary`] that says which categories
//! have a symbolic name (`NAME`, `NEWLINE`, ...) and which were matched by an
//! anonymous literal rule (`'+'`, `'if'`, ...).
//!
//! The [`TokenClassifier`] turns a raw token into an output [`TokenRecord`]:
//!
//! - a category with a symbolic name keeps that name verbatim as its terminal;
//! - any other category gets `Lit_` followed by the normalized literal text.
//!
//! The record's `literal` is always the untouched source text.
//!
//! ## Channels
//!
//! Only tokens on [`DEFAULT_CHANNEL`] reach the output. Engines put whitespace
//! and comments on [`HIDDEN_CHANNEL`] or on a grammar-declared channel.

pub mod classifier;
pub mod token;
pub mod vocabulary;

pub use classifier::TokenClassifier;
pub use token::{RawToken, TokenRecord, DEFAULT_CHANNEL, EOF_CATEGORY, HIDDEN_CHANNEL};
pub use vocabulary::Vocabulary;
