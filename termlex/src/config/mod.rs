//! Configuration module for termlex
//! Compile-time limits are generated from TOML configuration by build.rs

// Include generated constants from build.rs
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

/// Fixed names and paths shared by the tokenizer and the batch runner
pub mod defaults {
    /// Substitution resource, relative to the working directory
    pub const SUBSTITUTIONS_PATH: &str = "resources/name_substitutions.json";

    /// Lexer spec value selecting the built-in Python 3 lexer
    pub const BUILT_IN_LANGUAGE: &str = "python3";

    /// Prefix of terminals synthesized from literal text
    pub const LITERAL_PREFIX: &str = "Lit_";

    /// Extension given to every output artifact
    pub const OUTPUT_EXTENSION: &str = "json";

    /// Indentation width of pretty-printed artifacts
    pub const JSON_INDENT: usize = 4;
}

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("TERMLEX_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("TERMLEX_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}
