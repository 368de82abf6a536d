// RUNTIME PREFERENCES (diagnostics only, never affect output artifacts)

use crate::logging::LogLevel;
use std::env;

#[derive(Debug, Clone)]
pub struct LoggingPreferences {
    /// Emit log events as JSON lines instead of text
    pub use_structured_logging: bool,

    /// Most verbose level that is still emitted
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: false,
            min_log_level: LogLevel::Warning,
        }
    }
}

impl LoggingPreferences {
    /// Defaults overridden by `TERMLEX_LOG_LEVEL` and `TERMLEX_LOG_FORMAT`.
    /// Only the binary reads the environment; it affects stderr and nothing else.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            use_structured_logging: lookup("TERMLEX_LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(defaults.use_structured_logging),
            min_log_level: lookup("TERMLEX_LOG_LEVEL")
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(defaults.min_log_level),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchPreferences {
    /// Print the per-file progress lines to stdout
    pub progress_reporting: bool,

    /// Keep going after a per-file input failure instead of aborting the batch
    pub isolate_failures: bool,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        Self {
            progress_reporting: true,
            isolate_failures: false,
        }
    }
}

/// Parse log level from string
pub(crate) fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("2"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_logging_preferences_overrides() {
        let prefs = LoggingPreferences::from_lookup(|key| match key {
            "TERMLEX_LOG_LEVEL" => Some("debug".to_string()),
            "TERMLEX_LOG_FORMAT" => Some("JSON".to_string()),
            _ => None,
        });
        assert_eq!(prefs.min_log_level, LogLevel::Debug);
        assert!(prefs.use_structured_logging);

        let prefs = LoggingPreferences::from_lookup(|key| {
            (key == "TERMLEX_LOG_LEVEL").then(|| "loud".to_string())
        });
        assert_eq!(prefs.min_log_level, LogLevel::Warning);
        assert!(!prefs.use_structured_logging);

        let defaults = LoggingPreferences::default();
        assert_eq!(defaults.min_log_level, LogLevel::Warning);
        assert!(!defaults.use_structured_logging);
    }

    #[test]
    fn test_batch_preferences_default_fails_whole_batch() {
        let prefs = BatchPreferences::default();
        assert!(prefs.progress_reporting);
        assert!(!prefs.isolate_failures);
    }
}
