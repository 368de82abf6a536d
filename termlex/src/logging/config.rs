//! Configuration access for logging
//!
//! Runtime preferences are stored once; until then the environment defaults apply.

use crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
use crate::config::runtime::LoggingPreferences;
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Initialize runtime preferences
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

/// Get minimum log level
pub fn get_min_log_level() -> LogLevel {
    get_runtime_preferences().min_log_level
}

/// Check if structured logging is enabled
pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

/// Validate the compile-time logging limits
pub fn validate_config() -> Result<(), String> {
    if MAX_LOG_MESSAGE_LENGTH < 64 {
        return Err(format!(
            "max_log_message_length too small: {} (min 64)",
            MAX_LOG_MESSAGE_LENGTH
        ));
    }
    Ok(())
}

/// Human-readable configuration summary
pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();
    format!(
        "Logging: level={}, structured={}, max_message_length={} ({})",
        preferences.min_log_level.as_str(),
        preferences.use_structured_logging,
        MAX_LOG_MESSAGE_LENGTH,
        crate::config::build_info::source_info()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_config_summary() {
        let summary = get_config_summary();
        assert!(summary.contains("level="));
        assert!(summary.contains("max_message_length="));
    }
}
