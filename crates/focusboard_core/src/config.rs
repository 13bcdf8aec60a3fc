//! Runtime configuration for hosts embedding the core.
//!
//! # Responsibility
//! - Resolve database path and logging settings from the environment.
//! - Validate values before any subsystem starts.
//!
//! # Invariants
//! - Unset variables fall back to defaults; set-but-invalid values are
//!   errors, never silently replaced.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Environment variable holding the SQLite database path.
pub const ENV_DB_PATH: &str = "FOCUSBOARD_DB_PATH";
/// Environment variable holding the log level.
pub const ENV_LOG_LEVEL: &str = "FOCUSBOARD_LOG_LEVEL";
/// Environment variable holding the absolute log directory.
pub const ENV_LOG_DIR: &str = "FOCUSBOARD_LOG_DIR";
/// Database file name used when no path is configured.
pub const DEFAULT_DB_FILE_NAME: &str = "focusboard.sqlite3";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but empty after trim.
    Empty(&'static str),
    /// Variable has a value the core cannot use.
    Invalid { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(key) => write!(f, "`{key}` is set but empty"),
            Self::Invalid { key, message } => write!(f, "invalid `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// File logging is disabled when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = read(&lookup, ENV_DB_PATH)? {
            config.db_path = PathBuf::from(value);
        }
        if let Some(value) = read(&lookup, ENV_LOG_LEVEL)? {
            config.log_level = normalize_level(&value).map_err(|message| ConfigError::Invalid {
                key: ENV_LOG_LEVEL,
                message,
            })?;
        }
        if let Some(value) = read(&lookup, ENV_LOG_DIR)? {
            let path = PathBuf::from(value);
            if !path.is_absolute() {
                return Err(ConfigError::Invalid {
                    key: ENV_LOG_DIR,
                    message: format!("must be an absolute path, got `{}`", path.display()),
                });
            }
            config.log_dir = Some(path);
        }

        Ok(config)
    }
}

fn read(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(key)),
        Some(value) => Ok(Some(value.trim().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> Result<CoreConfig, ConfigError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        CoreConfig::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn reads_and_normalizes_values() {
        let log_dir = std::env::temp_dir().join("focusboard-logs");
        let config = config_from(&[
            (ENV_DB_PATH, " boards.sqlite3 "),
            (ENV_LOG_LEVEL, "WARNING"),
            (ENV_LOG_DIR, log_dir.to_str().unwrap()),
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("boards.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(log_dir));
    }

    #[test]
    fn rejects_empty_and_invalid_values() {
        assert_eq!(
            config_from(&[(ENV_DB_PATH, "  ")]),
            Err(ConfigError::Empty(ENV_DB_PATH))
        );
        assert!(matches!(
            config_from(&[(ENV_LOG_LEVEL, "loud")]),
            Err(ConfigError::Invalid { key, .. }) if key == ENV_LOG_LEVEL
        ));
        assert!(matches!(
            config_from(&[(ENV_LOG_DIR, "relative/logs")]),
            Err(ConfigError::Invalid { key, .. }) if key == ENV_LOG_DIR
        ));
    }
}
