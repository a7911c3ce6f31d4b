//! Runtime configuration resolved from the environment.
//!
//! | Variable              | Default                               |
//! |-----------------------|---------------------------------------|
//! | `NOTEGRAPH_DB_PATH`   | `<temp dir>/notegraph.sqlite3`        |
//! | `NOTEGRAPH_LOG_LEVEL` | `debug` in debug builds, else `info`  |
//! | `NOTEGRAPH_LOG_DIR`   | unset: file logging stays off         |
//!
//! Blank values count as unset.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "NOTEGRAPH_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "NOTEGRAPH_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "NOTEGRAPH_LOG_DIR";

const DEFAULT_DB_FILE: &str = "notegraph.sqlite3";

/// Errors from configuration resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLogLevel(level) => {
                write!(f, "{LOG_LEVEL_VAR}: unsupported log level `{level}`")
            }
            Self::RelativeLogDir(dir) => {
                write!(f, "{LOG_DIR_VAR}: path must be absolute, got `{}`", dir.display())
            }
        }
    }
}

impl Error for ConfigError {}

/// Settings needed to open the store and start logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let db_path = value(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE));

        let log_level = match value(LOG_LEVEL_VAR) {
            Some(level) => {
                normalize_level(&level).ok_or(ConfigError::UnsupportedLogLevel(level))?
            }
            None => default_log_level(),
        };

        let log_dir = value(LOG_DIR_VAR).map(PathBuf::from);
        if let Some(dir) = &log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DB_PATH_VAR, LOG_DIR_VAR, LOG_LEVEL_VAR};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn resolve(vars: &[(&str, &str)]) -> Result<CoreConfig, ConfigError> {
        let vars = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        CoreConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let config = resolve(&[(LOG_LEVEL_VAR, "  ")]).unwrap();
        assert_eq!(config.db_path, std::env::temp_dir().join("notegraph.sqlite3"));
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_are_used() {
        let config = resolve(&[
            (DB_PATH_VAR, "/var/lib/notegraph/db.sqlite3"),
            (LOG_LEVEL_VAR, "WARNING"),
            (LOG_DIR_VAR, "/var/log/notegraph"),
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/notegraph/db.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/notegraph")));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            resolve(&[(LOG_LEVEL_VAR, "loud")]),
            Err(ConfigError::UnsupportedLogLevel("loud".to_string()))
        );
        assert_eq!(
            resolve(&[(LOG_DIR_VAR, "logs")]),
            Err(ConfigError::RelativeLogDir(PathBuf::from("logs")))
        );
    }
}
