//! Command-line and environment configuration.
//!
//! # Invariants
//! - Every setting can come from a flag or its `PASTORAL_*` variable; the
//!   flag wins.
//! - File logging is enabled only when a log directory is configured.

use clap::{Args, ValueEnum};
use pastoral_core::{default_log_level, LoggingConfig};
use std::path::{Path, PathBuf};

/// Backing store for the case document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Single pretty-printed JSON file.
    Json,
    /// SQLite database with revision compare-and-swap.
    Sqlite,
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Document store backend.
    #[arg(
        long,
        env = "PASTORAL_STORE",
        value_enum,
        default_value_t = StoreKind::Json,
        global = true
    )]
    pub store: StoreKind,

    /// Path of the JSON document or SQLite database.
    #[arg(
        long = "data",
        env = "PASTORAL_DATA_PATH",
        default_value = "data/seed.json",
        global = true
    )]
    pub data_path: PathBuf,

    /// Log level: trace|debug|info|warn|error (default depends on build mode).
    #[arg(long, env = "PASTORAL_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "PASTORAL_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Logging settings, or `None` when no log directory is configured.
    ///
    /// Relative directories are resolved against the current directory.
    pub fn logging(&self) -> Result<Option<LoggingConfig>, String> {
        let Some(log_dir) = self.log_dir.as_deref() else {
            return Ok(None);
        };
        let log_dir = absolutize(log_dir)?;
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| format!("log dir `{}` is not valid UTF-8", log_dir.display()))?;
        let level = self.log_level.as_deref().unwrap_or(default_log_level());
        LoggingConfig::new(level, log_dir)
            .map(|config| Some(config.with_echo_warnings(true)))
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, String> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|err| format!("cannot resolve current directory: {err}"))
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, StoreKind};
    use std::path::PathBuf;

    fn config(log_dir: Option<&str>, level: Option<&str>) -> AppConfig {
        AppConfig {
            store: StoreKind::Json,
            data_path: PathBuf::from("data/seed.json"),
            log_level: level.map(str::to_string),
            log_dir: log_dir.map(PathBuf::from),
        }
    }

    #[test]
    fn logging_is_off_without_directory() {
        assert_eq!(config(None, Some("info")).logging().unwrap(), None);
    }

    #[test]
    fn relative_log_dir_is_resolved() {
        let logging = config(Some("logs"), Some("warn")).logging().unwrap().unwrap();
        assert!(logging.log_dir().is_absolute());
        assert_eq!(logging.level(), "warn");
    }

    #[test]
    fn bad_level_is_reported() {
        assert!(config(Some("/tmp/pastoral-logs"), Some("chatty"))
            .logging()
            .is_err());
    }
}
