//! Tracing setup for authgate.
//!
//! Events go to stdout and, unless `logging.file` is empty, to an
//! append-only log file. `RUST_LOG` takes precedence over the configured
//! level when it is set and parses.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::{AuthgateError, Result};

/// Parse a configured level or directive list (`"info"`,
/// `"authgate=debug,tower_http=info"`).
pub fn level_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level)
        .map_err(|e| AuthgateError::Config(format!("invalid log level {level:?}: {e}")))
}

fn effective_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => level_filter(level),
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber.
///
/// Fails on an unparsable level, an unwritable log file, or when a
/// subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = effective_filter(&config.level)?;

    let file_layer = if config.file.is_empty() {
        None
    } else {
        let file = open_log_file(Path::new(&config.file))?;
        Some(
            fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_target(true),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
        .map_err(|e| AuthgateError::Config(format!("logging already initialized: {e}")))
}

/// Console-only fallback used when [`init`] fails.
///
/// An unparsable level falls back to `info` here so startup can still
/// report the problem.
pub fn init_console_only(level: &str) {
    let filter = effective_filter(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_accepts_levels_and_directives() {
        assert!(level_filter("info").is_ok());
        assert!(level_filter("DEBUG").is_ok());
        assert!(level_filter("authgate=debug,tower_http=info").is_ok());
    }

    #[test]
    fn test_level_filter_rejects_bad_level() {
        let result = level_filter("authgate=loud");
        assert!(matches!(result, Err(AuthgateError::Config(_))));
    }

    #[test]
    fn test_open_log_file_creates_parent_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/logs/authgate.log");

        {
            use std::io::Write;
            let mut file = open_log_file(&path).unwrap();
            writeln!(file, "first").unwrap();
        }
        {
            use std::io::Write;
            let mut file = open_log_file(&path).unwrap();
            writeln!(file, "second").unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_init_rejects_bad_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            level: "authgate=loud".to_string(),
            file: String::new(),
        };
        assert!(matches!(init(&config), Err(AuthgateError::Config(_))));
    }
}
