//! Configuration module for authgate.

use serde::Deserialize;
use std::path::Path;

use crate::{AuthgateError, Result};

/// Web server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/authgate.db".to_string()
}

fn default_db_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_db_max_connections(),
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
    /// Name of the cookie carrying the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Interval of the background reaper in seconds (0 = disabled).
    #[serde(default)]
    pub reap_interval_secs: u64,
}

fn default_session_ttl() -> u64 {
    120
}

fn default_cookie_name() -> String {
    "session_token".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
            cookie_name: default_cookie_name(),
            reap_interval_secs: 0,
        }
    }
}

/// Password hashing cost configuration (Argon2id).
#[derive(Debug, Clone, Deserialize)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Time cost (iterations).
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    65536 // 64 MB
}

fn default_iterations() -> u32 {
    3
}

fn default_parallelism() -> u32 {
    4
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Level or `EnvFilter` directive list (e.g. `"info"`, `"authgate=debug"`).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty disables file output.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/authgate.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Web server configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Password hashing configuration.
    #[serde(default)]
    pub hashing: HashingConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(AuthgateError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Like [`load_with_env`](Self::load_with_env), but a missing file yields
    /// the defaults (with overrides applied).
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::load_with_env(path) {
            Err(AuthgateError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut config = Self::default();
                config.apply_env_overrides();
                Ok(config)
            }
            other => other,
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| AuthgateError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `AUTHGATE_DATABASE_PATH`: Override the database file path
    /// - `AUTHGATE_LOG_LEVEL`: Override the log level
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("AUTHGATE_DATABASE_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
        if let Ok(level) = std::env::var("AUTHGATE_LOG_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.session.ttl_secs == 0 {
            return Err(AuthgateError::Config(
                "session.ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.session.cookie_name.is_empty() {
            return Err(AuthgateError::Config(
                "session.cookie_name must not be empty".to_string(),
            ));
        }
        crate::auth::PasswordHasher::new(&self.hashing)
            .map_err(|e| AuthgateError::Config(format!("invalid hashing parameters: {e}")))?;
        crate::logging::level_filter(&self.logging.level)?;
        Ok(())
    }
}
