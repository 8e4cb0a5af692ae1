//! Error types for authgate.

use thiserror::Error;

/// Common error type for authgate infrastructure (config, logging, database setup).
///
/// Request-level failures use the narrower per-component errors in
/// [`crate::auth`] and [`crate::db::StoreError`].
#[derive(Error, Debug)]
pub enum AuthgateError {
    /// Database error.
    ///
    /// Errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for AuthgateError {
    fn from(e: sqlx::Error) -> Self {
        AuthgateError::Database(e.to_string())
    }
}

/// Result type alias for authgate operations.
pub type Result<T> = std::result::Result<T, AuthgateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = AuthgateError::Config("ttl_secs must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: ttl_secs must be positive"
        );
    }

    #[test]
    fn test_database_error_display() {
        let err = AuthgateError::Database("disk I/O error".to_string());
        assert_eq!(err.to_string(), "database error: disk I/O error");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AuthgateError = io_err.into();
        assert!(matches!(err, AuthgateError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: AuthgateError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AuthgateError::Database(_)));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(AuthgateError::Config("test".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
