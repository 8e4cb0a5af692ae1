//! Input validation for user registration.

use thiserror::Error;

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Reasons a registration is rejected.
///
/// Messages are stable and safe to show to the client verbatim.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The username is already registered.
    #[error("username already exists")]
    UsernameTaken,

    /// Username is too short.
    #[error("username should contain at least {MIN_USERNAME_LENGTH} characters")]
    UsernameTooShort,

    /// Password is too short.
    #[error("password should contain at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
}

/// Validate username shape.
///
/// Length is measured in bytes of the UTF-8 encoding.
///
/// # Examples
///
/// ```
/// use authgate::auth::validation::validate_username;
///
/// assert!(validate_username("bob").is_ok());
/// assert!(validate_username("ab").is_err());
/// ```
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.len() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooShort);
    }
    Ok(())
}

/// Validate password shape.
///
/// # Examples
///
/// ```
/// use authgate::auth::validation::validate_password;
///
/// assert!(validate_password("secret1").is_ok());
/// assert!(validate_password("12345").is_err());
/// ```
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Validate both shape rules, username first.
pub fn validate_shape(username: &str, password: &str) -> Result<(), ValidationError> {
    validate_username(username)?;
    validate_password(password)
}
