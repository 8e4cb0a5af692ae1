//! Request DTOs for Web API.

use serde::Deserialize;

/// Login request.
#[derive(Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// User registration request.
#[derive(Deserialize)]
pub struct RegisterRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl From<RegisterRequest> for crate::auth::RegistrationRequest {
    fn from(req: RegisterRequest) -> Self {
        Self::new(req.username, req.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_debug_hides_password() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"alice","password":"secret1"}"#).unwrap();
        let output = format!("{req:?}");
        assert!(output.contains("alice"));
        assert!(!output.contains("secret1"));
    }

    #[test]
    fn test_register_request_missing_field() {
        let result = serde_json::from_str::<RegisterRequest>(r#"{"username":"alice"}"#);
        assert!(result.is_err());
    }
}
