use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// JWT claims carried by every issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "name field is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password field is required"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "password confirmation does not match"))]
    pub password_confirmation: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password field is required"))]
    pub password: String,
}

/// Returned by both register and login: a fresh token plus the user's name.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub name: String,
}

/// The authenticated caller's identity. The password hash is never exposed.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn register_request(password_confirmation: &str) -> RegisterRequest {
        RegisterRequest {
            name: "A".to_string(),
            email: "a@a.com".to_string(),
            password: "secret".to_string(),
            password_confirmation: password_confirmation.to_string(),
        }
    }

    #[test]
    fn test_register_request_valid() {
        assert!(register_request("secret").validate().is_ok());
    }

    #[test]
    fn test_register_request_confirmation_mismatch() {
        let errors = register_request("different").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password_confirmation"));
    }

    #[test]
    fn test_register_request_malformed_email() {
        let mut request = register_request("secret");
        request.email = "not-an-email".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_login_request_requires_password() {
        let request = LoginRequest {
            email: "a@a.com".to_string(),
            password: "".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
