//! Administrator accounts, sessions and the authentication state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::USERNAME_REGEX;
use crate::error::AppError;

/// Administrator account (credentials for the auth gate only)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AdminAccount {
    pub id: i64,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Server-side session backing a signed token
#[derive(Debug, Clone, FromRow)]
pub struct AdminSession {
    pub id: Uuid,
    pub admin_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Register administrator request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterAdmin {
    #[validate(
        length(min = 3, max = 150, message = "Username must be 3 to 150 characters"),
        regex(path = *USERNAME_REGEX, message = "Username may only contain letters, digits and @/./+/-/_")
    )]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords don't match"))]
    pub password_confirm: String,
}

/// JWT claims carried by the session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub admin_id: i64,
    /// Session id; the token is only honoured while this session row exists
    pub sid: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl AdminClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a JWT token (signature and expiry)
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let mut validation = Validation::default();
        validation.leeway = 0;
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(token_data.claims)
    }
}

/// Authentication state of the caller of a record operation
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated(AdminClaims),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    /// Require an authenticated administrator
    pub fn require_admin(&self) -> Result<&AdminClaims, AppError> {
        match self {
            AuthState::Authenticated(claims) => Ok(claims),
            AuthState::Anonymous => Err(AppError::Unauthorized(
                "Authentication required".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp_offset: i64) -> AdminClaims {
        let now = Utc::now().timestamp();
        AdminClaims {
            sub: "admin".to_string(),
            admin_id: 1,
            sid: Uuid::new_v4(),
            exp: now + exp_offset,
            iat: now,
        }
    }

    #[test]
    fn token_round_trip_with_matching_secret() {
        let claims = claims(3600);
        let token = claims.create_token("secret").unwrap();
        assert_eq!(AdminClaims::from_token(&token, "secret").unwrap(), claims);
        assert!(AdminClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = claims(-60).create_token("secret").unwrap();
        assert!(AdminClaims::from_token(&token, "secret").is_err());
    }

    #[test]
    fn anonymous_state_is_unauthorized() {
        assert!(matches!(
            AuthState::Anonymous.require_admin(),
            Err(AppError::Unauthorized(_))
        ));
        assert!(AuthState::Authenticated(claims(60)).require_admin().is_ok());
    }

    #[test]
    fn registration_requires_matching_passwords() {
        let register = RegisterAdmin {
            username: "admin".to_string(),
            email: None,
            password: "correct horse".to_string(),
            password_confirm: "battery staple".to_string(),
        };
        assert!(register.validate().is_err());
    }
}
