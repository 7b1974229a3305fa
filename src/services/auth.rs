//! Authentication gate: administrator accounts and sessions

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        admin::{AdminAccount, AdminClaims, AuthState, RegisterAdmin},
        trimmed, trimmed_opt,
    },
    repository::Repository,
};

/// Checked in place of a real hash when the username is unknown, so a miss
/// costs the same argon2 work as a wrong password.
static UNKNOWN_ADMIN_HASH: Lazy<Option<String>> = Lazy::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"no-such-administrator", &salt)
        .ok()
        .map(|hash| hash.to_string())
});

fn verify_hash(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub admin: AdminAccount,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Create an administrator account.
    ///
    /// Anonymous callers may only register the very first administrator;
    /// after that an authenticated session is required.
    pub async fn register(&self, auth: &AuthState, data: RegisterAdmin) -> AppResult<AdminAccount> {
        if !auth.is_authenticated() && self.repository.admins_count().await? > 0 {
            return Err(AppError::Unauthorized(
                "Authentication required to register administrators".to_string(),
            ));
        }

        let data = RegisterAdmin {
            username: trimmed(&data.username),
            email: trimmed_opt(data.email),
            ..data
        };
        data.validate()?;

        if self
            .repository
            .admins_get_by_username(&data.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "An administrator with that username already exists".to_string(),
            ));
        }

        let hash = self.hash_password(&data.password)?;
        let admin = self
            .repository
            .admins_create(&data.username, data.email.as_deref(), &hash)
            .await?;

        tracing::info!(admin_id = admin.id, username = %admin.username, "Administrator registered");
        Ok(admin)
    }

    /// Verify credentials and open a session
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginOutcome> {
        let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

        let admin = match self.repository.admins_get_by_username(username.trim()).await? {
            Some(admin) => admin,
            None => {
                if let Some(hash) = UNKNOWN_ADMIN_HASH.as_deref() {
                    let _ = verify_hash(hash, password);
                }
                tracing::warn!("Login attempt for unknown administrator");
                return Err(invalid());
            }
        };

        if !verify_hash(&admin.password_hash, password)? {
            tracing::warn!(username = %admin.username, "Failed login attempt");
            return Err(invalid());
        }

        let expires_at = self.session_expiry()?;

        let purged = self.repository.sessions_purge_expired().await?;
        if purged > 0 {
            tracing::debug!(purged, "Purged expired sessions");
        }

        let session = self.repository.sessions_create(admin.id, expires_at).await?;

        let claims = AdminClaims {
            sub: admin.username.clone(),
            admin_id: admin.id,
            sid: session.id,
            exp: session.expires_at.timestamp(),
            iat: session.created_at.timestamp(),
        };

        let token = claims
            .create_token(&self.config.session_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::info!(admin_id = admin.id, "Administrator logged in");
        Ok(LoginOutcome {
            token,
            admin,
            expires_at: session.expires_at,
        })
    }

    /// Resolve a session token into an authentication state.
    ///
    /// Bad signatures, expired tokens and revoked or expired sessions all
    /// yield `Anonymous`.
    pub async fn resolve(&self, token: &str) -> AppResult<AuthState> {
        let claims = match AdminClaims::from_token(token, &self.config.session_secret) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("Rejected session token: {}", e);
                return Ok(AuthState::Anonymous);
            }
        };

        match self.repository.sessions_get(claims.sid).await? {
            Some(session) if session.admin_id == claims.admin_id && session.expires_at > Utc::now() => {
                Ok(AuthState::Authenticated(claims))
            }
            _ => Ok(AuthState::Anonymous),
        }
    }

    /// Close the caller's session
    pub async fn logout(&self, auth: &AuthState) -> AppResult<()> {
        let claims = auth.require_admin()?;
        self.repository.sessions_delete(claims.sid).await?;
        tracing::info!(admin_id = claims.admin_id, "Administrator logged out");
        Ok(())
    }

    /// Account of the authenticated administrator
    pub async fn me(&self, auth: &AuthState) -> AppResult<AdminAccount> {
        let claims = auth.require_admin()?;
        self.repository.admins_get_by_id(claims.admin_id).await
    }

    fn session_expiry(&self) -> AppResult<DateTime<Utc>> {
        i64::try_from(self.config.session_expiration_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| AppError::Internal("Session lifetime is out of range".to_string()))
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::test_services;

    fn registration(username: &str) -> RegisterAdmin {
        RegisterAdmin {
            username: username.to_string(),
            email: Some("admin@example.org".to_string()),
            password: "s3cret-pass".to_string(),
            password_confirm: "s3cret-pass".to_string(),
        }
    }

    #[tokio::test]
    async fn first_admin_can_register_anonymously_but_not_the_second() {
        let services = test_services().await;
        let auth = &services.auth;

        let admin = auth.register(&AuthState::Anonymous, registration("admin")).await.unwrap();
        assert_eq!(admin.username, "admin");

        let err = auth
            .register(&AuthState::Anonymous, registration("intruder"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn login_resolve_logout_cycle() {
        let services = test_services().await;
        let auth = &services.auth;
        auth.register(&AuthState::Anonymous, registration("admin")).await.unwrap();

        let outcome = auth.login("  ADMIN ", "s3cret-pass").await.unwrap();
        let state = auth.resolve(&outcome.token).await.unwrap();
        assert!(state.is_authenticated());
        assert_eq!(auth.me(&state).await.unwrap().username, "admin");

        auth.logout(&state).await.unwrap();
        assert_eq!(auth.resolve(&outcome.token).await.unwrap(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let services = test_services().await;
        let auth = &services.auth;
        auth.register(&AuthState::Anonymous, registration("admin")).await.unwrap();

        let wrong = auth.login("admin", "nope").await.unwrap_err();
        let unknown = auth.login("ghost", "s3cret-pass").await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn tampered_or_foreign_tokens_are_anonymous() {
        let services = test_services().await;
        let auth = &services.auth;
        auth.register(&AuthState::Anonymous, registration("admin")).await.unwrap();
        let outcome = auth.login("admin", "s3cret-pass").await.unwrap();

        let mut tampered = outcome.token.clone();
        tampered.push('x');
        assert_eq!(auth.resolve(&tampered).await.unwrap(), AuthState::Anonymous);
        assert_eq!(auth.resolve("garbage").await.unwrap(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict_regardless_of_case() {
        let services = test_services().await;
        let auth = &services.auth;
        let first = auth.register(&AuthState::Anonymous, registration("admin")).await.unwrap();
        let state = AuthState::Authenticated(AdminClaims {
            sub: first.username.clone(),
            admin_id: first.id,
            sid: uuid::Uuid::new_v4(),
            exp: Utc::now().timestamp() + 60,
            iat: Utc::now().timestamp(),
        });

        let err = auth.register(&state, registration("Admin")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn expired_session_row_is_anonymous_even_with_a_live_token() {
        let services = test_services().await;
        let auth = &services.auth;
        let admin = auth.register(&AuthState::Anonymous, registration("admin")).await.unwrap();

        let session = services
            .repository
            .sessions_create(admin.id, Utc::now() - Duration::hours(1))
            .await
            .unwrap();
        let claims = AdminClaims {
            sub: admin.username.clone(),
            admin_id: admin.id,
            sid: session.id,
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        };
        let token = claims.create_token(&AuthConfig::default().session_secret).unwrap();

        assert_eq!(auth.resolve(&token).await.unwrap(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn login_purges_expired_sessions() {
        let services = test_services().await;
        let auth = &services.auth;
        let admin = auth.register(&AuthState::Anonymous, registration("admin")).await.unwrap();
        let stale = services
            .repository
            .sessions_create(admin.id, Utc::now() - Duration::minutes(5))
            .await
            .unwrap();
        let live = services
            .repository
            .sessions_create(admin.id, Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        auth.login("admin", "s3cret-pass").await.unwrap();

        assert!(services.repository.sessions_get(stale.id).await.unwrap().is_none());
        assert!(services.repository.sessions_get(live.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn oversized_session_lifetime_is_an_internal_error() {
        let services = test_services().await;
        services
            .auth
            .register(&AuthState::Anonymous, registration("admin"))
            .await
            .unwrap();
        let auth = AuthService::new(
            services.repository.clone(),
            AuthConfig {
                session_expiration_hours: u64::MAX,
                ..AuthConfig::default()
            },
        );

        let err = auth.login("admin", "s3cret-pass").await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn unknown_admin_hash_rejects_any_password() {
        let hash = UNKNOWN_ADMIN_HASH.as_deref().expect("placeholder hash");
        assert!(!verify_hash(hash, "s3cret-pass").unwrap());
        assert!(!verify_hash(hash, "").unwrap());
    }

    #[tokio::test]
    async fn unknown_user_login_is_unauthorized() {
        let services = test_services().await;
        let err = services.auth.login("ghost", "whatever").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn logout_requires_a_session() {
        let services = test_services().await;
        let err = services.auth.logout(&AuthState::Anonymous).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
