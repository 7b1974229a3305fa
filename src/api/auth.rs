//! Authentication endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CurrentAuth, SESSION_COOKIE};
use crate::{
    error::AppResult,
    models::admin::{AdminAccount, RegisterAdmin},
    AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub admin: AdminAccount,
}

/// Log in as an administrator
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let Json(request) = request?;
    let outcome = state
        .services
        .auth
        .login(&request.username, &request.password)
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, outcome.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.auth.cookie_secure);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token: outcome.token,
            token_type: "Bearer".to_string(),
            expires_at: outcome.expires_at,
            admin: outcome.admin,
        }),
    ))
}

/// Close the current session and clear the cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "No active session", body = crate::error::ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    jar: CookieJar,
) -> AppResult<(CookieJar, StatusCode)> {
    state.services.auth.logout(&auth).await?;
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, StatusCode::NO_CONTENT))
}

/// Register an administrator account.
///
/// Open to anonymous callers only while no administrator exists.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterAdmin,
    responses(
        (status = 201, description = "Administrator created", body = AdminAccount),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 409, description = "Username taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    data: Result<Json<RegisterAdmin>, JsonRejection>,
) -> AppResult<(StatusCode, Json<AdminAccount>)> {
    let Json(data) = data?;
    let admin = state.services.auth.register(&auth, data).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

/// Current administrator
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current administrator", body = AdminAccount),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(State(state): State<AppState>, CurrentAuth(auth): CurrentAuth) -> AppResult<Json<AdminAccount>> {
    let admin = state.services.auth.me(&auth).await?;
    Ok(Json(admin))
}
