//! API handlers for Bibliotheca REST endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod categories;
pub mod health;
pub mod members;
pub mod openapi;
pub mod search;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    models::admin::AuthState,
    AppState,
};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "bibliotheca_session";

/// Session state of the caller.
///
/// A `Bearer` Authorization header is tried first, then the session
/// cookie. When neither resolves to a live session the caller is
/// `AuthState::Anonymous`; services decide whether that is acceptable.
pub struct CurrentAuth(pub AuthState);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = &state.services.auth;

        if let Some(token) = bearer_token(parts) {
            let resolved = auth.resolve(token).await?;
            if resolved.is_authenticated() {
                return Ok(CurrentAuth(resolved));
            }
        }

        let jar = CookieJar::from_headers(&parts.headers);
        match jar.get(SESSION_COOKIE).map(|cookie| cookie.value().trim()) {
            Some(token) if !token.is_empty() => Ok(CurrentAuth(auth.resolve(token).await?)),
            _ => Ok(CurrentAuth(AuthState::Anonymous)),
        }
    }
}

/// Unwrap extracted request input for an admin-only handler.
///
/// The session is checked before the input, so anonymous callers get 401
/// whatever they sent. Extractor rejections become validation errors.
pub(crate) fn admin_input<T, R>(auth: &AuthState, input: Result<T, R>) -> AppResult<T>
where
    AppError: From<R>,
{
    auth.require_admin()?;
    Ok(input?)
}

/// Build the full application router: `/api/v1` routes plus API docs
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::me))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/search", get(books::search_books))
        .route(
            "/books/:id",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route("/authors/search", get(authors::search_authors))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        // Categories
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/categories/search", get(categories::search_categories))
        .route(
            "/categories/:id",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        // Members
        .route("/members", get(members::list_members).post(members::create_member))
        .route("/members/search", get(members::search_members))
        .route(
            "/members/:id",
            get(members::get_member)
                .put(members::update_member)
                .delete(members::delete_member),
        )
        // Global search and dashboard
        .route("/search", get(search::global_search))
        .route("/dashboard", get(search::dashboard))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
