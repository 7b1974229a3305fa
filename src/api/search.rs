//! Global search and dashboard endpoints

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use super::{admin_input, CurrentAuth};
use crate::{
    error::AppResult,
    models::search::{Dashboard, SearchQuery, SearchResults},
    AppState,
};

/// Search books, members, authors and categories at once
#[utoipa::path(
    get,
    path = "/search",
    tag = "search",
    security(("bearer_auth" = [])),
    params(
        ("q" = Option<String>, Query, description = "Case-insensitive substring"),
        ("type" = Option<String>, Query, description = "all | books | members | authors | categories")
    ),
    responses(
        (status = 200, description = "Results per section (at most 10 each)", body = SearchResults),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn global_search(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<SearchResults>> {
    let Query(query) = admin_input(&auth, query)?;
    let results = state.services.search.search(&auth, &query).await?;
    Ok(Json(results))
}

/// Totals and most recent books and members
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "search",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard summary", body = Dashboard),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn dashboard(State(state): State<AppState>, CurrentAuth(auth): CurrentAuth) -> AppResult<Json<Dashboard>> {
    let dashboard = state.services.dashboard.summary(&auth).await?;
    Ok(Json(dashboard))
}
