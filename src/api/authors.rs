//! Author API endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use super::{admin_input, CurrentAuth};
use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorQuery, AuthorShort, CreateAuthor, UpdateAuthor},
        PaginatedResponse,
    },
    AppState,
};

/// List authors by name, with their book counts
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Page of authors", body = PaginatedResponse<AuthorShort>)
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    query: Result<Query<AuthorQuery>, QueryRejection>,
) -> AppResult<Json<PaginatedResponse<AuthorShort>>> {
    let Query(query) = admin_input(&auth, query)?;
    let query = AuthorQuery {
        q: None,
        ..query
    };
    let authors = state.services.catalog.search_authors(&auth, &query).await?;
    Ok(Json(authors))
}

/// Search authors by name
#[utoipa::path(
    get,
    path = "/authors/search",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("q" = Option<String>, Query, description = "Case-insensitive substring of the name"),
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Matching authors", body = PaginatedResponse<AuthorShort>)
    )
)]
pub async fn search_authors(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    query: Result<Query<AuthorQuery>, QueryRejection>,
) -> AppResult<Json<PaginatedResponse<AuthorShort>>> {
    let Query(query) = admin_input(&auth, query)?;
    let authors = state.services.catalog.search_authors(&auth, &query).await?;
    Ok(Json(authors))
}

/// Get author by ID
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = Author),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Author>> {
    let Path(id) = admin_input(&auth, id)?;
    let author = state.services.catalog.get_author(&auth, id).await?;
    Ok(Json(author))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    data: Result<Json<CreateAuthor>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let Json(data) = admin_input(&auth, data)?;
    let author = state.services.catalog.create_author(&auth, data).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Update an author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Author ID")),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    id: Result<Path<i64>, PathRejection>,
    data: Result<Json<UpdateAuthor>, JsonRejection>,
) -> AppResult<Json<Author>> {
    let Path(id) = admin_input(&auth, id)?;
    let Json(data) = admin_input(&auth, data)?;
    let author = state.services.catalog.update_author(&auth, id, data).await?;
    Ok(Json(author))
}

/// Delete an author (refused while books reference it)
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Author is referenced by books", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = admin_input(&auth, id)?;
    state.services.catalog.delete_author(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
