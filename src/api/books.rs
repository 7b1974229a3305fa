//! Book API endpoints

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
        book::{Book, BookQuery, BookShort, CreateBook, UpdateBook},
        PaginatedResponse,
    },
    AppState,
};

/// List books, newest first
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Page of books", body = PaginatedResponse<BookShort>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    query: Result<Query<BookQuery>, QueryRejection>,
) -> AppResult<Json<PaginatedResponse<BookShort>>> {
    let Query(query) = admin_input(&auth, query)?;
    let query = BookQuery {
        page: query.page,
        per_page: query.per_page,
        ..Default::default()
    };
    let books = state.services.catalog.search_books(&auth, &query).await?;
    Ok(Json(books))
}

/// Search books
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("q" = Option<String>, Query, description = "Case-insensitive substring"),
        ("filter" = Option<String>, Query, description = "all | title | author | category"),
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Matching books", body = PaginatedResponse<BookShort>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_books(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    query: Result<Query<BookQuery>, QueryRejection>,
) -> AppResult<Json<PaginatedResponse<BookShort>>> {
    let Query(query) = admin_input(&auth, query)?;
    let books = state.services.catalog.search_books(&auth, &query).await?;
    Ok(Json(books))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Book>> {
    let Path(id) = admin_input(&auth, id)?;
    let book = state.services.catalog.get_book(&auth, id).await?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input or unknown author/category", body = crate::error::ErrorResponse),
        (status = 409, description = "Duplicate ISBN", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    data: Result<Json<CreateBook>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let Json(data) = admin_input(&auth, data)?;
    let book = state.services.catalog.create_book(&auth, data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    id: Result<Path<i64>, PathRejection>,
    data: Result<Json<UpdateBook>, JsonRejection>,
) -> AppResult<Json<Book>> {
    let Path(id) = admin_input(&auth, id)?;
    let Json(data) = admin_input(&auth, data)?;
    let book = state.services.catalog.update_book(&auth, id, data).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = admin_input(&auth, id)?;
    state.services.catalog.delete_book(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
