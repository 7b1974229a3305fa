//! Category API endpoints

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
        category::{Category, CategoryQuery, CategoryShort, CreateCategory, UpdateCategory},
        PaginatedResponse,
    },
    AppState,
};

/// List categories by name, with their book counts
#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Page of categories", body = PaginatedResponse<CategoryShort>)
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> AppResult<Json<PaginatedResponse<CategoryShort>>> {
    let Query(query) = admin_input(&auth, query)?;
    let query = CategoryQuery {
        q: None,
        ..query
    };
    let categories = state.services.catalog.search_categories(&auth, &query).await?;
    Ok(Json(categories))
}

/// Search categories by name
#[utoipa::path(
    get,
    path = "/categories/search",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(
        ("q" = Option<String>, Query, description = "Case-insensitive substring of the name"),
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Matching categories", body = PaginatedResponse<CategoryShort>)
    )
)]
pub async fn search_categories(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> AppResult<Json<PaginatedResponse<CategoryShort>>> {
    let Query(query) = admin_input(&auth, query)?;
    let categories = state.services.catalog.search_categories(&auth, &query).await?;
    Ok(Json(categories))
}

/// Get category by ID
#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category details", body = Category),
        (status = 404, description = "Category not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Category>> {
    let Path(id) = admin_input(&auth, id)?;
    let category = state.services.catalog.get_category(&auth, id).await?;
    Ok(Json(category))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    security(("bearer_auth" = [])),
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Category name already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    data: Result<Json<CreateCategory>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let Json(data) = admin_input(&auth, data)?;
    let category = state.services.catalog.create_category(&auth, data).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Category ID")),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 404, description = "Category not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Category name already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    id: Result<Path<i64>, PathRejection>,
    data: Result<Json<UpdateCategory>, JsonRejection>,
) -> AppResult<Json<Category>> {
    let Path(id) = admin_input(&auth, id)?;
    let Json(data) = admin_input(&auth, data)?;
    let category = state.services.catalog.update_category(&auth, id, data).await?;
    Ok(Json(category))
}

/// Delete a category (refused while books reference it)
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Category is referenced by books", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = admin_input(&auth, id)?;
    state.services.catalog.delete_category(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
