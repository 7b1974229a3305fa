//! Member API endpoints

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
        member::{CreateMember, Member, MemberQuery, UpdateMember},
        PaginatedResponse,
    },
    AppState,
};

/// List members, newest first
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Page of members", body = PaginatedResponse<Member>)
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    query: Result<Query<MemberQuery>, QueryRejection>,
) -> AppResult<Json<PaginatedResponse<Member>>> {
    let Query(query) = admin_input(&auth, query)?;
    let query = MemberQuery {
        page: query.page,
        per_page: query.per_page,
        ..Default::default()
    };
    let members = state.services.members.search_members(&auth, &query).await?;
    Ok(Json(members))
}

/// Search members
#[utoipa::path(
    get,
    path = "/members/search",
    tag = "members",
    security(("bearer_auth" = [])),
    params(
        ("q" = Option<String>, Query, description = "Case-insensitive substring"),
        ("filter" = Option<String>, Query, description = "all | username | email | address"),
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Matching members", body = PaginatedResponse<Member>)
    )
)]
pub async fn search_members(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    query: Result<Query<MemberQuery>, QueryRejection>,
) -> AppResult<Json<PaginatedResponse<Member>>> {
    let Query(query) = admin_input(&auth, query)?;
    let members = state.services.members.search_members(&auth, &query).await?;
    Ok(Json(members))
}

/// Get member by ID
#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member details", body = Member),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_member(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Member>> {
    let Path(id) = admin_input(&auth, id)?;
    let member = state.services.members.get_member(&auth, id).await?;
    Ok(Json(member))
}

/// Create a member
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    security(("bearer_auth" = [])),
    request_body = CreateMember,
    responses(
        (status = 201, description = "Member created", body = Member),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Username already taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_member(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    data: Result<Json<CreateMember>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Member>)> {
    let Json(data) = admin_input(&auth, data)?;
    let member = state.services.members.create_member(&auth, data).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Update a member
#[utoipa::path(
    put,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Member ID")),
    request_body = UpdateMember,
    responses(
        (status = 200, description = "Member updated", body = Member),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Username already taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_member(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    id: Result<Path<i64>, PathRejection>,
    data: Result<Json<UpdateMember>, JsonRejection>,
) -> AppResult<Json<Member>> {
    let Path(id) = admin_input(&auth, id)?;
    let Json(data) = admin_input(&auth, data)?;
    let member = state.services.members.update_member(&auth, id, data).await?;
    Ok(Json(member))
}

/// Delete a member
#[utoipa::path(
    delete,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Member ID")),
    responses(
        (status = 204, description = "Member deleted"),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_member(
    State(state): State<AppState>,
    CurrentAuth(auth): CurrentAuth,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = admin_input(&auth, id)?;
    state.services.members.delete_member(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
