//! Library member management service

use validator::Validate;

use super::catalog::search_pattern;
use crate::{
    error::{AppError, AppResult},
    models::{
        admin::AuthState,
        member::{CreateMember, Member, MemberQuery, UpdateMember},
        PaginatedResponse, Pagination,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List or search members, newest first
    pub async fn search_members(&self, auth: &AuthState, query: &MemberQuery) -> AppResult<PaginatedResponse<Member>> {
        auth.require_admin()?;
        let pattern = search_pattern(query.q.as_deref());
        let (members, total, pagination) = self
            .repository
            .members_search(
                query.search_filter(),
                pattern.as_deref(),
                Pagination::new(query.page, query.per_page),
            )
            .await?;
        Ok(PaginatedResponse::new(members, total, pagination))
    }

    pub async fn get_member(&self, auth: &AuthState, id: i64) -> AppResult<Member> {
        auth.require_admin()?;
        self.repository.members_get_by_id(id).await
    }

    pub async fn create_member(&self, auth: &AuthState, data: CreateMember) -> AppResult<Member> {
        auth.require_admin()?;
        let data = data.normalized();
        data.validate()?;

        self.ensure_username_free(&data.username, None).await?;

        let member = self.repository.members_create(&data).await?;
        tracing::info!(member_id = member.id, username = %member.username, "Member created");
        Ok(member)
    }

    pub async fn update_member(&self, auth: &AuthState, id: i64, data: UpdateMember) -> AppResult<Member> {
        auth.require_admin()?;
        let data = data.normalized();
        data.validate()?;
        data.validate_contact().map_err(AppError::Validation)?;

        self.repository.members_get_by_id(id).await?;
        if let Some(ref username) = data.username {
            self.ensure_username_free(username, Some(id)).await?;
        }

        let member = self.repository.members_update(id, &data).await?;
        tracing::info!(member_id = id, "Member updated");
        Ok(member)
    }

    pub async fn delete_member(&self, auth: &AuthState, id: i64) -> AppResult<()> {
        auth.require_admin()?;
        self.repository.members_delete(id).await?;
        tracing::info!(member_id = id, "Member deleted");
        Ok(())
    }

    async fn ensure_username_free(&self, username: &str, exclude_id: Option<i64>) -> AppResult<()> {
        if self
            .repository
            .members_username_exists(username, exclude_id)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                username
            )));
        }
        Ok(())
    }
}
