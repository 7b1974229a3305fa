//! Dashboard summary: totals and most recent records

use crate::{
    error::AppResult,
    models::{
        admin::AuthState,
        book::BookSearchFilter,
        member::MemberSearchFilter,
        search::{Dashboard, DASHBOARD_RECENT_LIMIT},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
}

impl DashboardService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn summary(&self, auth: &AuthState) -> AppResult<Dashboard> {
        auth.require_admin()?;

        Ok(Dashboard {
            total_members: self.repository.members_count().await?,
            total_books: self.repository.books_count().await?,
            total_authors: self.repository.authors_count().await?,
            total_categories: self.repository.categories_count().await?,
            recent_books: self
                .repository
                .books_find(BookSearchFilter::All, None, DASHBOARD_RECENT_LIMIT, 0)
                .await?,
            recent_members: self
                .repository
                .members_find(MemberSearchFilter::All, None, DASHBOARD_RECENT_LIMIT, 0)
                .await?,
        })
    }
}
