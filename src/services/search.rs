//! Global search across books, members, authors and categories

use super::catalog::search_pattern;
use crate::{
    error::AppResult,
    models::{
        admin::AuthState,
        book::BookSearchFilter,
        member::MemberSearchFilter,
        search::{SearchQuery, SearchResults, SearchScope, SEARCH_SECTION_LIMIT},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct SearchService {
    repository: Repository,
}

impl SearchService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Run one query over every section in scope, `SEARCH_SECTION_LIMIT`
    /// results each. A blank query searches nothing and leaves every
    /// section null.
    pub async fn search(&self, auth: &AuthState, query: &SearchQuery) -> AppResult<SearchResults> {
        auth.require_admin()?;

        let term = query.q.as_deref().map(str::trim).unwrap_or_default().to_string();
        let scope = SearchScope::from(query.search_type.as_deref());
        let mut results = SearchResults {
            query: term.clone(),
            search_type: scope,
            ..Default::default()
        };

        let Some(pattern) = search_pattern(Some(&term)) else {
            return Ok(results);
        };

        if scope.includes(SearchScope::Books) {
            results.books = Some(
                self.repository
                    .books_find(BookSearchFilter::All, Some(&pattern), SEARCH_SECTION_LIMIT, 0)
                    .await?,
            );
        }
        if scope.includes(SearchScope::Members) {
            results.members = Some(
                self.repository
                    .members_find(MemberSearchFilter::Identity, Some(&pattern), SEARCH_SECTION_LIMIT, 0)
                    .await?,
            );
        }
        if scope.includes(SearchScope::Authors) {
            results.authors = Some(
                self.repository
                    .authors_find(Some(&pattern), SEARCH_SECTION_LIMIT, 0)
                    .await?,
            );
        }
        if scope.includes(SearchScope::Categories) {
            results.categories = Some(
                self.repository
                    .categories_find(Some(&pattern), SEARCH_SECTION_LIMIT, 0)
                    .await?,
            );
        }

        tracing::debug!(query = %term, scope = ?scope, "Global search");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::{author::CreateAuthor, category::CreateCategory, member::CreateMember},
        services::test_support::{admin, test_services},
    };

    fn query(q: &str, search_type: Option<&str>) -> SearchQuery {
        SearchQuery {
            q: Some(q.to_string()),
            search_type: search_type.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn sections_follow_the_requested_scope() {
        let services = test_services().await;
        let auth = admin();
        services
            .catalog
            .create_author(
                &auth,
                CreateAuthor {
                    name: "Terry Pratchett".to_string(),
                    biography: None,
                },
            )
            .await
            .unwrap();
        services
            .catalog
            .create_category(
                &auth,
                CreateCategory {
                    name: "Satire".to_string(),
                    description: Some("Pratchett and friends".to_string()),
                },
            )
            .await
            .unwrap();
        services
            .members
            .create_member(
                &auth,
                CreateMember {
                    username: "pratchett_fan".to_string(),
                    email: None,
                    address: None,
                    phone_number: None,
                    profile_image: None,
                },
            )
            .await
            .unwrap();

        let all = services
            .search
            .search(&auth, &query("pratchett", None))
            .await
            .unwrap();
        assert_eq!(all.search_type, SearchScope::All);
        assert_eq!(all.authors.as_ref().map(Vec::len), Some(1));
        assert_eq!(all.members.as_ref().map(Vec::len), Some(1));
        assert_eq!(all.books.as_ref().map(Vec::len), Some(0));
        // Categories match by name only
        assert_eq!(all.categories.as_ref().map(Vec::len), Some(0));

        let users = services
            .search
            .search(&auth, &query("PRATCHETT", Some("users")))
            .await
            .unwrap();
        assert_eq!(users.search_type, SearchScope::Members);
        assert_eq!(users.members.map(|m| m.len()), Some(1));
        assert!(users.books.is_none());
        assert!(users.authors.is_none());
        assert!(users.categories.is_none());
    }

    #[tokio::test]
    async fn blank_query_leaves_every_section_null() {
        let services = test_services().await;
        let results = services
            .search
            .search(&admin(), &query("   ", Some("authors")))
            .await
            .unwrap();
        assert_eq!(results.query, "");
        assert_eq!(results.search_type, SearchScope::Authors);
        assert!(results.authors.is_none());
        assert!(results.books.is_none());
    }

    #[tokio::test]
    async fn member_section_ignores_phone_numbers() {
        let services = test_services().await;
        let auth = admin();
        services
            .members
            .create_member(
                &auth,
                CreateMember {
                    username: "Örjan".to_string(),
                    email: None,
                    address: Some("Storgatan 5".to_string()),
                    phone_number: Some("+46555123456".to_string()),
                    profile_image: None,
                },
            )
            .await
            .unwrap();

        let by_phone = services
            .search
            .search(&auth, &query("555123", Some("members")))
            .await
            .unwrap();
        assert_eq!(by_phone.members.map(|m| m.len()), Some(0));

        let by_name = services
            .search
            .search(&auth, &query("örjan", Some("members")))
            .await
            .unwrap();
        assert_eq!(by_name.members.map(|m| m.len()), Some(1));

        // Listing search still covers the phone number
        let listing = services
            .members
            .search_members(
                &auth,
                &crate::models::member::MemberQuery {
                    q: Some("555123".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(listing.total, 1);
    }

    #[tokio::test]
    async fn search_requires_a_session() {
        let services = test_services().await;
        let err = services
            .search
            .search(&AuthState::Anonymous, &query("x", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
