//! Global search and dashboard views

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AuthorShort, BookShort, CategoryShort, Member};

/// Maximum records returned per section of a global search
pub const SEARCH_SECTION_LIMIT: i64 = 10;
/// Number of recent books / members shown on the dashboard
pub const DASHBOARD_RECENT_LIMIT: i64 = 5;

/// Sections a global search covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    #[default]
    All,
    Books,
    Members,
    Authors,
    Categories,
}

impl From<Option<&str>> for SearchScope {
    fn from(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("books") => SearchScope::Books,
            // "users" is accepted for members
            Some("members") | Some("users") => SearchScope::Members,
            Some("authors") => SearchScope::Authors,
            Some("categories") => SearchScope::Categories,
            _ => SearchScope::All,
        }
    }
}

impl SearchScope {
    pub fn includes(self, section: SearchScope) -> bool {
        self == SearchScope::All || self == section
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    /// all | books | members | authors | categories
    #[serde(default, rename = "type")]
    pub search_type: Option<String>,
}

/// Global search results; sections outside the requested scope are null
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct SearchResults {
    pub query: String,
    pub search_type: SearchScope,
    pub books: Option<Vec<BookShort>>,
    pub members: Option<Vec<Member>>,
    pub authors: Option<Vec<AuthorShort>>,
    pub categories: Option<Vec<CategoryShort>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub total_members: i64,
    pub total_books: i64,
    pub total_authors: i64,
    pub total_categories: i64,
    pub recent_books: Vec<BookShort>,
    pub recent_members: Vec<Member>,
}
