//! Data models for Bibliotheca

pub mod admin;
pub mod author;
pub mod book;
pub mod category;
pub mod member;
pub mod search;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

// Re-export commonly used types
pub use admin::{AdminAccount, AdminClaims, RegisterAdmin};
pub use author::{Author, AuthorQuery, AuthorShort, CreateAuthor, UpdateAuthor};
pub use book::{Book, BookQuery, BookSearchFilter, BookShort, CreateBook, UpdateBook};
pub use category::{Category, CategoryQuery, CategoryShort, CreateCategory, UpdateCategory};
pub use member::{CreateMember, Member, MemberQuery, MemberSearchFilter, UpdateMember};
pub use search::{Dashboard, SearchQuery, SearchResults, SearchScope};

/// Default number of records per listing page
pub const DEFAULT_PER_PAGE: i64 = 10;
/// Upper bound accepted for `per_page`
pub const MAX_PER_PAGE: i64 = 100;

pub(crate) static ISBN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9][0-9\- ]{8,15}[0-9Xx]$").expect("valid ISBN regex"));

pub(crate) static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("valid phone regex"));

pub(crate) static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

/// Resolved page window for a listing query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Pull the page back inside `1..=last_page` for `total` records.
    pub fn clamp_to(self, total: i64) -> Self {
        let last_page = ((total + self.per_page - 1) / self.per_page).max(1);
        Self {
            page: self.page.min(last_page),
            per_page: self.per_page,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Records on this page
    pub items: Vec<T>,
    /// Total number of matching records
    pub total: i64,
    /// Current page number (clamped to the available range)
    pub page: i64,
    /// Records per page
    pub per_page: i64,
}

impl<T> PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            per_page: pagination.per_page,
        }
    }
}

/// Trim a required text field.
pub(crate) fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

/// Trim an optional text field, dropping it when blank.
pub(crate) fn trimmed_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim an optional field of an update request.
///
/// Absent stays absent; a blank value is kept as `Some("")`, which the
/// repository stores as NULL.
pub(crate) fn trimmed_patch(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Case folding shared by stored `*_folded` columns and search terms.
///
/// SQLite's `LOWER` and `LIKE` only fold ASCII, so both sides of a
/// case-insensitive comparison are folded here instead.
pub(crate) fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Escape LIKE wildcards and wrap the folded term for a substring match
/// (used with `ESCAPE '\'` against `*_folded` columns).
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in fold_case(term).chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_bounds() {
        let p = Pagination::new(None, None);
        assert_eq!(p, Pagination { page: 1, per_page: 10 });

        let p = Pagination::new(Some(-3), Some(1000));
        assert_eq!(p, Pagination { page: 1, per_page: MAX_PER_PAGE });
    }

    #[test]
    fn pagination_clamps_past_last_page() {
        let p = Pagination::new(Some(9), Some(10)).clamp_to(25);
        assert_eq!(p.page, 3);
        assert_eq!(p.offset(), 20);

        let empty = Pagination::new(Some(4), None).clamp_to(0);
        assert_eq!(empty.page, 1);
        assert_eq!(empty.offset(), 0);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Dune"), "%dune%");
        assert_eq!(like_pattern("100%_pure"), r"%100\%\_pure%");
    }

    #[test]
    fn folding_covers_non_ascii_letters() {
        assert_eq!(fold_case("Élise et Ödön"), "élise et ödön");
        assert_eq!(like_pattern("ÉMILE"), "%émile%");
    }

    #[test]
    fn patterns_accept_expected_shapes() {
        assert!(ISBN_REGEX.is_match("978-0-441-17271-9"));
        assert!(ISBN_REGEX.is_match("044117271X"));
        assert!(!ISBN_REGEX.is_match("not-an-isbn"));
        assert!(PHONE_REGEX.is_match("+1234567890"));
        assert!(!PHONE_REGEX.is_match("12-34"));
        assert!(USERNAME_REGEX.is_match("jane.doe@lib"));
        assert!(!USERNAME_REGEX.is_match("jane doe"));
    }
}
