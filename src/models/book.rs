//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{trimmed, trimmed_opt, trimmed_patch, ISBN_REGEX};

/// Full book model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub category_id: i64,
    pub description: Option<String>,
    /// Number of copies held (at least 1)
    pub copies: i32,
    pub publication_year: Option<i32>,
    /// ISBN-10 or ISBN-13, unique when present
    pub isbn: Option<String>,
    /// Cover image path or URL
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book row for listings, joined with author and category names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub author_name: String,
    pub category_id: i64,
    pub category_name: String,
    pub copies: i32,
    pub publication_year: Option<i32>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Which field a book search matches against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookSearchFilter {
    /// Title, description, author name or category name
    #[default]
    All,
    Title,
    Author,
    Category,
}

impl From<Option<&str>> for BookSearchFilter {
    /// Unknown filters fall back to `All`.
    fn from(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("title") => BookSearchFilter::Title,
            Some("author") => BookSearchFilter::Author,
            Some("category") => BookSearchFilter::Category,
            _ => BookSearchFilter::All,
        }
    }
}

/// Book listing / search parameters
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct BookQuery {
    #[serde(default)]
    pub q: Option<String>,
    /// all | title | author | category
    #[serde(default)]
    pub filter: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub page: Option<i64>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub per_page: Option<i64>,
}

impl BookQuery {
    pub fn search_filter(&self) -> BookSearchFilter {
        BookSearchFilter::from(self.filter.as_deref())
    }
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "Title is required (at most 255 characters)"))]
    pub title: String,
    pub author_id: i64,
    pub category_id: i64,
    #[validate(length(max = 10000, message = "Description is too long"))]
    pub description: Option<String>,
    /// Defaults to 1
    #[validate(range(min = 1, message = "Copies must be at least 1"))]
    pub copies: Option<i32>,
    #[validate(range(min = 0, max = 9999, message = "Publication year must be between 0 and 9999"))]
    pub publication_year: Option<i32>,
    #[validate(regex(path = *ISBN_REGEX, message = "Invalid ISBN"))]
    pub isbn: Option<String>,
    #[validate(length(max = 500, message = "Image path is too long"))]
    pub image: Option<String>,
}

impl CreateBook {
    pub fn normalized(self) -> Self {
        Self {
            title: trimmed(&self.title),
            description: trimmed_opt(self.description),
            isbn: trimmed_opt(self.isbn),
            image: trimmed_opt(self.image),
            ..self
        }
    }
}

/// Update book request
///
/// Absent fields are left untouched. For optional text fields an empty
/// string clears the stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "Title is required (at most 255 characters)"))]
    pub title: Option<String>,
    pub author_id: Option<i64>,
    pub category_id: Option<i64>,
    #[validate(length(max = 10000, message = "Description is too long"))]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Copies must be at least 1"))]
    pub copies: Option<i32>,
    #[validate(range(min = 0, max = 9999, message = "Publication year must be between 0 and 9999"))]
    pub publication_year: Option<i32>,
    pub isbn: Option<String>,
    #[validate(length(max = 500, message = "Image path is too long"))]
    pub image: Option<String>,
}

impl UpdateBook {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.map(|t| trimmed(&t)),
            description: trimmed_patch(self.description),
            isbn: trimmed_patch(self.isbn),
            image: trimmed_patch(self.image),
            ..self
        }
    }

    /// ISBN format check; the blank clear marker is accepted.
    pub fn validate_isbn(&self) -> bool {
        match self.isbn.as_deref() {
            None | Some("") => true,
            Some(isbn) => ISBN_REGEX.is_match(isbn),
        }
    }
}
