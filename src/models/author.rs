//! Author model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{trimmed, trimmed_opt, trimmed_patch};

/// Full author model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub biography: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Author row for listings, with the number of books referencing it
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuthorShort {
    pub id: i64,
    pub name: String,
    pub book_count: i64,
}

/// Author listing / search parameters
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct AuthorQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub page: Option<i64>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub per_page: Option<i64>,
}

/// Create author request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 255, message = "Name is required (at most 255 characters)"))]
    pub name: String,
    #[validate(length(max = 10000, message = "Biography is too long"))]
    pub biography: Option<String>,
}

impl CreateAuthor {
    pub fn normalized(self) -> Self {
        Self {
            name: trimmed(&self.name),
            biography: trimmed_opt(self.biography),
        }
    }
}

/// Update author request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 255, message = "Name is required (at most 255 characters)"))]
    pub name: Option<String>,
    /// Empty string clears the biography
    #[validate(length(max = 10000, message = "Biography is too long"))]
    pub biography: Option<String>,
}

impl UpdateAuthor {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|n| trimmed(&n)),
            biography: trimmed_patch(self.biography),
        }
    }
}
