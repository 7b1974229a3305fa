//! Library member model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail};

use super::{trimmed, trimmed_opt, trimmed_patch, PHONE_REGEX, USERNAME_REGEX};

/// Full member model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub id: i64,
    /// Unique, compared case-insensitively
    pub username: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    /// Profile image path or URL
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemberSearchFilter {
    /// Username, email, address or phone number
    #[default]
    All,
    Username,
    Email,
    Address,
    /// Username, email or address; the global search scope for members
    Identity,
}

impl From<Option<&str>> for MemberSearchFilter {
    fn from(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("username") => MemberSearchFilter::Username,
            Some("email") => MemberSearchFilter::Email,
            Some("address") => MemberSearchFilter::Address,
            _ => MemberSearchFilter::All,
        }
    }
}

/// Member listing / search parameters
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct MemberQuery {
    #[serde(default)]
    pub q: Option<String>,
    /// all | username | email | address
    #[serde(default)]
    pub filter: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub page: Option<i64>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub per_page: Option<i64>,
}

impl MemberQuery {
    pub fn search_filter(&self) -> MemberSearchFilter {
        MemberSearchFilter::from(self.filter.as_deref())
    }
}

/// Create member request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    #[validate(
        length(min = 3, max = 150, message = "Username must be 3 to 150 characters"),
        regex(path = *USERNAME_REGEX, message = "Username may only contain letters, digits and @/./+/-/_")
    )]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(max = 500, message = "Address is too long"))]
    pub address: Option<String>,
    #[validate(regex(path = *PHONE_REGEX, message = "Phone number must be 7 to 15 digits, optionally prefixed with +"))]
    pub phone_number: Option<String>,
    #[validate(length(max = 500, message = "Image path is too long"))]
    pub profile_image: Option<String>,
}

impl CreateMember {
    pub fn normalized(self) -> Self {
        Self {
            username: trimmed(&self.username),
            email: trimmed_opt(self.email),
            address: trimmed_opt(self.address),
            phone_number: trimmed_opt(self.phone_number),
            profile_image: trimmed_opt(self.profile_image),
        }
    }
}

/// Update member request; empty strings clear optional fields
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMember {
    #[validate(
        length(min = 3, max = 150, message = "Username must be 3 to 150 characters"),
        regex(path = *USERNAME_REGEX, message = "Username may only contain letters, digits and @/./+/-/_")
    )]
    pub username: Option<String>,
    pub email: Option<String>,
    #[validate(length(max = 500, message = "Address is too long"))]
    pub address: Option<String>,
    pub phone_number: Option<String>,
    #[validate(length(max = 500, message = "Image path is too long"))]
    pub profile_image: Option<String>,
}

impl UpdateMember {
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.map(|u| trimmed(&u)),
            email: trimmed_patch(self.email),
            address: trimmed_patch(self.address),
            phone_number: trimmed_patch(self.phone_number),
            profile_image: trimmed_patch(self.profile_image),
        }
    }

    /// Format checks for the clearable fields, which `Validate` cannot
    /// express because a blank value is a valid clear marker.
    pub fn validate_contact(&self) -> Result<(), String> {
        if let Some(email) = self.email.as_ref().filter(|e| !e.is_empty()) {
            if !email.validate_email() {
                return Err("email: Invalid email format".to_string());
            }
        }
        if let Some(phone) = self.phone_number.as_deref().filter(|p| !p.is_empty()) {
            if !PHONE_REGEX.is_match(phone) {
                return Err(
                    "phone_number: Phone number must be 7 to 15 digits, optionally prefixed with +"
                        .to_string(),
                );
            }
        }
        Ok(())
    }
}
