//! Topic communities that posts may belong to.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum length of a group title.
pub const GROUP_TITLE_MAX: usize = 200;

/// Validation errors for group fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupValidationError {
    /// Slug is empty.
    #[error("group slug must not be empty")]
    EmptySlug,
    /// Slug contains characters other than letters, digits, `-` and `_`.
    #[error("group slug may only contain letters, digits, hyphens and underscores")]
    InvalidSlug,
    /// Title is blank.
    #[error("group title must not be empty")]
    EmptyTitle,
    /// Title exceeds [`GROUP_TITLE_MAX`] characters.
    #[error("group title must be at most {max} characters")]
    TitleTooLong { max: usize },
}

/// Database identifier of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(i64);

impl GroupId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// URL-safe unique group handle, as used in `/group/{slug}/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupSlug(String);

impl GroupSlug {
    /// Validate and construct a slug.
    pub fn new(slug: impl Into<String>) -> Result<Self, GroupValidationError> {
        let slug = slug.into();
        if slug.is_empty() {
            return Err(GroupValidationError::EmptySlug);
        }
        let allowed = slug
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !allowed {
            return Err(GroupValidationError::InvalidSlug);
        }
        Ok(Self(slug))
    }

    /// Borrow the slug.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for GroupSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<GroupSlug> for String {
    fn from(value: GroupSlug) -> Self {
        value.0
    }
}

impl TryFrom<String> for GroupSlug {
    type Error = GroupValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A group as stored.
///
/// Displayed by its title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[schema(value_type = i64, example = 1)]
    id: GroupId,
    title: String,
    #[schema(value_type = String, example = "cats")]
    slug: GroupSlug,
    description: String,
}

impl Group {
    /// Build a group, validating its title.
    pub fn new(
        id: GroupId,
        title: impl Into<String>,
        slug: GroupSlug,
        description: impl Into<String>,
    ) -> Result<Self, GroupValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(GroupValidationError::EmptyTitle);
        }
        if title.chars().count() > GROUP_TITLE_MAX {
            return Err(GroupValidationError::TitleTooLong {
                max: GROUP_TITLE_MAX,
            });
        }
        Ok(Self {
            id,
            title,
            slug,
            description: description.into(),
        })
    }

    /// Identifier.
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Human-readable title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Unique slug.
    pub fn slug(&self) -> &GroupSlug {
        &self.slug
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
