//! Comments attached to posts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PostId, User};

/// Maximum comment length in characters.
pub const COMMENT_TEXT_MAX: usize = 255;

/// Validation errors for comment text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentValidationError {
    /// Text is blank.
    #[error("comment text must not be empty")]
    EmptyText,
    /// Text exceeds [`COMMENT_TEXT_MAX`] characters.
    #[error("comment text must be at most {max} characters (got {length})")]
    TooLong { max: usize, length: usize },
}

/// Database identifier of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(i64);

impl CommentId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Non-blank comment body of at most [`COMMENT_TEXT_MAX`] characters,
/// measured and stored after trimming surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommentText(String);

impl CommentText {
    /// Trim, validate and construct comment text.
    pub fn new(text: impl Into<String>) -> Result<Self, CommentValidationError> {
        let raw: String = text.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CommentValidationError::EmptyText);
        }
        let length = trimmed.chars().count();
        if length > COMMENT_TEXT_MAX {
            return Err(CommentValidationError::TooLong {
                max: COMMENT_TEXT_MAX,
                length,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A stored comment with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[schema(value_type = i64, example = 3)]
    id: CommentId,
    #[schema(value_type = i64, example = 1)]
    post: PostId,
    #[schema(value_type = String, example = "Nice post")]
    text: CommentText,
    author: User,
    created: DateTime<Utc>,
}

impl Comment {
    /// Assemble a comment from its stored parts.
    pub fn new(
        id: CommentId,
        post: PostId,
        text: CommentText,
        author: User,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            post,
            text,
            author,
            created,
        }
    }

    /// Identifier.
    pub fn id(&self) -> CommentId {
        self.id
    }

    /// Post the comment belongs to.
    pub fn post(&self) -> PostId {
        self.post
    }

    /// Body text.
    pub fn text(&self) -> &CommentText {
        &self.text
    }

    /// Author.
    pub fn author(&self) -> &User {
        &self.author
    }

    /// Creation timestamp.
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }
}
