//! Posts and their field types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Group, User};

/// Number of characters of the text used as a post's short label.
pub const POST_LABEL_LEN: usize = 15;

/// Directory (relative to the media root) that post images are stored in.
pub const POST_IMAGE_DIR: &str = "posts";

/// Validation errors for post fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    /// Text is blank.
    #[error("post text must not be empty")]
    EmptyText,
    /// Image reference is not a file under the post image directory.
    #[error("image reference must name a file under {POST_IMAGE_DIR}/")]
    InvalidImageRef,
}

/// Database identifier of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(i64);

impl PostId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Non-blank post body, stored without surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PostText(String);

impl PostText {
    /// Trim, validate and construct post text.
    pub fn new(text: impl Into<String>) -> Result<Self, PostValidationError> {
        let raw: String = text.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PostValidationError::EmptyText);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Location of a stored image relative to the media root, e.g. `posts/cat.gif`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Validate a stored image location.
    pub fn new(path: impl Into<String>) -> Result<Self, PostValidationError> {
        let path = path.into();
        let valid = path
            .strip_prefix(POST_IMAGE_DIR)
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|name| !name.is_empty() && !name.contains(['/', '\\']) && name != "..");
        if !valid {
            return Err(PostValidationError::InvalidImageRef);
        }
        Ok(Self(path))
    }

    /// Reference for `file_name` inside the post image directory.
    pub fn in_post_dir(file_name: &str) -> Result<Self, PostValidationError> {
        Self::new(format!("{POST_IMAGE_DIR}/{file_name}"))
    }

    /// Borrow the relative path.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored post together with its author and group.
///
/// ## Invariants
/// - `pub_date` is set once when the post is created and never changes.
/// - `author` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[schema(value_type = i64, example = 1)]
    id: PostId,
    #[schema(value_type = String, example = "Hello there")]
    text: PostText,
    pub_date: DateTime<Utc>,
    author: User,
    group: Option<Group>,
    #[schema(value_type = Option<String>, example = "posts/cat.gif")]
    image: Option<ImageRef>,
}

impl Post {
    /// Assemble a post from its stored parts.
    pub fn new(
        id: PostId,
        text: PostText,
        pub_date: DateTime<Utc>,
        author: User,
        group: Option<Group>,
        image: Option<ImageRef>,
    ) -> Self {
        Self {
            id,
            text,
            pub_date,
            author,
            group,
            image,
        }
    }

    /// Identifier.
    pub fn id(&self) -> PostId {
        self.id
    }

    /// Body text.
    pub fn text(&self) -> &PostText {
        &self.text
    }

    /// Creation timestamp.
    pub fn pub_date(&self) -> DateTime<Utc> {
        self.pub_date
    }

    /// Author.
    pub fn author(&self) -> &User {
        &self.author
    }

    /// Group, when the post belongs to one.
    pub fn group(&self) -> Option<&Group> {
        self.group.as_ref()
    }

    /// Stored image, if any.
    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    /// Short label: the first [`POST_LABEL_LEN`] characters of the text.
    pub fn label(&self) -> &str {
        let text = self.text.as_str();
        text.char_indices()
            .nth(POST_LABEL_LEN)
            .map_or(text, |(end, _)| text.get(..end).unwrap_or(text))
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
