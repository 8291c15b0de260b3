//! Port abstraction for comment persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Comment, CommentText, PostId, UserId};

use super::RepositoryError;

/// Fields of a comment about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub post: PostId,
    pub author: UserId,
    pub text: CommentText,
    pub created: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Comments on `post`, oldest first.
    async fn list_for_post(&self, post: PostId) -> Result<Vec<Comment>, RepositoryError>;

    /// Store a new comment and return it as stored.
    async fn insert(&self, comment: &NewComment) -> Result<Comment, RepositoryError>;
}
