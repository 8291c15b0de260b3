//! Port abstraction for post persistence.
//!
//! Listing is always newest first; posts sharing a timestamp come back in
//! insertion order.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{GroupId, ImageRef, Post, PostId, PostText, UserId};

use super::RepositoryError;

/// Which posts a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    /// Every post.
    All,
    /// Posts in one group.
    Group(GroupId),
    /// Posts by one author.
    Author(UserId),
    /// Posts by any author the given user follows.
    FollowedBy(UserId),
}

/// Fields of a post about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub text: PostText,
    pub pub_date: DateTime<Utc>,
    pub author: UserId,
    pub group: Option<GroupId>,
    pub image: Option<ImageRef>,
}

/// Replacement values for an edited post.
///
/// `group` is written as given, so `None` clears it. `image` of `None` keeps
/// the stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    pub text: PostText,
    pub group: Option<GroupId>,
    pub image: Option<ImageRef>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Number of posts matching `filter`.
    async fn count(&self, filter: &PostFilter) -> Result<usize, RepositoryError>;

    /// One slice of the posts matching `filter`, newest first.
    async fn list(
        &self,
        filter: &PostFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Post>, RepositoryError>;

    /// Fetch a post by identifier.
    async fn find(&self, id: PostId) -> Result<Option<Post>, RepositoryError>;

    /// Store a new post and return it as stored.
    async fn insert(&self, post: &NewPost) -> Result<Post, RepositoryError>;

    /// Apply `changes` to a post, returning the updated post or `None` when
    /// it does not exist.
    async fn update(
        &self,
        id: PostId,
        changes: &PostChanges,
    ) -> Result<Option<Post>, RepositoryError>;

    /// Remove a post and its comments.
    ///
    /// Returns `false` when no such post exists.
    async fn delete(&self, id: PostId) -> Result<bool, RepositoryError>;
}
