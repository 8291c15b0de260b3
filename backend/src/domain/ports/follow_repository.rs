//! Port abstraction for follow edges.
//!
//! Adapters enforce edge uniqueness at write time; callers never lock.
use async_trait::async_trait;

use crate::domain::{FollowEdge, UserId};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Store `edge` unless it already exists. Returns whether a row was added.
    async fn insert(&self, edge: &FollowEdge) -> Result<bool, RepositoryError>;

    /// Remove `edge`. Returns whether a row was removed.
    async fn delete(&self, edge: &FollowEdge) -> Result<bool, RepositoryError>;

    /// Whether `edge` exists.
    async fn exists(&self, edge: &FollowEdge) -> Result<bool, RepositoryError>;

    /// Number of authors `user` follows.
    async fn count_for_user(&self, user: &UserId) -> Result<usize, RepositoryError>;
}
