//! Port abstraction for user lookup and removal.
use async_trait::async_trait;

use crate::domain::{User, UserId, Username};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// Fetch a user by username.
    async fn find_by_username(&self, username: &Username)
    -> Result<Option<User>, RepositoryError>;

    /// Remove a user together with their posts, comments and follow edges.
    ///
    /// Returns `false` when no such user exists.
    async fn delete(&self, id: &UserId) -> Result<bool, RepositoryError>;
}
