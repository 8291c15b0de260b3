//! Port abstraction for group lookup and removal.
use async_trait::async_trait;

use crate::domain::{Group, GroupId, GroupSlug};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Fetch a group by identifier.
    async fn find_by_id(&self, id: GroupId) -> Result<Option<Group>, RepositoryError>;

    /// Fetch a group by slug.
    async fn find_by_slug(&self, slug: &GroupSlug) -> Result<Option<Group>, RepositoryError>;

    /// All groups ordered by title, for form choices.
    async fn list(&self) -> Result<Vec<Group>, RepositoryError>;

    /// Remove a group. Its posts survive with no group.
    ///
    /// Returns `false` when no such group exists.
    async fn delete(&self, id: GroupId) -> Result<bool, RepositoryError>;
}
