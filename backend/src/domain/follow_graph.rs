//! Follow relationships between users.
//!
//! Following yourself and following someone twice are both silent no-ops.
//! Uniqueness is the store's job; this service never locks.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use super::ports::{FollowRepository, UserRepository};
use super::{Error, FollowEdge, User, UserId, Username};

/// Effect of a follow or unfollow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowChange {
    /// The edge set changed.
    Applied,
    /// Nothing to do: self-follow, duplicate follow or missing edge.
    Unchanged,
}

/// Follow graph use-cases.
#[derive(Clone)]
pub struct FollowGraph {
    follows: Arc<dyn FollowRepository>,
    users: Arc<dyn UserRepository>,
}

impl FollowGraph {
    /// Create the service.
    pub fn new(follows: Arc<dyn FollowRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { follows, users }
    }

    /// Make `user` follow `author`.
    pub async fn follow(&self, user: &UserId, author: &UserId) -> Result<FollowChange, Error> {
        let edge = FollowEdge::new(*user, *author);
        if edge.is_self_follow() {
            debug!(%user, "ignoring self follow");
            return Ok(FollowChange::Unchanged);
        }
        if self.follows.insert(&edge).await? {
            info!(%user, %author, "follow created");
            Ok(FollowChange::Applied)
        } else {
            debug!(%user, %author, "follow already present");
            Ok(FollowChange::Unchanged)
        }
    }

    /// Remove the edge from `user` to `author` if present.
    pub async fn unfollow(&self, user: &UserId, author: &UserId) -> Result<FollowChange, Error> {
        let edge = FollowEdge::new(*user, *author);
        if self.follows.delete(&edge).await? {
            info!(%user, %author, "follow removed");
            Ok(FollowChange::Applied)
        } else {
            Ok(FollowChange::Unchanged)
        }
    }

    /// Whether `user` follows `author`.
    pub async fn is_following(&self, user: &UserId, author: &UserId) -> Result<bool, Error> {
        Ok(self.follows.exists(&FollowEdge::new(*user, *author)).await?)
    }

    /// Number of authors `user` follows.
    pub async fn following_count(&self, user: &UserId) -> Result<usize, Error> {
        Ok(self.follows.count_for_user(user).await?)
    }

    /// [`Self::follow`] addressed by the author's username.
    pub async fn follow_username(
        &self,
        user: &UserId,
        author: &Username,
    ) -> Result<FollowChange, Error> {
        let author = self.author(author).await?;
        self.follow(user, author.id()).await
    }

    /// [`Self::unfollow`] addressed by the author's username.
    pub async fn unfollow_username(
        &self,
        user: &UserId,
        author: &Username,
    ) -> Result<FollowChange, Error> {
        let author = self.author(author).await?;
        self.unfollow(user, author.id()).await
    }

    async fn author(&self, username: &Username) -> Result<User, Error> {
        self.users.find_by_username(username).await?.ok_or_else(|| {
            Error::not_found(format!("user {username} does not exist"))
                .with_details(json!({ "username": username.as_str() }))
        })
    }
}
