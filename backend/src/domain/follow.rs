//! Directed follow edges between users.

use serde::Serialize;

use super::UserId;

/// "`user` receives `author`'s posts in their following feed."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEdge {
    user: UserId,
    author: UserId,
}

impl FollowEdge {
    /// Edge from `user` to `author`.
    pub fn new(user: UserId, author: UserId) -> Self {
        Self { user, author }
    }

    /// Follower.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Followed author.
    pub fn author(&self) -> &UserId {
        &self.author
    }

    /// True when the edge would point a user at themself.
    pub fn is_self_follow(&self) -> bool {
        self.user == self.author
    }
}
