//! Canonical URLs handed out in redirects.

use crate::domain::{PostId, Username};

/// Feed of followed authors.
pub const FOLLOW_INDEX_PATH: &str = "/follow/";

/// `/profile/{username}/`
pub fn profile_path(username: &Username) -> String {
    format!("/profile/{username}/")
}

/// `/posts/{id}/`
pub fn post_path(id: PostId) -> String {
    format!("/posts/{id}/")
}
