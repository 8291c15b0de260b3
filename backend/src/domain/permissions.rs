//! Who may change what.

use super::{Post, UserId};

/// Only a post's author may edit it.
///
/// # Examples
/// ```
/// use blog::domain::{Post, PostId, PostText, User, UserId, Username, can_edit};
///
/// let author = User::new(UserId::random(), Username::new("auth").expect("username"));
/// let post = Post::new(
///     PostId::new(1),
///     PostText::new("Hello").expect("text"),
///     chrono::Utc::now(),
///     author.clone(),
///     None,
///     None,
/// );
/// assert!(can_edit(&post, Some(author.id())));
/// assert!(!can_edit(&post, Some(&UserId::random())));
/// assert!(!can_edit(&post, None));
/// ```
pub fn can_edit(post: &Post, requester: Option<&UserId>) -> bool {
    requester.is_some_and(|id| id == post.author().id())
}
