//! Paginated post feeds.
//!
//! A feed is a scope (which posts) plus a page request (which slice). Scopes
//! naming a group or author resolve the name first; an unknown name is
//! `NotFound`. Pages hold [`FEED_PAGE_SIZE`] posts, newest first.

use std::num::NonZeroUsize;
use std::sync::Arc;

use pagination::{Page, PageLinks, PageRequest, Paginator};
use serde_json::json;
use tracing::debug;

use super::ports::{GroupRepository, PostFilter, PostRepository, UserRepository};
use super::{Error, Group, GroupSlug, Post, User, UserId, Username};

/// Posts per feed page.
pub const FEED_PAGE_SIZE: usize = 5;

/// Which posts a feed shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedScope {
    /// Every post.
    All,
    /// Posts in the group with this slug.
    ByGroup(GroupSlug),
    /// Posts by the author with this username.
    ByAuthor(Username),
    /// Posts by authors the given user follows.
    FollowingOf(UserId),
}

/// What a feed was resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSubject {
    All,
    Group(Group),
    Author(User),
    Following(UserId),
}

/// One page of a feed.
#[derive(Debug, Clone)]
pub struct Feed {
    pub subject: FeedSubject,
    pub page: Page<Post>,
}

/// Builds feed pages from the entity store.
#[derive(Clone)]
pub struct FeedBuilder {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
    paginator: Paginator,
}

impl FeedBuilder {
    /// Create a builder over the given repositories.
    pub fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        let per_page = NonZeroUsize::new(FEED_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN);
        Self {
            posts,
            groups,
            users,
            paginator: Paginator::new(per_page),
        }
    }

    /// Build the page of `scope` selected by `request`.
    ///
    /// `target` is the request path and query; it seeds the previous/next
    /// links and must parse as a relative reference.
    pub async fn build_feed(
        &self,
        scope: &FeedScope,
        request: &PageRequest,
        target: &str,
    ) -> Result<Feed, Error> {
        let (subject, filter) = self.resolve(scope).await?;

        let count = self.posts.count(&filter).await?;
        let window = self.paginator.resolve(request, count);
        let items = self
            .posts
            .list(&filter, window.offset(), window.limit())
            .await?;
        debug!(
            ?filter,
            count,
            page = window.number(),
            items = items.len(),
            "built feed page"
        );

        let links = PageLinks::for_target(target, &window).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({ "target": target }))
        })?;
        Ok(Feed {
            subject,
            page: Page::new(items, window).with_links(links),
        })
    }

    async fn resolve(&self, scope: &FeedScope) -> Result<(FeedSubject, PostFilter), Error> {
        match scope {
            FeedScope::All => Ok((FeedSubject::All, PostFilter::All)),
            FeedScope::ByGroup(slug) => {
                let group = self.groups.find_by_slug(slug).await?.ok_or_else(|| {
                    Error::not_found(format!("group {slug} does not exist"))
                        .with_details(json!({ "slug": slug.as_str() }))
                })?;
                let filter = PostFilter::Group(group.id());
                Ok((FeedSubject::Group(group), filter))
            }
            FeedScope::ByAuthor(username) => {
                let author = self.users.find_by_username(username).await?.ok_or_else(|| {
                    Error::not_found(format!("user {username} does not exist"))
                        .with_details(json!({ "username": username.as_str() }))
                })?;
                let filter = PostFilter::Author(*author.id());
                Ok((FeedSubject::Author(author), filter))
            }
            FeedScope::FollowingOf(user) => {
                Ok((FeedSubject::Following(*user), PostFilter::FollowedBy(*user)))
            }
        }
    }
}
