//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and only see domain
//! services, so they stay testable against in-memory adapters.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    CommentRepository, FollowRepository, GroupRepository, ImageStorage, LoginService, PageCache,
    PostRepository, UserRepository,
};
use crate::domain::{FeedBuilder, FollowGraph, PageCacheService, PostService};

/// Parameter object bundling every port implementation the handlers need.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub login: Arc<dyn LoginService>,
    pub images: Arc<dyn ImageStorage>,
    pub page_cache: Arc<dyn PageCache>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub feeds: FeedBuilder,
    pub follows: FollowGraph,
    pub posts: PostService,
    pub page_cache: PageCacheService,
    pub login: Arc<dyn LoginService>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            users,
            groups,
            posts,
            comments,
            follows,
            login,
            images,
            page_cache,
            clock,
        } = ports;
        Self {
            feeds: FeedBuilder::new(posts.clone(), groups.clone(), users.clone()),
            follows: FollowGraph::new(follows, users.clone()),
            posts: PostService::new(posts, comments, groups, users, images, clock),
            page_cache: PageCacheService::new(page_cache),
            login,
        }
    }
}
