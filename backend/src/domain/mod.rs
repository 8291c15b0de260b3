//! Domain primitives, services and ports.
//!
//! Entities (`User`, `Group`, `Post`, `Comment`, `FollowEdge`) are immutable
//! values validated at construction. Services (`FeedBuilder`, `FollowGraph`,
//! `PostService`, `PageCacheService`) hold `Arc<dyn Port>` handles and know
//! nothing about HTTP or storage technology.

pub mod auth;
pub mod comment;
pub mod context;
pub mod error;
pub mod feed;
pub mod follow;
pub mod follow_graph;
pub mod forms;
pub mod group;
pub mod page_cache;
pub mod permissions;
pub mod ports;
pub mod post;
pub mod post_service;
pub mod trace_id;
pub mod user;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::comment::{
    COMMENT_TEXT_MAX, Comment, CommentId, CommentText, CommentValidationError,
};
pub use self::context::RequestContext;
pub use self::error::{Error, ErrorCode};
pub use self::feed::{FEED_PAGE_SIZE, Feed, FeedBuilder, FeedScope, FeedSubject};
pub use self::follow::FollowEdge;
pub use self::follow_graph::{FollowChange, FollowGraph};
pub use self::forms::{
    CommentInput, FieldErrors, FormOutcome, GROUP_FIELD, GroupChoice, IMAGE_FIELD, ImageUpload,
    PostDraft, PostInput, TEXT_FIELD, ValidImage, validate_comment, validate_post,
};
pub use self::group::{GROUP_TITLE_MAX, Group, GroupId, GroupSlug, GroupValidationError};
pub use self::page_cache::{INDEX_PAGE_PREFIX, PAGE_CACHE_TTL, PageCacheService};
pub use self::permissions::can_edit;
pub use self::post::{
    ImageRef, POST_IMAGE_DIR, POST_LABEL_LEN, Post, PostId, PostText, PostValidationError,
};
pub use self::post_service::{EditAccess, EditOutcome, PostDetail, PostService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{USERNAME_MAX, User, UserId, UserValidationError, Username};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use blog::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
