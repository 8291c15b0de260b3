//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod cache_key;
mod comment_repository;
mod follow_repository;
mod group_repository;
mod image_storage;
mod login_service;
mod page_cache;
mod post_repository;
mod repository_error;
mod user_repository;

pub use cache_key::{PageCacheKey, PageCacheKeyValidationError};
#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentRepository, NewComment};
#[cfg(test)]
pub use follow_repository::MockFollowRepository;
pub use follow_repository::FollowRepository;
#[cfg(test)]
pub use group_repository::MockGroupRepository;
pub use group_repository::GroupRepository;
#[cfg(test)]
pub use image_storage::MockImageStorage;
pub use image_storage::{ImageStorage, ImageStorageError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use page_cache::MockPageCache;
pub use page_cache::{CachedPage, PageCache, PageCacheError};
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::{NewPost, PostChanges, PostFilter, PostRepository};
pub use repository_error::RepositoryError;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::UserRepository;
