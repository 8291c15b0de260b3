//! PostgreSQL persistence adapters using Diesel.
//!
//! Each repository is a thin translation layer between row structs and domain
//! values. Row types (`models.rs`) and the table definitions (`schema.rs`)
//! never leave this module. Connections come from a `bb8` pool driven by
//! `diesel-async`.
//!
//! ```ignore
//! use blog::outbound::persistence::{DbPool, DieselPostRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/blog")).await?;
//! let posts = DieselPostRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_comment_repository;
mod diesel_follow_repository;
mod diesel_group_repository;
mod diesel_helpers;
mod diesel_login_service;
mod diesel_post_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_follow_repository::DieselFollowRepository;
pub use diesel_group_repository::DieselGroupRepository;
pub use diesel_login_service::DieselLoginService;
pub use diesel_post_repository::DieselPostRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::run_pending_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};
