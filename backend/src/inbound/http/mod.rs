//! HTTP inbound adapter.
//!
//! Handlers translate requests into domain service calls and answer with JSON
//! bodies or `302 Found` redirects. [`configure`] mounts every blog route so
//! the server and integration tests share one route table.

use actix_web::web;

pub mod auth;
pub mod context;
pub mod error;
pub mod feeds;
pub mod follows;
pub mod forms;
pub mod health;
pub mod not_found;
pub mod paths;
pub mod posts;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;

/// Register the blog routes.
///
/// Expects `web::Data<HttpState>` and a session middleware on the enclosing
/// app. Health checks and the `404` fallback are mounted separately.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(feeds::index)
        .service(feeds::group_posts)
        .service(feeds::profile)
        .service(feeds::follow_index)
        .service(posts::post_detail)
        .service(posts::create_form)
        .service(posts::create_post)
        .service(posts::edit_form)
        .service(posts::edit_post)
        .service(posts::add_comment)
        .service(follows::follow)
        .service(follows::unfollow)
        .service(auth::login_form)
        .service(auth::login)
        .service(auth::logout);
}
