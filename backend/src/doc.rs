//! OpenAPI document for the blog HTTP interface.
//!
//! Served by Swagger UI in debug builds and printed by the `openapi-dump`
//! binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Comment, Error, ErrorCode, Group, Post, User};
use crate::inbound::http::auth::{LoginRequest, NextQuery};
use crate::inbound::http::feeds::{FeedView, GroupFeedView, ProfileView};
use crate::inbound::http::forms::{
    CommentForm, ImageUploadForm, PostForm, PostFormValues, PostFormView,
};
use crate::inbound::http::posts::PostDetailView;

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /auth/login/.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Blog API",
        description = "Posts, groups, comments and follows behind a cookie session."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::feeds::index,
        crate::inbound::http::feeds::group_posts,
        crate::inbound::http::feeds::profile,
        crate::inbound::http::feeds::follow_index,
        crate::inbound::http::posts::post_detail,
        crate::inbound::http::posts::create_form,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::edit_form,
        crate::inbound::http::posts::edit_post,
        crate::inbound::http::posts::add_comment,
        crate::inbound::http::follows::follow,
        crate::inbound::http::follows::unfollow,
        crate::inbound::http::auth::login_form,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Post,
        Group,
        User,
        Comment,
        Error,
        ErrorCode,
        FeedView,
        GroupFeedView,
        ProfileView,
        PostDetailView,
        PostForm,
        PostFormValues,
        PostFormView,
        ImageUploadForm,
        CommentForm,
        LoginRequest,
        NextQuery,
    )),
    tags(
        (name = "feeds", description = "Paginated post listings"),
        (name = "posts", description = "Reading, writing and commenting on posts"),
        (name = "follows", description = "Following authors"),
        (name = "auth", description = "Session login and logout"),
        (name = "health", description = "Orchestration health checks")
    )
)]
pub struct ApiDoc;
