//! Feed endpoints.
//!
//! ```text
//! GET /                       all posts, cached for 20 seconds
//! GET /group/{slug}/          posts of one group
//! GET /profile/{username}/    posts of one author
//! GET /follow/                posts of followed authors (login required)
//! ```
//!
//! Every feed is a page of five posts selected with `?page=`.

use actix_web::http::header::{self, ContentType};
use actix_web::{HttpRequest, HttpResponse, get, web};
use pagination::{PAGE_PARAM, Page, PageRequest};
use serde::Serialize;
use url::form_urlencoded;
use utoipa::ToSchema;

use crate::domain::ports::CachedPage;
use crate::domain::{
    Error, FeedScope, FeedSubject, Group, GroupSlug, Post, RequestContext, User, Username,
};

use super::ApiResult;
use super::context::{AuthenticatedUser, request_target};
use super::state::HttpState;

/// Body of the home and following feeds.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedView {
    #[schema(value_type = Object)]
    pub page: Page<Post>,
}

/// Body of a group feed.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupFeedView {
    pub group: Group,
    #[schema(value_type = Object)]
    pub page: Page<Post>,
}

/// Body of an author profile.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub author: User,
    pub post_count: usize,
    /// Whether the viewer follows this author.
    pub following: bool,
    #[schema(value_type = Object)]
    pub page: Page<Post>,
}

fn page_request(req: &HttpRequest) -> PageRequest {
    let raw = form_urlencoded::parse(req.query_string().as_bytes())
        .find(|(name, _)| name == PAGE_PARAM)
        .map(|(_, value)| value.into_owned());
    PageRequest::parse(raw.as_deref())
}

fn unexpected_subject() -> Error {
    Error::internal("feed resolved to an unexpected subject")
}

/// Global feed, served from the page cache.
#[utoipa::path(
    get,
    path = "/",
    params(("page" = Option<String>, Query, description = "1-based page number")),
    responses(
        (status = 200, description = "Feed page", body = FeedView,
            headers(("Cache-Control" = String, description = "max-age=20"))),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["feeds"],
    operation_id = "indexFeed",
    security([])
)]
#[get("/")]
pub async fn index(state: web::Data<HttpState>, req: HttpRequest) -> ApiResult<HttpResponse> {
    let target = request_target(&req);
    let request = page_request(&req);
    let feeds = state.feeds.clone();
    let render_target = target.clone();

    let page = state
        .page_cache
        .get_or_render(&target, move || async move {
            let feed = feeds
                .build_feed(&FeedScope::All, &request, &render_target)
                .await?;
            let body = serde_json::to_vec(&FeedView { page: feed.page })
                .map_err(|err| Error::internal(format!("failed to render feed: {err}")))?;
            Ok(CachedPage::new(body))
        })
        .await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .insert_header((
            header::CACHE_CONTROL,
            format!("max-age={}", state.page_cache.ttl().as_secs()),
        ))
        .body(page.into_body()))
}

/// Posts of one group.
#[utoipa::path(
    get,
    path = "/group/{slug}/",
    params(
        ("slug" = String, Path, description = "Group slug"),
        ("page" = Option<String>, Query, description = "1-based page number")
    ),
    responses(
        (status = 200, description = "Group feed page", body = GroupFeedView),
        (status = 404, description = "No such group", body = Error)
    ),
    tags = ["feeds"],
    operation_id = "groupFeed",
    security([])
)]
#[get("/group/{slug}/")]
pub async fn group_posts(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> ApiResult<web::Json<GroupFeedView>> {
    let slug = GroupSlug::new(path.into_inner())
        .map_err(|err| Error::not_found(format!("no such group: {err}")))?;
    let feed = state
        .feeds
        .build_feed(
            &FeedScope::ByGroup(slug),
            &page_request(&req),
            &request_target(&req),
        )
        .await?;
    let FeedSubject::Group(group) = feed.subject else {
        return Err(unexpected_subject());
    };
    Ok(web::Json(GroupFeedView {
        group,
        page: feed.page,
    }))
}

/// Posts of one author with the viewer's follow status.
#[utoipa::path(
    get,
    path = "/profile/{username}/",
    params(
        ("username" = String, Path, description = "Author username"),
        ("page" = Option<String>, Query, description = "1-based page number")
    ),
    responses(
        (status = 200, description = "Profile feed page", body = ProfileView),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["feeds"],
    operation_id = "profileFeed",
    security([])
)]
#[get("/profile/{username}/")]
pub async fn profile(
    state: web::Data<HttpState>,
    context: RequestContext,
    req: HttpRequest,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProfileView>> {
    let username = parse_username(path.into_inner())?;
    let feed = state
        .feeds
        .build_feed(
            &FeedScope::ByAuthor(username),
            &page_request(&req),
            &request_target(&req),
        )
        .await?;
    let FeedSubject::Author(author) = feed.subject else {
        return Err(unexpected_subject());
    };
    let following = match context.viewer() {
        Some(viewer) if viewer != author.id() => {
            state.follows.is_following(viewer, author.id()).await?
        }
        _ => false,
    };
    Ok(web::Json(ProfileView {
        post_count: feed.page.window().count(),
        author,
        following,
        page: feed.page,
    }))
}

/// Posts by authors the viewer follows.
#[utoipa::path(
    get,
    path = "/follow/",
    params(("page" = Option<String>, Query, description = "1-based page number")),
    responses(
        (status = 200, description = "Following feed page", body = FeedView),
        (status = 302, description = "Login required")
    ),
    tags = ["feeds"],
    operation_id = "followFeed"
)]
#[get("/follow/")]
pub async fn follow_index(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    req: HttpRequest,
) -> ApiResult<web::Json<FeedView>> {
    let feed = state
        .feeds
        .build_feed(
            &FeedScope::FollowingOf(*user.id()),
            &page_request(&req),
            &request_target(&req),
        )
        .await?;
    Ok(web::Json(FeedView { page: feed.page }))
}

/// Parse a username from a path segment; malformed names cannot exist.
pub(super) fn parse_username(raw: String) -> Result<Username, Error> {
    Username::new(raw).map_err(|err| Error::not_found(format!("no such user: {err}")))
}
