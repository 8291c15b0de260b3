//! Post endpoints.
//!
//! ```text
//! GET  /posts/{id}/           post with comments
//! GET  /create/               blank post form            (login required)
//! POST /create/               create a post              (login required)
//! GET  /posts/{id}/edit/      pre-filled form            (author only)
//! POST /posts/{id}/edit/      apply an edit              (author only)
//! POST /posts/{id}/comment/   add a comment              (login required)
//! ```
//!
//! Anyone other than the author who reaches an edit endpoint is sent back to
//! the post without any change or error.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, get, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    Comment, EditAccess, EditOutcome, Error, FormOutcome, Post, PostDetail, PostId,
    RequestContext,
};

use super::ApiResult;
use super::context::{AuthenticatedUser, found};
use super::forms::{CommentForm, PostForm, PostFormView};
use super::paths::{post_path, profile_path};
use super::state::HttpState;

/// Body of a post page.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailView {
    pub post: Post,
    pub comments: Vec<Comment>,
    /// Number of posts written by the post's author.
    pub author_post_count: usize,
    pub can_edit: bool,
    pub comment_form: CommentForm,
}

impl From<PostDetail> for PostDetailView {
    fn from(detail: PostDetail) -> Self {
        Self {
            post: detail.post,
            comments: detail.comments,
            author_post_count: detail.author_post_count,
            can_edit: detail.can_edit,
            comment_form: CommentForm::default(),
        }
    }
}

fn rejected(view: PostFormView) -> HttpResponse {
    HttpResponse::build(StatusCode::BAD_REQUEST).json(view)
}

/// A post with its comments.
#[utoipa::path(
    get,
    path = "/posts/{id}/",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post", body = PostDetailView),
        (status = 404, description = "No such post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "postDetail",
    security([])
)]
#[get("/posts/{id}/")]
pub async fn post_detail(
    state: web::Data<HttpState>,
    context: RequestContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<PostDetailView>> {
    let detail = state
        .posts
        .detail(context.viewer(), PostId::new(path.into_inner()))
        .await?;
    Ok(web::Json(detail.into()))
}

/// Blank post form.
#[utoipa::path(
    get,
    path = "/create/",
    responses(
        (status = 200, description = "Form", body = PostFormView),
        (status = 302, description = "Login required")
    ),
    tags = ["posts"],
    operation_id = "createPostForm"
)]
#[get("/create/")]
pub async fn create_form(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
) -> ApiResult<web::Json<PostFormView>> {
    let groups = state.posts.group_choices().await?;
    Ok(web::Json(PostFormView::blank(groups)))
}

/// Create a post authored by the signed-in user.
#[utoipa::path(
    post,
    path = "/create/",
    request_body = PostForm,
    responses(
        (status = 302, description = "Created; redirects to the author's profile"),
        (status = 400, description = "Rejected form", body = PostFormView)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/create/")]
pub async fn create_post(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<PostForm>,
) -> ApiResult<HttpResponse> {
    let form = payload.into_inner();
    let input = form.clone().into_input()?;
    match state.posts.create(user.id(), &input).await? {
        FormOutcome::Valid(post) => Ok(found(profile_path(post.author().username()))),
        FormOutcome::Invalid(errors) => {
            let groups = state.posts.group_choices().await?;
            Ok(rejected(
                PostFormView::blank(groups).rejected(&form, errors),
            ))
        }
    }
}

/// Edit form for the post's author.
#[utoipa::path(
    get,
    path = "/posts/{id}/edit/",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Pre-filled form", body = PostFormView),
        (status = 302, description = "Not the author, or login required"),
        (status = 404, description = "No such post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "editPostForm"
)]
#[get("/posts/{id}/edit/")]
pub async fn edit_form(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = PostId::new(path.into_inner());
    match state.posts.edit_access(user.id(), id).await? {
        EditAccess::Permitted(post) => {
            let groups = state.posts.group_choices().await?;
            Ok(HttpResponse::Ok().json(PostFormView::for_post(&post, groups)))
        }
        EditAccess::NotPermitted => Ok(found(post_path(id))),
    }
}

/// Apply an edit. A body without `group` removes the post from its group.
#[utoipa::path(
    post,
    path = "/posts/{id}/edit/",
    params(("id" = i64, Path, description = "Post id")),
    request_body = PostForm,
    responses(
        (status = 302, description = "Saved, or ignored for non-authors; redirects to the post"),
        (status = 400, description = "Rejected form", body = PostFormView),
        (status = 404, description = "No such post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "editPost"
)]
#[post("/posts/{id}/edit/")]
pub async fn edit_post(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<PostForm>,
) -> ApiResult<HttpResponse> {
    let id = PostId::new(path.into_inner());
    let form = payload.into_inner();
    let input = form.clone().into_input()?;
    match state.posts.edit(user.id(), id, &input).await? {
        EditOutcome::Updated(_) | EditOutcome::NotPermitted => Ok(found(post_path(id))),
        EditOutcome::Invalid(errors) => {
            let EditAccess::Permitted(post) = state.posts.edit_access(user.id(), id).await? else {
                return Ok(found(post_path(id)));
            };
            let groups = state.posts.group_choices().await?;
            Ok(rejected(
                PostFormView::for_post(&post, groups).rejected(&form, errors),
            ))
        }
    }
}

/// Comment on a post. Always returns to the post; an empty comment is
/// dropped.
#[utoipa::path(
    post,
    path = "/posts/{id}/comment/",
    params(("id" = i64, Path, description = "Post id")),
    request_body = CommentForm,
    responses(
        (status = 302, description = "Redirects to the post"),
        (status = 404, description = "No such post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "addComment"
)]
#[post("/posts/{id}/comment/")]
pub async fn add_comment(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<CommentForm>,
) -> ApiResult<HttpResponse> {
    let id = PostId::new(path.into_inner());
    state
        .posts
        .add_comment(user.id(), id, &payload.into_inner().into())
        .await?;
    Ok(found(post_path(id)))
}
