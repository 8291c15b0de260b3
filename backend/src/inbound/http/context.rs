//! Per-request identity extraction and login redirects.
//!
//! [`RequestContext`] is built from the cookie session for every handler
//! that asks for it. [`AuthenticatedUser`] additionally insists on a signed-in
//! user and otherwise answers `302 Found` to the login page with the original
//! path and query in `next`.

use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload};
use futures_util::future::LocalBoxFuture;
use url::form_urlencoded;

use crate::domain::{RequestContext, UserId};

use super::session::SessionContext;

/// Login page that unauthenticated requests are sent to.
pub const LOGIN_PATH: &str = "/auth/login/";
/// Query parameter carrying the post-login destination.
pub const NEXT_PARAM: &str = "next";

impl FromRequest for RequestContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = SessionContext::from_request(req, payload);
        Box::pin(async move {
            let session = fut.await?;
            Ok(session
                .user_id()?
                .map_or_else(Self::anonymous, Self::authenticated))
        })
    }
}

/// The signed-in user of an auth-required endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    pub fn id(&self) -> &UserId {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let target = request_target(req);
        let fut = RequestContext::from_request(req, payload);
        Box::pin(async move {
            let context = fut.await?;
            match context.viewer() {
                Some(id) => Ok(Self(*id)),
                None => Err(LoginRedirect::to_login(&target).into()),
            }
        })
    }
}

/// Rejection that sends the client to the login page.
#[derive(Debug, thiserror::Error)]
#[error("login required")]
pub struct LoginRedirect {
    location: String,
}

impl LoginRedirect {
    /// Redirect to the login page, returning to `target` afterwards.
    ///
    /// ```
    /// use blog::inbound::http::context::LoginRedirect;
    ///
    /// let redirect = LoginRedirect::to_login("/create/?draft=1");
    /// assert_eq!(redirect.location(), "/auth/login/?next=%2Fcreate%2F%3Fdraft%3D1");
    /// ```
    pub fn to_login(target: &str) -> Self {
        let next: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
        Self {
            location: format!("{LOGIN_PATH}?{NEXT_PARAM}={next}"),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl ResponseError for LoginRedirect {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        found(self.location.as_str())
    }
}

/// Path and query of the request as received.
pub fn request_target(req: &HttpRequest) -> String {
    req.uri()
        .path_and_query()
        .map_or_else(|| req.path().to_owned(), |pq| pq.as_str().to_owned())
}

/// `302 Found` to `location`.
pub fn found(location: impl Into<String>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}

/// Accept only same-site relative destinations.
///
/// ```
/// use blog::inbound::http::context::safe_next;
///
/// assert_eq!(safe_next(Some("/follow/")), "/follow/");
/// assert_eq!(safe_next(Some("//evil.example/")), "/");
/// assert_eq!(safe_next(Some("https://evil.example/")), "/");
/// assert_eq!(safe_next(None), "/");
/// ```
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/",
    }
}
