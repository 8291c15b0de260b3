//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test as actix_test, web};

use crate::domain::{Error, UserId};

use super::ApiResult;
use super::session::SessionContext;

/// Build a session middleware configured for tests.
///
/// Generates a fresh key per invocation, names the cookie `session` and
/// disables the `Secure` flag for plain HTTP test requests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by a response, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Path of the [`sign_in_as`] test route.
pub const SIGN_IN_PATH: &str = "/test/sign-in/{id}";

/// Test-only handler that signs the caller in as the user id in the path.
pub async fn sign_in_as(session: SessionContext, id: web::Path<String>) -> ApiResult<HttpResponse> {
    let id = UserId::new(id.as_str()).map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_user(&id)?;
    Ok(HttpResponse::Ok().finish())
}

/// Call [`sign_in_as`] on `app` and return the session cookie it sets.
///
/// # Panics
/// Panics when the app does not mount [`SIGN_IN_PATH`].
pub async fn sign_in_cookie<S, B>(app: &S, id: &UserId) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::get()
            .uri(&SIGN_IN_PATH.replace("{id}", &id.to_string()))
            .to_request(),
    )
    .await;
    session_cookie(&res).expect("session cookie")
}
