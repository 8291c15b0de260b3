//! Login and logout.
//!
//! ```text
//! GET  /auth/login/?next=/create/    {"next":"/create/"}
//! POST /auth/login/?next=/create/    {"username":"leo","password":"secret"}
//! POST /auth/logout/
//! ```

use actix_web::{HttpResponse, get, post, route, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, LoginCredentials, LoginValidationError};

use super::ApiResult;
use super::context::{found, safe_next};
use super::session::SessionContext;
use super::state::HttpState;

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Where to go once signed in.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NextQuery {
    /// Local path to return to. Anything else falls back to `/`.
    pub next: Option<String>,
}

/// Describe the login form.
#[utoipa::path(
    get,
    path = "/auth/login/",
    params(NextQuery),
    responses((status = 200, description = "Login form", body = NextQuery)),
    tags = ["auth"],
    operation_id = "loginForm",
    security([])
)]
#[get("/auth/login/")]
pub async fn login_form(query: web::Query<NextQuery>) -> web::Json<NextQuery> {
    let next = safe_next(query.next.as_deref()).to_owned();
    web::Json(NextQuery { next: Some(next) })
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/auth/login/",
    params(NextQuery),
    request_body = LoginRequest,
    responses(
        (status = 302, description = "Signed in; redirects to `next`",
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login/")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<NextQuery>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    info!(user = %user_id, "signed in");
    Ok(found(safe_next(query.next.as_deref())))
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// End the session and return to the home feed.
#[utoipa::path(
    post,
    path = "/auth/logout/",
    responses((status = 302, description = "Signed out; redirects to `/`")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[route("/auth/logout/", method = "GET", method = "POST")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    found("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::inbound::http::session::USER_ID_KEY;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use crate::test_support::app::{BlogFixture, FIXTURE_PASSWORD};
    use actix_session::SessionExt;
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, HttpRequest, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    async fn whoami(req: HttpRequest) -> String {
        req.get_session()
            .get::<String>(USER_ID_KEY)
            .ok()
            .flatten()
            .unwrap_or_else(|| "anonymous".to_owned())
    }

    macro_rules! app {
        ($fixture:expr) => {
            actix_test::init_service(
                App::new()
                    .wrap(test_session_middleware())
                    .app_data(web::Data::new($fixture.state.clone()))
                    .service(login_form)
                    .service(login)
                    .service(logout)
                    .route("/whoami", web::get().to(whoami)),
            )
            .await
        };
    }

    fn location<B>(res: &actix_web::dev::ServiceResponse<B>) -> Option<&str> {
        res.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    #[actix_web::test]
    async fn login_redirects_to_next_and_sets_session() {
        let fixture = BlogFixture::new();
        let app = app!(fixture);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/auth/login/?next=%2Fcreate%2F")
                .set_json(LoginRequest {
                    username: "leo".into(),
                    password: FIXTURE_PASSWORD.into(),
                })
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), Some("/create/"));
        let cookie = session_cookie(&res).expect("session cookie");
        let who = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/whoami").cookie(cookie).to_request(),
        )
        .await;
        let body = actix_test::read_body(who).await;
        let id = UserId::new(std::str::from_utf8(&body).expect("utf8")).expect("user id");
        assert_eq!(&id, fixture.leo.id());
    }

    #[rstest]
    #[case("leo", "wrong", StatusCode::UNAUTHORIZED)]
    #[case("nobody", FIXTURE_PASSWORD, StatusCode::UNAUTHORIZED)]
    #[case("   ", FIXTURE_PASSWORD, StatusCode::BAD_REQUEST)]
    #[case("leo", "", StatusCode::BAD_REQUEST)]
    #[actix_web::test]
    async fn bad_logins_are_rejected(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: StatusCode,
    ) {
        let fixture = BlogFixture::new();
        let app = app!(fixture);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/auth/login/")
                .set_json(LoginRequest {
                    username: username.into(),
                    password: password.into(),
                })
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), expected);
        assert!(session_cookie(&res).is_none());
    }

    #[actix_web::test]
    async fn foreign_next_falls_back_to_home() {
        let fixture = BlogFixture::new();
        let app = app!(fixture);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/auth/login/?next=https%3A%2F%2Fevil.example%2F")
                .set_json(LoginRequest {
                    username: "mia".into(),
                    password: FIXTURE_PASSWORD.into(),
                })
                .to_request(),
        )
        .await;

        assert_eq!(location(&res), Some("/"));
    }

    #[actix_web::test]
    async fn login_form_echoes_safe_next() {
        let fixture = BlogFixture::new();
        let app = app!(fixture);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/auth/login/?next=%2Ffollow%2F")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["next"], "/follow/");
    }

    #[actix_web::test]
    async fn logout_redirects_home() {
        let fixture = BlogFixture::new();
        let app = app!(fixture);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post().uri("/auth/logout/").to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), Some("/"));
    }
}
