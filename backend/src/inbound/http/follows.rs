//! Follow and unfollow endpoints.
//!
//! Both accept `GET` as well as `POST` so a plain link can trigger them.
//! Following yourself or someone you already follow changes nothing and is
//! not an error.

use actix_web::{HttpResponse, route, web};

use crate::domain::Error;

use super::ApiResult;
use super::context::{AuthenticatedUser, found};
use super::feeds::parse_username;
use super::paths::{FOLLOW_INDEX_PATH, profile_path};
use super::state::HttpState;

/// Follow an author.
#[utoipa::path(
    post,
    path = "/profile/{username}/follow/",
    params(("username" = String, Path, description = "Author to follow")),
    responses(
        (status = 302, description = "Redirects to the following feed"),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["follows"],
    operation_id = "followAuthor"
)]
#[route("/profile/{username}/follow/", method = "GET", method = "POST")]
pub async fn follow(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let author = parse_username(path.into_inner())?;
    state.follows.follow_username(user.id(), &author).await?;
    Ok(found(FOLLOW_INDEX_PATH))
}

/// Stop following an author.
#[utoipa::path(
    post,
    path = "/profile/{username}/unfollow/",
    params(("username" = String, Path, description = "Author to unfollow")),
    responses(
        (status = 302, description = "Redirects to the author's profile"),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["follows"],
    operation_id = "unfollowAuthor"
)]
#[route("/profile/{username}/unfollow/", method = "GET", method = "POST")]
pub async fn unfollow(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let author = parse_username(path.into_inner())?;
    state.follows.unfollow_username(user.id(), &author).await?;
    Ok(found(profile_path(&author)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{
        SIGN_IN_PATH, sign_in_as, sign_in_cookie, test_session_middleware,
    };
    use crate::test_support::app::BlogFixture;
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test as actix_test};
    use rstest::rstest;

    macro_rules! app {
        ($fixture:expr) => {
            actix_test::init_service(
                App::new()
                    .wrap(test_session_middleware())
                    .app_data(web::Data::new($fixture.state.clone()))
                    .service(follow)
                    .service(unfollow)
                    .route(SIGN_IN_PATH, web::get().to(sign_in_as)),
            )
            .await
        };
    }

    #[rstest]
    #[case("GET")]
    #[case("POST")]
    #[actix_web::test]
    async fn follow_redirects_to_following_feed(#[case] method: &str) {
        let fixture = BlogFixture::new();
        let app = app!(fixture);
        let cookie = sign_in_cookie(&app, fixture.mia.id()).await;

        let req = actix_test::TestRequest::default()
            .method(method.parse().expect("method"))
            .uri("/profile/leo/follow/")
            .cookie(cookie)
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(
            res.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some("/follow/")
        );
        assert!(
            fixture
                .state
                .follows
                .is_following(fixture.mia.id(), fixture.leo.id())
                .await
                .expect("lookup")
        );
    }

    #[actix_web::test]
    async fn self_follow_redirects_without_an_edge() {
        let fixture = BlogFixture::new();
        let app = app!(fixture);
        let cookie = sign_in_cookie(&app, fixture.leo.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/profile/leo/follow/")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(
            fixture
                .state
                .follows
                .following_count(fixture.leo.id())
                .await
                .expect("count"),
            0
        );
    }

    #[actix_web::test]
    async fn unfollow_returns_to_profile() {
        let fixture = BlogFixture::new();
        fixture
            .state
            .follows
            .follow(fixture.mia.id(), fixture.leo.id())
            .await
            .expect("follow");
        let app = app!(fixture);
        let cookie = sign_in_cookie(&app, fixture.mia.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/profile/leo/unfollow/")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(
            res.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some("/profile/leo/")
        );
        assert!(
            !fixture
                .state
                .follows
                .is_following(fixture.mia.id(), fixture.leo.id())
                .await
                .expect("lookup")
        );
    }

    #[actix_web::test]
    async fn unknown_author_is_not_found() {
        let fixture = BlogFixture::new();
        let app = app!(fixture);
        let cookie = sign_in_cookie(&app, fixture.mia.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/profile/nobody/follow/")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn anonymous_follow_goes_to_login() {
        let fixture = BlogFixture::new();
        let app = app!(fixture);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/profile/leo/follow/").to_request(),
        )
        .await;

        assert_eq!(
            res.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some("/auth/login/?next=%2Fprofile%2Fleo%2Ffollow%2F")
        );
    }
}
