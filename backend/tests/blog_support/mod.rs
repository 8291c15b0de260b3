//! Shared harness: the full route table over in-memory adapters.

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test as actix_test, web};
use blog::Trace;
use blog::inbound::http::configure;
use blog::inbound::http::not_found::not_found;
use blog::test_support::app::{BlogFixture, FIXTURE_PASSWORD};
use serde_json::{Value, json};

/// Mount every blog route on top of `fixture`.
pub async fn init_app(
    fixture: &BlogFixture,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    actix_test::init_service(
        App::new()
            .app_data(web::Data::new(fixture.state.clone()))
            .configure(configure)
            .default_service(web::to(not_found))
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                    .cookie_name("session".to_owned())
                    .cookie_secure(false)
                    .build(),
            )
            .wrap(Trace),
    )
    .await
}

pub fn location(res: &ServiceResponse) -> Option<String> {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Sign in as `username` and return the session cookie.
pub async fn login<S>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/auth/login/")
            .set_json(json!({ "username": username, "password": FIXTURE_PASSWORD }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND, "login as {username}");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

/// Submit a post form; returns the response status and `Location`.
pub async fn submit<S>(
    app: &S,
    cookie: &Cookie<'static>,
    uri: &str,
    body: Value,
) -> (StatusCode, Option<String>)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri(uri)
            .cookie(cookie.clone())
            .set_json(body)
            .to_request(),
    )
    .await;
    (res.status(), location(&res))
}

/// GET `uri` and return status plus raw body.
pub async fn fetch<S>(app: &S, cookie: Option<&Cookie<'static>>, uri: &str) -> (StatusCode, Vec<u8>)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let mut req = actix_test::TestRequest::get().uri(uri);
    if let Some(cookie) = cookie {
        req = req.cookie(cookie.clone());
    }
    let res = actix_test::call_service(app, req.to_request()).await;
    let status = res.status();
    (status, actix_test::read_body(res).await.to_vec())
}

/// GET `uri` and parse the JSON body.
pub async fn fetch_json<S>(app: &S, cookie: Option<&Cookie<'static>>, uri: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = fetch(app, cookie, uri).await;
    assert_eq!(status, StatusCode::OK, "GET {uri}");
    serde_json::from_slice(&body).expect("json body")
}

/// Texts of the posts on a feed page, in page order.
pub fn texts(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|post| post["text"].as_str().expect("text").to_owned())
        .collect()
}
