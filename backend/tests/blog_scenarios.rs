//! End-to-end scenarios over the full route table and in-memory adapters.

#[allow(dead_code)]
mod blog_support;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use blog::domain::TRACE_ID_HEADER;
use blog::test_support::app::{BlogFixture, FIXTURE_PASSWORD};
use blog_support::{fetch, fetch_json, init_app, location, login, submit, texts};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn site() -> BlogFixture {
    BlogFixture::new()
}

fn post_id(page: &Value, index: usize) -> i64 {
    page["items"][index]["id"].as_i64().expect("post id")
}

#[rstest]
#[actix_web::test]
async fn following_twice_keeps_a_single_edge(site: BlogFixture) {
    let app = init_app(&site).await;
    let mia = login(&app, "mia").await;

    for _ in 0..2 {
        let (status, to) = submit(&app, &mia, "/profile/leo/follow/", json!({})).await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(to.as_deref(), Some("/follow/"));
    }

    let follows = &site.state.follows;
    assert!(follows.is_following(site.mia.id(), site.leo.id()).await.expect("lookup"));
    assert_eq!(follows.following_count(site.mia.id()).await.expect("count"), 1);
}

#[rstest]
#[actix_web::test]
async fn following_yourself_changes_nothing(site: BlogFixture) {
    let app = init_app(&site).await;
    let leo = login(&app, "leo").await;

    let (status, _) = submit(&app, &leo, "/profile/leo/follow/", json!({})).await;

    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(
        site.state.follows.following_count(site.leo.id()).await.expect("count"),
        0
    );
}

#[rstest]
#[actix_web::test]
async fn unfollow_restores_the_edge_count(site: BlogFixture) {
    let app = init_app(&site).await;
    let mia = login(&app, "mia").await;

    submit(&app, &mia, "/profile/leo/follow/", json!({})).await;
    let (_, to) = submit(&app, &mia, "/profile/leo/unfollow/", json!({})).await;
    assert_eq!(to.as_deref(), Some("/profile/leo/"));
    let (status, _) = submit(&app, &mia, "/profile/leo/unfollow/", json!({})).await;

    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(
        site.state.follows.following_count(site.mia.id()).await.expect("count"),
        0
    );
}

#[rstest]
#[actix_web::test]
async fn feed_pages_hold_five_newest_posts(site: BlogFixture) {
    let app = init_app(&site).await;
    let leo = login(&app, "leo").await;
    for n in 1..=7 {
        site.clock.advance_seconds(60);
        let (status, to) =
            submit(&app, &leo, "/create/", json!({ "text": format!("post {n}") })).await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(to.as_deref(), Some("/profile/leo/"));
    }

    let profile = fetch_json(&app, None, "/profile/leo/").await;

    assert_eq!(profile["postCount"], 7);
    let page = &profile["page"];
    assert_eq!(
        texts(page),
        ["post 7", "post 6", "post 5", "post 4", "post 3"]
    );
    let dates: Vec<&str> = page["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|post| post["pubDate"].as_str().expect("pubDate"))
        .collect();
    assert!(dates.windows(2).all(|pair| pair[0] > pair[1]));
    assert_eq!(page["numPages"], 2);
    assert_eq!(page["links"]["next"], "/profile/leo/?page=2");
}

#[rstest]
#[actix_web::test]
async fn non_author_edit_is_silently_ignored(site: BlogFixture) {
    let app = init_app(&site).await;
    let leo = login(&app, "leo").await;
    let mia = login(&app, "mia").await;
    let cats = site.cats.id().get();
    submit(&app, &leo, "/create/", json!({ "text": "mine", "group": cats })).await;
    let id = post_id(&fetch_json(&app, None, "/profile/leo/").await["page"], 0);
    let edit = format!("/posts/{id}/edit/");

    let (status, to) = submit(&app, &mia, &edit, json!({ "text": "hijacked" })).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(to, Some(format!("/posts/{id}/")));
    let (status, _) = fetch(&app, Some(&mia), &edit).await;
    assert_eq!(status, StatusCode::FOUND);

    let detail = fetch_json(&app, Some(&mia), &format!("/posts/{id}/")).await;
    assert_eq!(detail["post"]["text"], "mine");
    assert_eq!(detail["post"]["group"]["slug"], "cats");
    assert_eq!(detail["canEdit"], false);
}

#[rstest]
#[actix_web::test]
async fn author_edit_without_group_clears_it(site: BlogFixture) {
    let app = init_app(&site).await;
    let leo = login(&app, "leo").await;
    let cats = site.cats.id().get();
    submit(&app, &leo, "/create/", json!({ "text": "draft", "group": cats })).await;
    let id = post_id(&fetch_json(&app, None, "/profile/leo/").await["page"], 0);

    let form = fetch_json(&app, Some(&leo), &format!("/posts/{id}/edit/")).await;
    assert_eq!(form["isEdit"], true);
    assert_eq!(form["values"]["group"], cats);

    let (status, to) = submit(
        &app,
        &leo,
        &format!("/posts/{id}/edit/"),
        json!({ "text": "final" }),
    )
    .await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(to, Some(format!("/posts/{id}/")));

    let detail = fetch_json(&app, Some(&leo), &format!("/posts/{id}/")).await;
    assert_eq!(detail["post"]["text"], "final");
    assert!(detail["post"]["group"].is_null());
    assert_eq!(detail["canEdit"], true);
}

#[rstest]
#[actix_web::test]
async fn home_feed_is_cached_until_expiry_or_flush(site: BlogFixture) {
    let app = init_app(&site).await;
    let leo = login(&app, "leo").await;
    submit(&app, &leo, "/create/", json!({ "text": "first" })).await;

    let (_, before) = fetch(&app, None, "/").await;
    site.clock.advance_seconds(5);
    submit(&app, &leo, "/create/", json!({ "text": "second" })).await;
    site.clock.advance_seconds(10);
    let (_, cached) = fetch(&app, None, "/").await;
    assert_eq!(before, cached);

    site.state.page_cache.flush().await.expect("flush");
    let fresh = fetch_json(&app, None, "/").await;
    assert_eq!(texts(&fresh["page"]), ["second", "first"]);
}

#[rstest]
#[actix_web::test]
async fn cached_home_feed_expires_after_twenty_seconds(site: BlogFixture) {
    let app = init_app(&site).await;
    let leo = login(&app, "leo").await;

    let (_, before) = fetch(&app, None, "/").await;
    submit(&app, &leo, "/create/", json!({ "text": "late" })).await;
    site.clock.advance_seconds(21);

    let (_, after) = fetch(&app, None, "/").await;
    assert_ne!(before, after);
    let page: Value = serde_json::from_slice(&after).expect("json");
    assert_eq!(texts(&page["page"]), ["late"]);
}

#[rstest]
#[actix_web::test]
async fn following_feed_shows_only_followed_authors(site: BlogFixture) {
    site.store
        .register_user("zoe", FIXTURE_PASSWORD)
        .expect("third user");
    let app = init_app(&site).await;
    let leo = login(&app, "leo").await;
    let mia = login(&app, "mia").await;
    let zoe = login(&app, "zoe").await;
    for (cookie, text) in [(&leo, "by leo"), (&mia, "by mia"), (&zoe, "by zoe")] {
        site.clock.advance_seconds(1);
        submit(&app, cookie, "/create/", json!({ "text": text })).await;
    }
    submit(&app, &mia, "/profile/leo/follow/", json!({})).await;
    submit(&app, &zoe, "/profile/mia/follow/", json!({})).await;

    let feed = fetch_json(&app, Some(&zoe), "/follow/").await;

    let authors: Vec<&str> = feed["page"]["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|post| post["author"]["username"].as_str().expect("username"))
        .collect();
    assert_eq!(authors, ["mia"]);
}

#[rstest]
#[case("/?page=999")]
#[case("/?page=0")]
#[case("/?page=-3")]
#[actix_web::test]
async fn out_of_range_page_returns_the_last_page(site: BlogFixture, #[case] uri: &str) {
    let app = init_app(&site).await;
    let leo = login(&app, "leo").await;
    for n in 1..=13 {
        site.clock.advance_seconds(1);
        submit(&app, &leo, "/create/", json!({ "text": format!("post {n}") })).await;
    }

    let feed = fetch_json(&app, None, uri).await;

    let page = &feed["page"];
    assert_eq!(page["number"], 3);
    assert_eq!(page["startIndex"], 11);
    assert_eq!(page["endIndex"], 13);
    assert_eq!(texts(page), ["post 3", "post 2", "post 1"]);
}

#[rstest]
#[actix_web::test]
async fn invalid_post_is_re_rendered_with_errors(site: BlogFixture) {
    let app = init_app(&site).await;
    let leo = login(&app, "leo").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/create/")
            .cookie(leo)
            .set_json(json!({ "text": "   ", "group": 999 }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let view: Value = actix_test::read_body_json(res).await;
    assert_eq!(view["values"]["text"], "   ");
    assert!(!view["errors"]["text"].as_array().expect("text errors").is_empty());
    assert!(!view["errors"]["group"].as_array().expect("group errors").is_empty());
    assert_eq!(view["groups"][0]["slug"], "cats");
    assert_eq!(
        site.state
            .feeds
            .build_feed(
                &blog::domain::FeedScope::All,
                &pagination::PageRequest::Unspecified,
                "/"
            )
            .await
            .expect("feed")
            .page
            .items()
            .len(),
        0
    );
}

#[rstest]
#[actix_web::test]
async fn comments_always_return_to_the_post(site: BlogFixture) {
    let app = init_app(&site).await;
    let leo = login(&app, "leo").await;
    let mia = login(&app, "mia").await;
    submit(&app, &leo, "/create/", json!({ "text": "talk to me" })).await;
    let id = post_id(&fetch_json(&app, None, "/profile/leo/").await["page"], 0);
    let comment = format!("/posts/{id}/comment/");

    for text in ["hello", ""] {
        let (status, to) = submit(&app, &mia, &comment, json!({ "text": text })).await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(to, Some(format!("/posts/{id}/")));
    }

    let detail = fetch_json(&app, None, &format!("/posts/{id}/")).await;
    let comments = detail["comments"].as_array().expect("comments");
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["text"], "hello");
    assert_eq!(comments[0]["author"]["username"], "mia");
    assert_eq!(detail["authorPostCount"], 1);
}

#[rstest]
#[case("/create/", "/auth/login/?next=%2Fcreate%2F")]
#[case("/follow/?page=2", "/auth/login/?next=%2Ffollow%2F%3Fpage%3D2")]
#[actix_web::test]
async fn anonymous_users_are_sent_to_login(
    site: BlogFixture,
    #[case] uri: &str,
    #[case] expected: &str,
) {
    let app = init_app(&site).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri(uri).to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res).as_deref(), Some(expected));
}

#[rstest]
#[case("/no/such/page/")]
#[case("/posts/9999/")]
#[case("/group/dogs/")]
#[case("/profile/nobody/")]
#[actix_web::test]
async fn missing_things_are_not_found(site: BlogFixture, #[case] uri: &str) {
    let app = init_app(&site).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri(uri).to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["traceId"], header);
}
