mod common;

use axum::http::{Method, StatusCode};

use common::app::spawn_test_app;
use common::auth::{auth_header, login_and_get_token};
use common::fixtures::seed_question;
use common::http::{assert_json_error, request, response_json};

#[tokio::test]
async fn it_bookmark_requires_existing_question() {
    let app = spawn_test_app().await;
    let token = login_and_get_token(&app.app).await;

    let response = request(
        &app.app,
        Method::POST,
        "/api/bookmarks",
        Some(serde_json::json!({"questionId": "missing"})),
        &[("authorization", auth_header(&token))],
    )
    .await;

    let (status, _, body) = response_json(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json_error(&body, "NOT_FOUND");
}

#[tokio::test]
async fn it_bookmark_save_is_idempotent() {
    let app = spawn_test_app().await;
    let token = login_and_get_token(&app.app).await;
    seed_question(app.state.store(), "q1", "A");

    let first = request(
        &app.app,
        Method::POST,
        "/api/bookmarks",
        Some(serde_json::json!({"questionId": "q1"})),
        &[("authorization", auth_header(&token))],
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = request(
        &app.app,
        Method::POST,
        "/api/bookmarks",
        Some(serde_json::json!({"questionId": "q1"})),
        &[("authorization", auth_header(&token))],
    )
    .await;
    assert_eq!(second.status(), StatusCode::OK);

    let list = request(
        &app.app,
        Method::GET,
        "/api/bookmarks",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (_, _, body) = response_json(list).await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["items"][0]["question"]["id"], "q1");
}

#[tokio::test]
async fn it_delete_bookmark_then_404_on_repeat() {
    let app = spawn_test_app().await;
    let token = login_and_get_token(&app.app).await;
    seed_question(app.state.store(), "q1", "A");

    request(
        &app.app,
        Method::POST,
        "/api/bookmarks",
        Some(serde_json::json!({"questionId": "q1"})),
        &[("authorization", auth_header(&token))],
    )
    .await;

    let deleted = request(
        &app.app,
        Method::DELETE,
        "/api/bookmarks",
        Some(serde_json::json!({"questionId": "q1"})),
        &[("authorization", auth_header(&token))],
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let repeat = request(
        &app.app,
        Method::DELETE,
        "/api/bookmarks",
        Some(serde_json::json!({"questionId": "q1"})),
        &[("authorization", auth_header(&token))],
    )
    .await;
    assert_eq!(repeat.status(), StatusCode::NOT_FOUND);
}
