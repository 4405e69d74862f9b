//! User Token API Tests

use axum::http::StatusCode;

use crate::common::{body_json, TestApp};

#[tokio::test]
async fn test_issue_user_token() {
    let app = TestApp::new().await;
    let (userid, token) = app.create_user().await;

    assert!(!userid.is_empty());
    assert_eq!(token.split('.').count(), 3);
}

#[tokio::test]
async fn test_secret_is_persisted_once() {
    let app = TestApp::new().await;
    app.create_user().await;
    let first = app.state.provisioner.secret().await.unwrap().to_vec();
    app.create_user().await;

    assert_eq!(first.len(), 32);
    assert_eq!(app.state.provisioner.secret().await.unwrap(), &first[..]);
}

#[tokio::test]
async fn test_write_without_token_is_unauthorized() {
    let app = TestApp::new().await;
    let room = app.create_room("Tea party").await;

    let response = app
        .post_json(
            &format!("/api/rp/{}/charas", room.rp_code),
            r##"{"name":"Aria","color":"#ff00aa"}"##,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_write_with_bad_token_is_unauthorized() {
    let app = TestApp::new().await;
    let room = app.create_room("Tea party").await;

    let response = app
        .post_json_auth(
            &format!("/api/rp/{}/charas", room.rp_code),
            r##"{"name":"Aria","color":"#ff00aa"}"##,
            "not.a.token",
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("Invalid token"));
}
