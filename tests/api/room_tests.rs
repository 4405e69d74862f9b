//! Room API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{body_json, TestApp};

#[tokio::test]
async fn test_create_and_get_room() {
    let app = TestApp::new().await;

    let response = app
        .post_json("/api/rp", r#"{"title":"Tea party","desc":"Mad hatters only"}"#)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let rp_code = created["rpCode"].as_str().unwrap();
    let read_code = created["readCode"].as_str().unwrap();
    assert_ne!(rp_code, read_code);

    let room = body_json(app.get(&format!("/api/rp/{}", rp_code)).await).await;
    assert_eq!(room["title"], "Tea party");
    assert_eq!(room["desc"], "Mad hatters only");
    assert_eq!(room["readCode"], read_code);
    assert_eq!(room["readOnly"], false);
    assert_eq!(room["msgs"], serde_json::json!([]));
    assert_eq!(room["charas"], serde_json::json!([]));

    let via_read = body_json(app.get(&format!("/api/rp/{}", read_code)).await).await;
    assert_eq!(via_read["title"], "Tea party");
    assert_eq!(via_read["readOnly"], true);
}

#[tokio::test]
async fn test_create_room_validates_title() {
    let app = TestApp::new().await;

    let response = app.post_json("/api/rp", r#"{"title":""}"#).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("title"));

    let long = "x".repeat(31);
    let response = app
        .post_json("/api/rp", &serde_json::json!({ "title": long }).to_string())
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_room_is_not_found() {
    let app = TestApp::new().await;
    assert_eq!(app.get("/api/rp/doesnotexist").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_read_slug_rejects_writes() {
    let app = TestApp::new().await;
    let room = app.create_room("Tea party").await;

    let response = app
        .post_json_auth(
            &format!("/api/rp/{}/charas", room.read_code),
            r##"{"name":"Aria","color":"#ff00aa"}"##,
            &room.token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
