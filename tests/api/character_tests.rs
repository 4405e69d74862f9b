//! Character API Tests

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{body_json, TestApp};

#[tokio::test]
async fn test_valid_character_is_accepted() {
    let app = TestApp::new().await;
    let room = app.create_room("Tea party").await;

    let response = app
        .post_json_auth(
            &format!("/api/rp/{}/charas", room.rp_code),
            r##"{"name":"Aria","color":"#ff00aa"}"##,
            &room.token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let chara = body_json(response).await;
    assert_eq!(chara["name"], "Aria");
    assert_eq!(chara["color"], "#ff00aa");
    assert_eq!(chara["revision"], 0);
    assert!(chara["_id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn test_empty_name_is_rejected() {
    let app = TestApp::new().await;
    let room = app.create_room("Tea party").await;

    let response = app
        .post_json_auth(
            &format!("/api/rp/{}/charas", room.rp_code),
            r##"{"name":"","color":"#ff00aa"}"##,
            &room.token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Chara: name is empty");

    let snapshot = body_json(app.get(&format!("/api/rp/{}", room.rp_code)).await).await;
    assert_eq!(snapshot["charas"], json!([]));
}

#[tokio::test]
async fn test_uppercase_color_is_rejected() {
    let app = TestApp::new().await;
    let room = app.create_room("Tea party").await;

    let response = app
        .post_json_auth(
            &format!("/api/rp/{}/charas", room.rp_code),
            r##"{"name":"Aria","color":"#FF00AA"}"##,
            &room.token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Chara: color is invalid");
}

#[tokio::test]
async fn test_edit_character() {
    let app = TestApp::new().await;
    let room = app.create_room("Tea party").await;
    let id = app.create_character(&room, "Aria", "#ff00aa").await;

    let response = app
        .put_json_auth(
            &format!("/api/rp/{}/charas/{}", room.rp_code, id),
            r##"{"name":"Aria the Bold","color":"#00ff00"}"##,
            &room.token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let chara = body_json(response).await;
    assert_eq!(chara["revision"], 1);
    assert_eq!(chara["name"], "Aria the Bold");

    let snapshot = body_json(app.get(&format!("/api/rp/{}", room.rp_code)).await).await;
    assert_eq!(snapshot["charas"][0]["color"], "#00ff00");
}
