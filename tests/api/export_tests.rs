//! Export API Tests

use axum::http::{header, StatusCode};
use serde_json::json;

use crate::common::{body_text, TestApp, TestRoom};

async fn populated_room(app: &TestApp) -> TestRoom {
    let room = app.create_room("Tea party").await;
    let chara_id = app.create_character(&room, "Alice", "#445566").await;
    let uri = format!("/api/rp/{}/msgs", room.rp_code);

    for payload in [
        json!({ "type": "narrator", "content": "The kettle whistles." }),
        json!({ "type": "chara", "content": "More tea?", "charaId": chara_id }),
        json!({ "type": "ooc", "content": "brb" }),
    ] {
        let response = app.post_json_auth(&uri, &payload.to_string(), &room.token).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    room
}

#[tokio::test]
async fn test_json_export() {
    let app = TestApp::new().await;
    let room = populated_room(&app).await;

    let response = app.get(&format!("/api/rp/{}/export", room.read_code)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    let blocks: Vec<serde_json::Value> =
        text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();

    assert_eq!(blocks.len(), 4);
    assert_eq!(blocks[0]["title"], "Tea party");
    assert_eq!(blocks[0]["charas"][0]["name"], "Alice");
    assert_eq!(blocks[2]["charaId"], 0);
    assert!(blocks[1].get("charaId").is_none());
    assert!(blocks[3]["timestamp"].is_string());
}

#[tokio::test]
async fn test_text_download() {
    let app = TestApp::new().await;
    let room = populated_room(&app).await;

    let response = app.get(&format!("/api/rp/{}/download.txt", room.rp_code)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .is_some_and(|v| v.to_str().unwrap().starts_with("attachment")));

    let text = body_text(response).await;
    assert!(text.starts_with("Tea party\r\n"));
    assert!(text.contains("ALICE:\r\n  More tea?"));
    assert!(text.contains("(( OOC: brb ))"));

    let text = body_text(
        app.get(&format!("/api/rp/{}/download.txt?includeOOC=false", room.rp_code)).await,
    )
    .await;
    assert!(!text.contains("OOC"));
    assert!(text.contains("The kettle whistles."));
}
