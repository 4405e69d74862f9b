//! Message API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{body_json, TestApp};

#[tokio::test]
async fn test_chara_message_with_existing_character_is_accepted() {
    let app = TestApp::new().await;
    let room = app.create_room("Tea party").await;
    let chara_id = app.create_character(&room, "Aria", "#ff00aa").await;

    let response = app
        .post_json_auth(
            &format!("/api/rp/{}/msgs", room.rp_code),
            &json!({ "type": "chara", "content": "Hello", "charaId": chara_id }).to_string(),
            &room.token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let msg = body_json(response).await;
    assert_eq!(msg["type"], "chara");
    assert_eq!(msg["content"], "Hello");
    assert_eq!(msg["charaId"], chara_id.as_str());
    assert_eq!(msg["revision"], 0);
    assert_eq!(msg["userid"], room.userid.as_str());
    assert!(msg.get("url").is_none());

    let snapshot = body_json(app.get(&format!("/api/rp/{}", room.rp_code)).await).await;
    assert_eq!(snapshot["msgs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_chara_message_with_dangling_reference_is_rejected() {
    let app = TestApp::new().await;
    let room = app.create_room("Tea party").await;
    app.create_character(&room, "Aria", "#ff00aa").await;

    let response = app
        .post_json_auth(
            &format!("/api/rp/{}/msgs", room.rp_code),
            r#"{"type":"chara","content":"Hello","charaId":"c2"}"#,
            &room.token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Msg with invalid chara id: c2");

    let snapshot = body_json(app.get(&format!("/api/rp/{}", room.rp_code)).await).await;
    assert_eq!(snapshot["msgs"], json!([]));
    assert_eq!(snapshot["charas"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_character_of_another_room_does_not_satisfy_reference() {
    let app = TestApp::new().await;
    let first = app.create_room("First").await;
    let second = app.create_room("Second").await;
    let chara_id = app.create_character(&first, "Aria", "#ff00aa").await;

    let response = app
        .post_json_auth(
            &format!("/api/rp/{}/msgs", second.rp_code),
            &json!({ "type": "chara", "content": "Hello", "charaId": chara_id }).to_string(),
            &second.token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_invalid_messages_report_the_failing_field() {
    let app = TestApp::new().await;
    let room = app.create_room("Tea party").await;
    let uri = format!("/api/rp/{}/msgs", room.rp_code);

    let cases = [
        (r#"{"type":"narrator","content":""}"#, "Msg: content is empty"),
        (r#"{"type":"shout","content":"hi"}"#, "Msg: invalid type 'shout'"),
        (r#"{"type":"image","url":"ftp://x"}"#, "Msg: url is invalid"),
        (r#"{"type":"ooc","content":"hi","charaId":"c1"}"#, "Msg: non-chara msg should not have 'charaId'"),
    ];
    for (payload, expected) in cases {
        let response = app.post_json_auth(&uri, payload, &room.token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", payload);
        assert_eq!(body_json(response).await["message"], expected);
    }
}

#[tokio::test]
async fn test_malformed_message_is_a_decode_error() {
    let app = TestApp::new().await;
    let room = app.create_room("Tea party").await;

    let response = app
        .post_json_auth(&format!("/api/rp/{}/msgs", room.rp_code), "{\"type\":", &room.token)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], 10001);
}

#[tokio::test]
async fn test_messages_keep_insertion_order() {
    let app = TestApp::new().await;
    let room = app.create_room("Tea party").await;
    let uri = format!("/api/rp/{}/msgs", room.rp_code);

    for content in ["one", "two", "three"] {
        let response = app
            .post_json_auth(&uri, &json!({ "type": "narrator", "content": content }).to_string(), &room.token)
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let snapshot = body_json(app.get(&format!("/api/rp/{}", room.rp_code)).await).await;
    let contents: Vec<_> = snapshot["msgs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(contents, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn test_edit_message_and_history() {
    let app = TestApp::new().await;
    let room = app.create_room("Tea party").await;

    let created = body_json(
        app.post_json_auth(
            &format!("/api/rp/{}/msgs", room.rp_code),
            r#"{"type":"ooc","content":"brb"}"#,
            &room.token,
        )
        .await,
    )
    .await;
    let id = created["_id"].as_str().unwrap();
    let uri = format!("/api/rp/{}/msgs/{}", room.rp_code, id);

    let response = app.put_json_auth(&uri, r#"{"type":"ooc","content":"back"}"#, &room.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let edited = body_json(response).await;
    assert_eq!(edited["_id"], id);
    assert_eq!(edited["revision"], 1);
    assert_eq!(edited["content"], "back");

    let history = body_json(app.get(&format!("{}/history", uri)).await).await;
    let revisions: Vec<_> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|d| (d["revision"].as_i64().unwrap(), d["content"].as_str().unwrap().to_string()))
        .collect();
    assert_eq!(revisions, vec![(0, "brb".to_string()), (1, "back".to_string())]);

    let snapshot = body_json(app.get(&format!("/api/rp/{}", room.rp_code)).await).await;
    assert_eq!(snapshot["msgs"][0]["content"], "back");
}

#[tokio::test]
async fn test_edit_rules() {
    let app = TestApp::new().await;
    let room = app.create_room("Tea party").await;

    let created = body_json(
        app.post_json_auth(
            &format!("/api/rp/{}/msgs", room.rp_code),
            r#"{"type":"ooc","content":"brb"}"#,
            &room.token,
        )
        .await,
    )
    .await;
    let uri = format!("/api/rp/{}/msgs/{}", room.rp_code, created["_id"].as_str().unwrap());

    // Another user
    let (_, other_token) = app.create_user().await;
    let response = app.put_json_auth(&uri, r#"{"type":"ooc","content":"mine"}"#, &other_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Type change
    let response = app.put_json_auth(&uri, r#"{"type":"narrator","content":"x"}"#, &room.token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Invalid body
    let response = app.put_json_auth(&uri, r#"{"type":"ooc","content":""}"#, &room.token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown id
    let response = app
        .put_json_auth(
            &format!("/api/rp/{}/msgs/nope", room.rp_code),
            r#"{"type":"ooc","content":"x"}"#,
            &room.token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let history = app.get(&format!("{}/history", uri)).await;
    assert_eq!(body_json(history).await.as_array().unwrap().len(), 1);
}
