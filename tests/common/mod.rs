//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::watch;
use tower::ServiceExt;

use rp_server::config::Settings;
use rp_server::infrastructure::database::Store;
use rp_server::presentation::http::{create_admin_router, create_router};
use rp_server::shared::fatal::FatalSignal;
use rp_server::startup::{AppState, LifecycleState};

/// Test application over a store in a temporary directory
pub struct TestApp {
    pub router: Router,
    pub admin: Router,
    pub state: AppState,
    _dir: TempDir,
}

/// A created room and a user allowed to write to it
pub struct TestRoom {
    pub rp_code: String,
    pub read_code: String,
    pub token: String,
    pub userid: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::open(dir.path()).await.expect("open store");
        let (_tx, lifecycle) = watch::channel(LifecycleState::Running);
        let state = AppState::new(Settings::ephemeral(dir.path()), store, FatalSignal::new(), lifecycle);

        Self {
            router: create_router(state.clone()),
            admin: create_admin_router(state.clone()),
            state,
            _dir: dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> Response {
        self.send(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Make a GET request to the admin router
    pub async fn get_admin(&self, uri: &str) -> Response {
        self.admin
            .clone()
            .oneshot(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, uri: &str, body: &str) -> Response {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Make an authenticated request with JSON body
    pub async fn send_json_auth(&self, method: &str, uri: &str, body: &str, token: &str) -> Response {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Make an authenticated POST request with JSON body
    pub async fn post_json_auth(&self, uri: &str, body: &str, token: &str) -> Response {
        self.send_json_auth("POST", uri, body, token).await
    }

    /// Make an authenticated PUT request with JSON body
    pub async fn put_json_auth(&self, uri: &str, body: &str, token: &str) -> Response {
        self.send_json_auth("PUT", uri, body, token).await
    }

    /// Issue an anonymous user, returning (userid, token)
    pub async fn create_user(&self) -> (String, String) {
        let response = self.post_json("/api/user", "").await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        (
            body["userid"].as_str().unwrap().to_string(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    /// Create a room and a user
    pub async fn create_room(&self, title: &str) -> TestRoom {
        let response = self
            .post_json("/api/rp", &serde_json::json!({ "title": title }).to_string())
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        let (userid, token) = self.create_user().await;

        TestRoom {
            rp_code: body["rpCode"].as_str().unwrap().to_string(),
            read_code: body["readCode"].as_str().unwrap().to_string(),
            token,
            userid,
        }
    }

    /// Add a character to a room, returning its id
    pub async fn create_character(&self, room: &TestRoom, name: &str, color: &str) -> String {
        let response = self
            .post_json_auth(
                &format!("/api/rp/{}/charas", room.rp_code),
                &serde_json::json!({ "name": name, "color": color }).to_string(),
                &room.token,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["_id"].as_str().unwrap().to_string()
    }
}

/// Read a response body as JSON
pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// Read a response body as text
pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
