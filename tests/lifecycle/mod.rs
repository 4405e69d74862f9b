//! Server Lifecycle Tests
//!
//! Start and stop a full server on ephemeral ports and talk to it over TCP.

use std::net::SocketAddr;
use std::time::Duration;

use futures::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;

use rp_server::config::Settings;
use rp_server::infrastructure::database::{Store, STORE_FILE};
use rp_server::startup::{LifecycleError, LifecycleState, Server};

fn loopback(addr: SocketAddr) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], addr.port()))
}

async fn get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(loopback(addr)).await.expect("connect");
    let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n", path);
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

async fn post_json(addr: SocketAddr, path: &str, body: &str) -> serde_json::Value {
    let mut stream = TcpStream::connect(loopback(addr)).await.expect("connect");
    let request = format!(
        "POST {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        path,
        body.len(),
        body
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    let (_, body) = response.split_once("\r\n\r\n").expect("response body");
    serde_json::from_str(body).unwrap()
}

/// Wait until nothing accepts connections on `addr` any more.
async fn refuses_connections(addr: SocketAddr) -> bool {
    for _ in 0..50 {
        if TcpStream::connect(loopback(addr)).await.is_err() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn test_start_serve_and_stop() {
    let dir = tempfile::tempdir().unwrap();
    let server = Server::start(Settings::ephemeral(dir.path())).await.expect("start");
    assert_eq!(server.state(), LifecycleState::Running);

    let client = server.client_addr();
    let admin = server.admin_addr();
    assert_ne!(client.port(), 0);
    assert_ne!(admin.port(), 0);
    assert!(admin.ip().is_loopback());

    assert!(get(client, "/health").await.starts_with("HTTP/1.1 200"));
    let status = get(admin, "/status").await;
    assert!(status.starts_with("HTTP/1.1 200"));
    assert!(status.contains("\"state\":\"running\""));

    let mut states = server.subscribe_state();
    server.stop().await.expect("stop");
    assert_eq!(*states.borrow_and_update(), LifecycleState::Stopped);

    assert!(TcpStream::connect(loopback(client)).await.is_err());
    assert!(TcpStream::connect(loopback(admin)).await.is_err());

    assert!(dir.path().join(STORE_FILE).exists());
    let store = Store::open(dir.path()).await.expect("store reopens");
    store.close().await.unwrap();
}

#[tokio::test]
async fn test_data_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let server = Server::start(Settings::ephemeral(dir.path())).await.unwrap();
    let status = get(server.admin_addr(), "/status").await;
    assert!(status.contains("\"rooms\":0"));
    server.stop().await.unwrap();

    let store = Store::open(dir.path()).await.unwrap();
    sqlx::query("INSERT INTO rooms (rpid, title, description, read_code, created_at) VALUES ('r1', 't', NULL, 'rc', '2024-01-01T00:00:00Z')")
        .execute(store.pool())
        .await
        .unwrap();
    store.close().await.unwrap();

    let server = Server::start(Settings::ephemeral(dir.path())).await.unwrap();
    let status = get(server.admin_addr(), "/status").await;
    assert!(status.contains("\"rooms\":1"));
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_unusable_data_dir_fails_start() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, b"x").unwrap();

    let result = Server::start(Settings::ephemeral(blocker.join("data"))).await;
    assert!(matches!(result, Err(LifecycleError::StoreOpen { .. })));
}

#[tokio::test]
async fn test_occupied_admin_port_fails_start() {
    let dir = tempfile::tempdir().unwrap();
    let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();

    let mut settings = Settings::ephemeral(dir.path());
    settings.admin_port = occupied.local_addr().unwrap().port();

    let result = Server::start(settings).await;
    assert!(matches!(result, Err(LifecycleError::Bind { listener: "admin", .. })));

    // Store was released again
    let store = Store::open(dir.path()).await.expect("store reopens");
    store.close().await.unwrap();
}

#[tokio::test]
async fn test_stop_closes_open_chat_streams() {
    let dir = tempfile::tempdir().unwrap();
    let server = Server::start(Settings::ephemeral(dir.path())).await.unwrap();
    let client = server.client_addr();
    let admin = server.admin_addr();

    let room = post_json(client, "/api/rp", r#"{"title":"Tea party"}"#).await;
    let url = format!(
        "ws://{}/api/rp/{}/chat",
        loopback(client),
        room["rpCode"].as_str().unwrap()
    );
    let (mut stream, _) = tokio_tungstenite::connect_async(url).await.expect("websocket");

    let init = match stream.next().await {
        Some(Ok(Message::Text(text))) => serde_json::from_str::<serde_json::Value>(&text).unwrap(),
        other => panic!("expected init frame, got {:?}", other),
    };
    assert_eq!(init["type"], "init");
    assert_eq!(init["data"]["title"], "Tea party");

    tokio::time::timeout(Duration::from_secs(10), server.stop())
        .await
        .expect("stop returns while a stream is open")
        .expect("clean stop");

    match stream.next().await {
        Some(Ok(Message::Close(Some(frame)))) => assert_eq!(frame.code, CloseCode::Away),
        other => panic!("expected close frame, got {:?}", other),
    }
    assert!(refuses_connections(client).await);
    assert!(refuses_connections(admin).await);
}

#[tokio::test]
async fn test_stop_aborts_listener_that_does_not_drain() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::ephemeral(dir.path());
    settings.shutdown_timeout_ms = 200;

    let server = Server::start(settings).await.unwrap();
    let client = server.client_addr();
    let admin = server.admin_addr();
    let mut states = server.subscribe_state();

    // Request head sent, body never completed
    let mut stalled = TcpStream::connect(loopback(client)).await.unwrap();
    stalled
        .write_all(b"POST /api/rp HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: 64\r\n\r\n{\"title\":")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let result = tokio::time::timeout(Duration::from_secs(10), server.stop())
        .await
        .expect("stop is bounded");
    assert!(
        matches!(result, Err(LifecycleError::ShutdownTimeout { listener: "client", .. })),
        "{:?}",
        result
    );

    assert_eq!(*states.borrow_and_update(), LifecycleState::Stopped);
    assert!(refuses_connections(client).await);
    assert!(refuses_connections(admin).await);

    // The store was still closed cleanly
    let store = Store::open(dir.path()).await.expect("store reopens");
    store.close().await.unwrap();
    drop(stalled);
}
