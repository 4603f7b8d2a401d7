//! End-to-end tests for the WebSocket relay.

mod helpers;

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: SocketAddr) -> Client {
    let (ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("WebSocket handshake failed");
    ws
}

async fn emit(ws: &mut Client, event: &str, data: Value) {
    let frame = json!({ "event": event, "data": data }).to_string();
    ws.send(Message::text(frame)).await.unwrap();
}

/// Next relay event, skipping transport frames.
async fn next_event(ws: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for an event")
            .expect("connection closed")
            .expect("read error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Read until an event with `name` arrives and return its data.
async fn expect_event(ws: &mut Client, name: &str) -> Value {
    loop {
        let event = next_event(ws).await;
        if event["event"] == name {
            return event["data"].clone();
        }
    }
}

#[tokio::test]
async fn test_alice_and_bob() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn_server().await;

    let mut alice = connect(addr).await;
    emit(&mut alice, "user-join", json!({"id": "1", "name": "Alice"})).await;
    let list = expect_event(&mut alice, "users-list").await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], "1");
    assert_eq!(list[0]["name"], "Alice");
    assert!(list[0]["socketId"].is_string());

    let mut bob = connect(addr).await;
    emit(&mut bob, "user-join", json!({"id": "2", "name": "Bob"})).await;

    let joined = expect_event(&mut alice, "user-connected").await;
    assert_eq!(joined["id"], "2");
    assert_eq!(joined["name"], "Bob");
    assert!(joined["connectedAt"].is_string());

    let list = expect_event(&mut alice, "users-list").await;
    assert_eq!(list.as_array().unwrap().len(), 2);
    let first_for_bob = next_event(&mut bob).await;
    assert_eq!(first_for_bob["event"], "users-list");
    assert_eq!(first_for_bob["data"][1]["name"], "Bob");

    emit(&mut alice, "send-message", json!({"content": "Hello", "userId": "999"})).await;
    for ws in [&mut alice, &mut bob] {
        let msg = expect_event(ws, "new-message").await;
        assert_eq!(msg["userId"], "1");
        assert_eq!(msg["userName"], "Alice");
        assert_eq!(msg["content"], "Hello");
        assert_eq!(msg["type"], "text");
        assert!(msg["id"].is_string());
    }

    emit(&mut bob, "data-update", json!({"doc": 7})).await;
    let changed = expect_event(&mut alice, "data-changed").await;
    assert_eq!(changed, json!({"doc": 7}));

    emit(
        &mut alice,
        "send-notification",
        json!({"targetUserId": "2", "title": "ping"}),
    )
    .await;
    let note = expect_event(&mut bob, "notification").await;
    assert_eq!(note, json!({"targetUserId": "2", "title": "ping"}));

    let users = app.request("GET", "/api/users", None).await;
    assert_eq!(users.body["count"], 2);

    alice.close(None).await.unwrap();

    let left = expect_event(&mut bob, "user-disconnected").await;
    assert_eq!(left["id"], "1");
    assert_eq!(left["name"], "Alice");
    assert!(left["disconnectedAt"].is_string());
    let list = expect_event(&mut bob, "users-list").await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Bob");
}

#[tokio::test]
async fn test_message_before_join_is_dropped() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn_server().await;

    let mut carol = connect(addr).await;
    emit(&mut carol, "send-message", json!({"content": "too early"})).await;
    emit(&mut carol, "user-join", json!({"id": "3", "name": "Carol"})).await;

    let first = next_event(&mut carol).await;
    assert_eq!(first["event"], "users-list");

    let stats = app.request("GET", "/api/stats", None).await;
    assert_eq!(stats.body["messagesDroppedNoPresence"], 1);
}

#[tokio::test]
async fn test_garbage_frames_keep_connection_open() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn_server().await;

    let mut dave = connect(addr).await;
    dave.send(Message::text("not json")).await.unwrap();
    emit(&mut dave, "no-such-event", json!({})).await;
    emit(&mut dave, "user-join", json!({"id": "4", "name": "Dave"})).await;

    let list = expect_event(&mut dave, "users-list").await;
    assert_eq!(list[0]["name"], "Dave");
}

#[tokio::test]
async fn test_untargeted_notification_reaches_sender() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn_server().await;

    let mut erin = connect(addr).await;
    emit(&mut erin, "send-notification", json!({"text": "all hands"})).await;

    let note = expect_event(&mut erin, "notification").await;
    assert_eq!(note["text"], "all hands");
}

#[tokio::test]
async fn test_non_object_message_is_broadcast() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn_server().await;

    let mut frank = connect(addr).await;
    emit(&mut frank, "user-join", json!({"id": 6, "name": "Frank"})).await;
    let list = expect_event(&mut frank, "users-list").await;
    assert_eq!(list[0]["id"], json!(6));

    emit(&mut frank, "send-message", json!("hi")).await;
    let msg = expect_event(&mut frank, "new-message").await;
    assert_eq!(msg["userId"], json!(6));
    assert_eq!(msg["content"], Value::Null);
    assert_eq!(msg["type"], "text");
}
