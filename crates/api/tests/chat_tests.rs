mod common;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use common::*;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};

use api::AppState;
use infra::store::ChatStore;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Serve the app on an ephemeral port for real-socket tests.
async fn start_server() -> (String, AppState) {
    let (app, state) = test_app();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr.to_string(), state)
}

async fn connect(addr: &str, token: &str) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{addr}/chat/ws?token={token}"))
        .await
        .expect("websocket handshake failed");
    ws
}

async fn send_event(ws: &mut WsClient, event: Value) {
    ws.send(Message::Text(event.to_string().into()))
        .await
        .expect("failed to send event");
}

async fn next_event(ws: &mut WsClient) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("socket closed")
            .expect("socket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn expect_silence(ws: &mut WsClient) {
    let result = timeout(Duration::from_millis(300), ws.next()).await;
    assert!(result.is_err(), "expected no event, got {result:?}");
}

#[tokio::test]
async fn rest_rooms_and_history() {
    let (app, state) = test_app();
    let (token, _) = register_user(&app, "chatter@example.com", "Chatter").await;
    let room_id = create_room(&state, "General").await;

    let (status, body) = request(&app, Method::GET, "/chat/rooms", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Posting requires auth; history is public.
    let (status, _) = request(
        &app,
        Method::POST,
        &format!("/chat/rooms/{room_id}/messages"),
        None,
        Some(json!({ "content": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = request(
        &app,
        Method::POST,
        &format!("/chat/rooms/{room_id}/messages"),
        Some(&token),
        Some(json!({ "content": "hello room" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["created_at"].is_string());
    assert_eq!(body["data"]["user_name"], "Chatter");

    let (status, body) = request(
        &app,
        Method::GET,
        &format!("/chat/rooms/{room_id}/messages"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["data"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "hello room");

    // Validation matches the socket path.
    for content in ["", "   ", &"a".repeat(1001)] {
        let (status, body) = request(
            &app,
            Method::POST,
            &format!("/chat/rooms/{room_id}/messages"),
            Some(&token),
            Some(json!({ "content": content })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    let missing = uuid::Uuid::new_v4();
    let (status, _) = request(
        &app,
        Method::GET,
        &format!("/chat/rooms/{missing}/messages"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn socket_rejects_bad_tokens() {
    let (addr, _state) = start_server().await;

    let result = connect_async(format!("ws://{addr}/chat/ws?token=garbage")).await;
    assert!(result.is_err(), "handshake should fail without a valid token");
}

#[tokio::test]
async fn room_broadcast_reaches_all_members() {
    let (addr, state) = start_server().await;
    let (token_a, user_a) = create_user_with_token(&state, "alice@example.com", "Alice").await;
    let (token_b, _) = create_user_with_token(&state, "bob@example.com", "Bob").await;
    let room_id = create_room(&state, "General").await;

    let mut a = connect(&addr, &token_a).await;
    send_event(&mut a, json!({ "type": "join-room", "room_id": room_id })).await;
    let event = next_event(&mut a).await;
    assert_eq!(event["type"], "joined-room");

    let mut b = connect(&addr, &token_b).await;
    send_event(&mut b, json!({ "type": "join-room", "room_id": room_id })).await;
    let event = next_event(&mut b).await;
    assert_eq!(event["type"], "joined-room");

    // A, already in the room, sees B arrive; B does not see their own join.
    let event = next_event(&mut a).await;
    assert_eq!(event["type"], "user-joined");
    assert_eq!(event["user"]["name"], "Bob");

    // A message lands on every member, sender included, as the persisted
    // record.
    send_event(
        &mut a,
        json!({ "type": "send-message", "room_id": room_id, "content": "hello" }),
    )
    .await;

    let to_a = next_event(&mut a).await;
    let to_b = next_event(&mut b).await;
    for event in [&to_a, &to_b] {
        assert_eq!(event["type"], "new-message");
        assert_eq!(event["message"]["content"], "hello");
        assert_eq!(event["message"]["user_id"], user_a.to_string());
        assert!(event["message"]["id"].is_string());
        assert!(event["message"]["created_at"].is_string());
    }
    assert_eq!(to_a["message"]["id"], to_b["message"]["id"]);

    // The record was persisted before the broadcast.
    let history = state
        .store
        .list_messages(room_id, None)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].content, "hello");
}

#[tokio::test]
async fn oversized_message_errors_only_to_sender() {
    let (addr, state) = start_server().await;
    let (token_a, _) = create_user_with_token(&state, "alice@example.com", "Alice").await;
    let (token_b, _) = create_user_with_token(&state, "bob@example.com", "Bob").await;
    let room_id = create_room(&state, "General").await;

    let mut a = connect(&addr, &token_a).await;
    send_event(&mut a, json!({ "type": "join-room", "room_id": room_id })).await;
    assert_eq!(next_event(&mut a).await["type"], "joined-room");

    let mut b = connect(&addr, &token_b).await;
    send_event(&mut b, json!({ "type": "join-room", "room_id": room_id })).await;
    assert_eq!(next_event(&mut b).await["type"], "joined-room");
    assert_eq!(next_event(&mut a).await["type"], "user-joined");

    let oversized = "a".repeat(1001);
    send_event(
        &mut a,
        json!({ "type": "send-message", "room_id": room_id, "content": oversized }),
    )
    .await;

    let event = next_event(&mut a).await;
    assert_eq!(event["type"], "error");

    // Nothing was broadcast and nothing was persisted.
    expect_silence(&mut b).await;
    assert!(state.store.list_messages(room_id, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn typing_and_presence_events() {
    let (addr, state) = start_server().await;
    let (token_a, _) = create_user_with_token(&state, "alice@example.com", "Alice").await;
    let (token_b, _) = create_user_with_token(&state, "bob@example.com", "Bob").await;
    let room_id = create_room(&state, "General").await;

    let mut a = connect(&addr, &token_a).await;
    send_event(&mut a, json!({ "type": "join-room", "room_id": room_id })).await;
    assert_eq!(next_event(&mut a).await["type"], "joined-room");

    let mut b = connect(&addr, &token_b).await;
    send_event(&mut b, json!({ "type": "join-room", "room_id": room_id })).await;
    assert_eq!(next_event(&mut b).await["type"], "joined-room");
    assert_eq!(next_event(&mut a).await["type"], "user-joined");

    // Typing indicators reach the other members only.
    send_event(&mut b, json!({ "type": "typing-start", "room_id": room_id })).await;
    let event = next_event(&mut a).await;
    assert_eq!(event["type"], "typing-start");
    assert_eq!(event["user"]["name"], "Bob");
    expect_silence(&mut b).await;

    // Disconnecting leaves the room.
    drop(b);
    let event = next_event(&mut a).await;
    assert_eq!(event["type"], "user-left");
    assert_eq!(event["user"]["name"], "Bob");
}

#[tokio::test]
async fn sending_requires_membership_and_known_room() {
    let (addr, state) = start_server().await;
    let (token, _) = create_user_with_token(&state, "solo@example.com", "Solo").await;
    let room_id = create_room(&state, "General").await;

    let mut ws = connect(&addr, &token).await;

    // Not joined yet.
    send_event(
        &mut ws,
        json!({ "type": "send-message", "room_id": room_id, "content": "hi" }),
    )
    .await;
    assert_eq!(next_event(&mut ws).await["type"], "error");

    // Unknown room.
    let missing = uuid::Uuid::new_v4();
    send_event(&mut ws, json!({ "type": "join-room", "room_id": missing })).await;
    assert_eq!(next_event(&mut ws).await["type"], "error");

    // Garbage payloads answer with an error event rather than dropping the
    // connection.
    ws.send(Message::Text("not json".to_string().into()))
        .await
        .unwrap();
    assert_eq!(next_event(&mut ws).await["type"], "error");
}
