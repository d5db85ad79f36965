//! WebSocket endpoint for room-scoped chat.
//!
//! Clients connect via `GET /chat/ws?token=<jwt>`; the token must map to an
//! existing user or the connection is refused before the upgrade. Once
//! connected, a client joins rooms, sends messages, and receives the events
//! described in [`crate::chat::events`]. Message sends are persisted first;
//! the broadcast carries the stored record so every member, including the
//! sender, renders the same id and timestamp.

use std::collections::HashMap;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use infra::models::UserRow;
use infra::store::{ChatStore, NewChatMessage, UserStore};

use crate::chat::events::{ChatUser, ClientEvent, ServerEvent};
use crate::chat::validate_message_content;
use crate::state::AppState;

const OUTBOUND_BUFFER: usize = 64;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: String,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let claims = match state.jwt_service().verify_token(&query.token) {
        Ok(claims) => claims,
        Err(_) => return (StatusCode::UNAUTHORIZED, "invalid token").into_response(),
    };

    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(_) => return (StatusCode::UNAUTHORIZED, "invalid token").into_response(),
    };

    let user = match state.store.get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return (StatusCode::UNAUTHORIZED, "unknown user").into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "failed to resolve chat user");
            return (StatusCode::INTERNAL_SERVER_ERROR, "store unavailable").into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, user, state))
}

async fn handle_socket(socket: WebSocket, user: UserRow, state: AppState) {
    let (sender, mut receiver) = socket.split();

    tracing::info!(user = %user.id, "chat socket connected");

    // All outbound traffic (room broadcasts and direct error events) funnels
    // through one channel so only one task writes to the sink.
    let (out_tx, out_rx) = mpsc::channel::<ServerEvent>(OUTBOUND_BUFFER);
    let send_task = tokio::spawn(pump_outbound(out_rx, sender));

    // room id -> forwarding task for that room's broadcast subscription
    let mut joined: HashMap<Uuid, JoinHandle<()>> = HashMap::new();

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(text.as_str()) {
                Ok(event) => {
                    handle_client_event(event, &user, &state, &out_tx, &mut joined).await;
                }
                Err(_) => {
                    send_error(&out_tx, "invalid message format").await;
                }
            },
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::debug!(user = %user.id, error = %e, "chat socket error");
                break;
            }
            _ => {}
        }
    }

    // Connection-scoped membership: leaving happens implicitly on disconnect.
    for (room_id, task) in joined.drain() {
        task.abort();
        state
            .chat
            .publish(
                room_id,
                ServerEvent::UserLeft {
                    room_id,
                    user: ChatUser::from(&user),
                },
            )
            .await;
    }

    send_task.abort();
    tracing::info!(user = %user.id, "chat socket disconnected");
}

async fn pump_outbound(
    mut out_rx: mpsc::Receiver<ServerEvent>,
    mut sender: SplitSink<WebSocket, Message>,
) {
    while let Some(event) = out_rx.recv().await {
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize chat event");
                continue;
            }
        };

        if sender.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}

async fn handle_client_event(
    event: ClientEvent,
    user: &UserRow,
    state: &AppState,
    out_tx: &mpsc::Sender<ServerEvent>,
    joined: &mut HashMap<Uuid, JoinHandle<()>>,
) {
    match event {
        ClientEvent::JoinRoom { room_id } => {
            if joined.contains_key(&room_id) {
                send_error(out_tx, "already in room").await;
                return;
            }

            match state.store.get_room(room_id).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    send_error(out_tx, "room not found").await;
                    return;
                }
                Err(e) => {
                    tracing::error!(error = ?e, "failed to look up chat room");
                    send_error(out_tx, "internal server error").await;
                    return;
                }
            }

            let rx = state.chat.subscribe(room_id).await;
            joined.insert(room_id, tokio::spawn(forward_room(rx, out_tx.clone(), user.id)));

            let _ = out_tx.send(ServerEvent::JoinedRoom { room_id }).await;
            state
                .chat
                .publish(
                    room_id,
                    ServerEvent::UserJoined {
                        room_id,
                        user: ChatUser::from(user),
                    },
                )
                .await;
        }

        ClientEvent::LeaveRoom { room_id } => {
            let Some(task) = joined.remove(&room_id) else {
                send_error(out_tx, "not in room").await;
                return;
            };
            task.abort();

            state
                .chat
                .publish(
                    room_id,
                    ServerEvent::UserLeft {
                        room_id,
                        user: ChatUser::from(user),
                    },
                )
                .await;
        }

        ClientEvent::SendMessage { room_id, content } => {
            if !joined.contains_key(&room_id) {
                send_error(out_tx, "join the room before sending messages").await;
                return;
            }

            // Validation failures stay between the server and the sender.
            let content = match validate_message_content(&content) {
                Ok(content) => content,
                Err(reason) => {
                    send_error(out_tx, &reason).await;
                    return;
                }
            };

            let message = match state
                .store
                .insert_message(NewChatMessage {
                    room_id,
                    user_id: Some(user.id),
                    user_name: user.name.clone(),
                    content,
                })
                .await
            {
                Ok(message) => message,
                Err(e) => {
                    tracing::error!(error = ?e, "failed to persist chat message");
                    send_error(out_tx, "internal server error").await;
                    return;
                }
            };

            state
                .chat
                .publish(room_id, ServerEvent::NewMessage { message })
                .await;
        }

        ClientEvent::TypingStart { room_id } => {
            if joined.contains_key(&room_id) {
                state
                    .chat
                    .publish(
                        room_id,
                        ServerEvent::TypingStart {
                            room_id,
                            user: ChatUser::from(user),
                        },
                    )
                    .await;
            }
        }

        ClientEvent::TypingStop { room_id } => {
            if joined.contains_key(&room_id) {
                state
                    .chat
                    .publish(
                        room_id,
                        ServerEvent::TypingStop {
                            room_id,
                            user: ChatUser::from(user),
                        },
                    )
                    .await;
            }
        }
    }
}

/// Forward a room's broadcast stream to this connection, dropping the
/// events that should not echo back to their originator.
async fn forward_room(
    mut rx: broadcast::Receiver<ServerEvent>,
    out_tx: mpsc::Sender<ServerEvent>,
    me: Uuid,
) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if event.origin() == Some(me) && !event.echoes_to_origin() {
                    continue;
                }
                if out_tx.send(event).await.is_err() {
                    break;
                }
            }
            // A slow client that misses events keeps going from the
            // current position rather than tearing down the room.
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "chat subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn send_error(out_tx: &mpsc::Sender<ServerEvent>, message: &str) {
    let _ = out_tx
        .send(ServerEvent::Error {
            message: message.to_string(),
        })
        .await;
}
