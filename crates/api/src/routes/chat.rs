use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use infra::models::{ChatMessageRow, ChatRoomRow};
use infra::pagination::LimitOffset;
use infra::store::{ChatStore, NewChatMessage};

use crate::auth::{permissions, Claims};
use crate::chat::events::ServerEvent;
use crate::chat::validate_message_content;
use crate::error::AppError;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
}

pub async fn list_rooms(State(state): State<AppState>) -> ApiResult<Vec<ChatRoomRow>> {
    let rooms = state.store.list_rooms().await?;
    Ok(ApiResponse::Ok(rooms))
}

pub async fn room_messages(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
    Query(query): Query<MessagesQuery>,
) -> ApiResult<Vec<ChatMessageRow>> {
    state
        .store
        .get_room(room_id)
        .await?
        .ok_or_else(|| AppError::NotFound("room not found".to_string()))?;

    let messages = state
        .store
        .list_messages(room_id, Some(LimitOffset::from_page(query.page, query.limit)))
        .await?;

    Ok(ApiResponse::Ok(messages))
}

/// REST companion to the socket path: same validation, same persistence,
/// and the stored record still fans out to connected members.
pub async fn post_message(
    State(state): State<AppState>,
    claims: Claims,
    Path(room_id): Path<Uuid>,
    Json(body): Json<PostMessageRequest>,
) -> ApiResult<ChatMessageRow> {
    let user = permissions::current_user(&state, &claims).await?;

    state
        .store
        .get_room(room_id)
        .await?
        .ok_or_else(|| AppError::NotFound("room not found".to_string()))?;

    let content = validate_message_content(&body.content).map_err(AppError::Validation)?;

    let message = state
        .store
        .insert_message(NewChatMessage {
            room_id,
            user_id: Some(user.id),
            user_name: user.name.clone(),
            content,
        })
        .await?;

    state
        .chat
        .publish(
            room_id,
            ServerEvent::NewMessage {
                message: message.clone(),
            },
        )
        .await;

    Ok(ApiResponse::Created(message))
}
