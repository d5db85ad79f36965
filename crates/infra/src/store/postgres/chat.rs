use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{ChatMessageRow, ChatRoomRow};
use crate::pagination::LimitOffset;
use crate::store::{ChatStore, NewChatMessage, NewChatRoom, StoreResult};

use super::PgStore;

const ROOM_COLUMNS: &str = "id, name, room_type, state, created_at";
const MESSAGE_COLUMNS: &str = "id, room_id, user_id, user_name, content, created_at";

#[async_trait]
impl ChatStore for PgStore {
    async fn insert_room(&self, room: NewChatRoom) -> StoreResult<ChatRoomRow> {
        let row = sqlx::query_as::<_, ChatRoomRow>(&format!(
            r#"
            INSERT INTO chat_rooms (id, name, room_type, state)
            VALUES ($1, $2, $3, $4)
            RETURNING {ROOM_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&room.name)
        .bind(&room.room_type)
        .bind(&room.state)
        .fetch_one(self.pool())
        .await?;

        Ok(row)
    }

    async fn get_room(&self, id: Uuid) -> StoreResult<Option<ChatRoomRow>> {
        let row = sqlx::query_as::<_, ChatRoomRow>(&format!(
            "SELECT {ROOM_COLUMNS} FROM chat_rooms WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    async fn list_rooms(&self) -> StoreResult<Vec<ChatRoomRow>> {
        // GLOBAL sorts ahead of STATE, then alphabetical.
        let rows = sqlx::query_as::<_, ChatRoomRow>(&format!(
            "SELECT {ROOM_COLUMNS} FROM chat_rooms ORDER BY room_type ASC, name ASC"
        ))
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    async fn insert_message(&self, message: NewChatMessage) -> StoreResult<ChatMessageRow> {
        let row = sqlx::query_as::<_, ChatMessageRow>(&format!(
            r#"
            INSERT INTO chat_messages (id, room_id, user_id, user_name, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(message.room_id)
        .bind(message.user_id)
        .bind(&message.user_name)
        .bind(&message.content)
        .fetch_one(self.pool())
        .await?;

        Ok(row)
    }

    async fn list_messages(
        &self,
        room_id: Uuid,
        page: Option<LimitOffset>,
    ) -> StoreResult<Vec<ChatMessageRow>> {
        let page = page.unwrap_or_default();

        let rows = sqlx::query_as::<_, ChatMessageRow>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM chat_messages
            WHERE room_id = $1
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(room_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }
}
