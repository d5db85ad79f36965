use serde::{Deserialize, Serialize};
use uuid::Uuid;

use infra::models::{ChatMessageRow, UserRow};

/// Public identity attached to presence and typing events.
#[derive(Debug, Clone, Serialize)]
pub struct ChatUser {
    pub id: Uuid,
    pub name: String,
}

impl From<&UserRow> for ChatUser {
    fn from(user: &UserRow) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
        }
    }
}

/// Messages received over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinRoom { room_id: Uuid },
    LeaveRoom { room_id: Uuid },
    SendMessage { room_id: Uuid, content: String },
    TypingStart { room_id: Uuid },
    TypingStop { room_id: Uuid },
}

/// Messages sent to the socket. `NewMessage` carries the persisted record,
/// so every client renders the same server-assigned id and timestamp.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    JoinedRoom { room_id: Uuid },
    NewMessage { message: ChatMessageRow },
    UserJoined { room_id: Uuid, user: ChatUser },
    UserLeft { room_id: Uuid, user: ChatUser },
    TypingStart { room_id: Uuid, user: ChatUser },
    TypingStop { room_id: Uuid, user: ChatUser },
    Error { message: String },
}

impl ServerEvent {
    /// The user the broadcast originated from, where there is one.
    pub fn origin(&self) -> Option<Uuid> {
        match self {
            ServerEvent::NewMessage { message } => message.user_id,
            ServerEvent::UserJoined { user, .. }
            | ServerEvent::UserLeft { user, .. }
            | ServerEvent::TypingStart { user, .. }
            | ServerEvent::TypingStop { user, .. } => Some(user.id),
            ServerEvent::JoinedRoom { .. } | ServerEvent::Error { .. } => None,
        }
    }

    /// Whether the originating user should receive their own broadcast.
    /// Chat messages echo back (canonical record); presence and typing
    /// notifications only go to the other members.
    pub fn echoes_to_origin(&self) -> bool {
        matches!(self, ServerEvent::NewMessage { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_events_use_kebab_case_tags() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"type":"send-message","room_id":"00000000-0000-0000-0000-000000000000","content":"hi"}"#,
        )
        .unwrap();
        assert!(matches!(event, ClientEvent::SendMessage { .. }));

        let event: ClientEvent = serde_json::from_str(
            r#"{"type":"typing-start","room_id":"00000000-0000-0000-0000-000000000000"}"#,
        )
        .unwrap();
        assert!(matches!(event, ClientEvent::TypingStart { .. }));
    }

    #[test]
    fn server_events_tag_matches_wire_names() {
        let json = serde_json::to_value(ServerEvent::Error {
            message: "oops".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "error");

        let json = serde_json::to_value(ServerEvent::JoinedRoom {
            room_id: Uuid::nil(),
        })
        .unwrap();
        assert_eq!(json["type"], "joined-room");
    }
}
