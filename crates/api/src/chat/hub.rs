use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::chat::events::ServerEvent;

const ROOM_CHANNEL_CAPACITY: usize = 256;

/// Room-scoped fan-out. One broadcast channel per room, created lazily on
/// first subscribe and held in shared state; membership is nothing more
/// than holding a receiver, so it dies with the connection.
#[derive(Clone, Default)]
pub struct ChatHub {
    rooms: Arc<RwLock<HashMap<Uuid, broadcast::Sender<ServerEvent>>>>,
}

impl ChatHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, room_id: Uuid) -> broadcast::Receiver<ServerEvent> {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id)
            .or_insert_with(|| broadcast::channel(ROOM_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Delivery to a room nobody is in is a no-op, not an error.
    pub async fn publish(&self, room_id: Uuid, event: ServerEvent) {
        let rooms = self.rooms.read().await;
        if let Some(sender) = rooms.get(&room_id) {
            let _ = sender.send(event);
        }
    }
}
