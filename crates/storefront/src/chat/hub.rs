//! Cross-process chat message hub.
//!
//! Each server process keeps a `tokio::sync::broadcast` channel per chat
//! room for its local websocket subscribers. Because the storefront and the
//! admin panel are separate processes sharing one database, messages are
//! bridged between them over Postgres `LISTEN`/`NOTIFY` on a single channel:
//! publishing sends a `pg_notify`, and a background listener task fans every
//! notification out to the local subscribers of that room.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;

use mobigear_core::ChatRoomId;

use crate::models::chat::OutgoingChatMessage;

/// Postgres notification channel carrying chat messages.
const CHAT_CHANNEL: &str = "chat_events";

/// Buffered messages per room before slow subscribers start lagging.
const ROOM_BUFFER: usize = 64;

/// Delay before reconnecting a failed listener.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Notification payload: a room id plus the broadcast message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatEnvelope {
    pub room_id: i32,
    #[serde(flatten)]
    pub message: OutgoingChatMessage,
}

/// Chat message hub for one server process.
#[derive(Clone)]
pub struct ChatHub {
    inner: Arc<HubInner>,
}

struct HubInner {
    pool: PgPool,
    rooms: Mutex<HashMap<i32, broadcast::Sender<OutgoingChatMessage>>>,
}

impl ChatHub {
    /// Create a new hub over the shared database pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            inner: Arc::new(HubInner {
                pool,
                rooms: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Subscribe to a room's broadcast stream.
    ///
    /// # Panics
    ///
    /// Panics if the room registry lock is poisoned.
    #[must_use]
    pub fn subscribe(&self, room_id: ChatRoomId) -> broadcast::Receiver<OutgoingChatMessage> {
        let mut rooms = self.inner.rooms.lock().expect("room registry poisoned");
        rooms
            .entry(room_id.as_i32())
            .or_insert_with(|| broadcast::channel(ROOM_BUFFER).0)
            .subscribe()
    }

    /// Publish a message to every subscriber of a room, in this process and
    /// every other process listening on the database.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the notify query fails. Local subscribers
    /// still receive the message via the listener echo in that case only if
    /// the notify succeeded, so the caller should surface the error.
    pub async fn publish(
        &self,
        room_id: ChatRoomId,
        message: OutgoingChatMessage,
    ) -> Result<(), sqlx::Error> {
        let envelope = ChatEnvelope {
            room_id: room_id.as_i32(),
            message,
        };
        let payload = serde_json::to_string(&envelope)
            .map_err(|e| sqlx::Error::Protocol(format!("chat payload serialization: {e}")))?;

        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(CHAT_CHANNEL)
            .bind(payload)
            .execute(&self.inner.pool)
            .await?;

        Ok(())
    }

    /// Spawn the background task that listens for notifications and fans
    /// them out to local subscribers. Call once at startup.
    pub fn spawn_listener(&self) {
        let hub = self.clone();
        tokio::spawn(async move {
            loop {
                match hub.run_listener().await {
                    Ok(()) => break,
                    Err(e) => {
                        tracing::error!("Chat listener failed: {e}; reconnecting");
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        });
    }

    async fn run_listener(&self) -> Result<(), sqlx::Error> {
        let mut listener = PgListener::connect_with(&self.inner.pool).await?;
        listener.listen(CHAT_CHANNEL).await?;
        tracing::info!("Chat listener attached to '{CHAT_CHANNEL}'");

        loop {
            let notification = listener.recv().await?;
            match serde_json::from_str::<ChatEnvelope>(notification.payload()) {
                Ok(envelope) => self.dispatch_local(envelope.room_id, envelope.message),
                Err(e) => tracing::warn!("Dropping malformed chat notification: {e}"),
            }
        }
    }

    /// Hand a message to this process's subscribers of a room.
    fn dispatch_local(&self, room_id: i32, message: OutgoingChatMessage) {
        let rooms = self.inner.rooms.lock().expect("room registry poisoned");
        if let Some(sender) = rooms.get(&room_id) {
            // A send error just means nobody in this process is watching.
            let _ = sender.send(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_flattens_message_fields() {
        let envelope = ChatEnvelope {
            room_id: 7,
            message: OutgoingChatMessage {
                message: "hello".to_owned(),
                username: "user1".to_owned(),
                timestamp: "10:30".to_owned(),
                is_admin: false,
            },
        };
        let json = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(json["room_id"], 7);
        assert_eq!(json["message"], "hello");
        assert_eq!(json["username"], "user1");

        let back: ChatEnvelope = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back.room_id, 7);
        assert_eq!(back.message.timestamp, "10:30");
    }
}
