//! Admin side of the cross-process chat bridge.
//!
//! Mirror of the storefront's hub: local `broadcast` channels per room plus
//! a Postgres `LISTEN`/`NOTIFY` bridge so agents and customers see each
//! other's messages even though they talk to different server processes.
//! The wire format must stay in lockstep with the storefront's.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;

use mobigear_core::ChatRoomId;

/// Postgres notification channel carrying chat messages.
const CHAT_CHANNEL: &str = "chat_events";

/// Buffered messages per room before slow subscribers start lagging.
const ROOM_BUFFER: usize = 64;

/// Delay before reconnecting a failed listener.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// The payload broadcast to websocket subscribers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutgoingChatMessage {
    pub message: String,
    pub username: String,
    /// `HH:MM` wall-clock time of the message.
    pub timestamp: String,
    pub is_admin: bool,
}

impl OutgoingChatMessage {
    /// Build the broadcast payload for a freshly sent message.
    #[must_use]
    pub fn new(content: &str, username: &str, is_admin: bool, at: DateTime<Utc>) -> Self {
        Self {
            message: content.to_owned(),
            username: username.to_owned(),
            timestamp: at.format("%H:%M").to_string(),
            is_admin,
        }
    }
}

/// Frame sent by websocket clients.
#[derive(Debug, Deserialize)]
pub struct IncomingChatMessage {
    pub message: String,
}

/// Notification payload: a room id plus the broadcast message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatEnvelope {
    pub room_id: i32,
    #[serde(flatten)]
    pub message: OutgoingChatMessage,
}

/// Chat message hub for the admin process.
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

    /// Publish a message to every subscriber of a room across processes.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the notify query fails.
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

    /// Spawn the background listener task. Call once at startup.
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

    fn dispatch_local(&self, room_id: i32, message: OutgoingChatMessage) {
        let rooms = self.inner.rooms.lock().expect("room registry poisoned");
        if let Some(sender) = rooms.get(&room_id) {
            let _ = sender.send(message);
        }
    }
}
