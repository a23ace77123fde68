//! Support chat repository (admin side).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mobigear_core::{ChatRoomId, RoleName, UserId};

use super::RepositoryError;

/// A room summary for the agent's room list.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoomSummary {
    pub id: i32,
    pub username: String,
    pub unread_count: i64,
    pub updated_at: DateTime<Utc>,
}

/// A chat message with sender info.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoomMessage {
    pub sender_id: i32,
    pub sender_username: String,
    pub sender_role: Option<RoleName>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl RoomMessage {
    /// Whether the sender holds the admin role.
    #[must_use]
    pub fn sender_is_admin(&self) -> bool {
        self.sender_role == Some(RoleName::Admin)
    }
}

/// Repository for the agent chat console.
pub struct ChatRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ChatRepository<'a> {
    /// Create a new chat repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active rooms, most recently updated first, with unread counts
    /// (messages from non-admin senders that no agent has read).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active_rooms(&self) -> Result<Vec<RoomSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, RoomSummary>(
            r"
            SELECT cr.id, u.username,
                   (SELECT COUNT(*) FROM chat_messages m
                     WHERE m.room_id = cr.id
                       AND m.is_read = FALSE
                       AND m.sender_id = cr.user_id) AS unread_count,
                   cr.updated_at
            FROM chat_rooms cr
            JOIN users u ON u.id = cr.user_id
            WHERE cr.is_active
            ORDER BY cr.updated_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// The customer username of a room, if the room exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn room_customer(
        &self,
        room_id: ChatRoomId,
    ) -> Result<Option<String>, RepositoryError> {
        let row: Option<(String,)> = sqlx::query_as(
            r"
            SELECT u.username
            FROM chat_rooms cr
            JOIN users u ON u.id = cr.user_id
            WHERE cr.id = $1
            ",
        )
        .bind(room_id.as_i32())
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(|(username,)| username))
    }

    /// The most recent `limit` messages of a room, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent_messages(
        &self,
        room_id: ChatRoomId,
        limit: i64,
    ) -> Result<Vec<RoomMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, RoomMessage>(
            r"
            SELECT * FROM (
                SELECT m.sender_id, u.username AS sender_username,
                       r.name AS sender_role, m.content, m.created_at
                FROM chat_messages m
                JOIN users u ON u.id = m.sender_id
                LEFT JOIN roles r ON r.id = u.role_id
                WHERE m.room_id = $1
                ORDER BY m.created_at DESC
                LIMIT $2
            ) recent
            ORDER BY created_at ASC
            ",
        )
        .bind(room_id.as_i32())
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Mark the customer's messages in a room as read and claim the room
    /// for this agent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn open_room(
        &self,
        room_id: ChatRoomId,
        admin_id: UserId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE chat_messages
            SET is_read = TRUE
            WHERE room_id = $1 AND sender_id <> $2 AND is_read = FALSE
            ",
        )
        .bind(room_id.as_i32())
        .bind(admin_id.as_i32())
        .execute(self.pool)
        .await?;

        sqlx::query("UPDATE chat_rooms SET admin_id = $1 WHERE id = $2 AND admin_id IS NULL")
            .bind(admin_id.as_i32())
            .bind(room_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Persist an agent message and bump the room's `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_message(
        &self,
        room_id: ChatRoomId,
        sender_id: UserId,
        content: &str,
    ) -> Result<DateTime<Utc>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (created_at,): (DateTime<Utc>,) = sqlx::query_as(
            r"
            INSERT INTO chat_messages (room_id, sender_id, content)
            VALUES ($1, $2, $3)
            RETURNING created_at
            ",
        )
        .bind(room_id.as_i32())
        .bind(sender_id.as_i32())
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE chat_rooms SET updated_at = NOW() WHERE id = $1")
            .bind(room_id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created_at)
    }
}
