//! Chat repository: rooms and messages.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mobigear_core::{ChatMessageId, ChatRoomId, RoleName, UserId};

use super::RepositoryError;
use crate::models::chat::{ChatMessage, ChatRoom};

#[derive(Debug, sqlx::FromRow)]
struct ChatRoomRow {
    id: i32,
    user_id: i32,
    username: String,
    admin_id: Option<i32>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ChatRoomRow> for ChatRoom {
    fn from(row: ChatRoomRow) -> Self {
        Self {
            id: ChatRoomId::new(row.id),
            user_id: UserId::new(row.user_id),
            username: row.username,
            admin_id: row.admin_id.map(UserId::new),
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ChatMessageRow {
    id: i32,
    room_id: i32,
    sender_id: i32,
    sender_username: String,
    sender_role: Option<RoleName>,
    content: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl From<ChatMessageRow> for ChatMessage {
    fn from(row: ChatMessageRow) -> Self {
        Self {
            id: ChatMessageId::new(row.id),
            room_id: ChatRoomId::new(row.room_id),
            sender_id: UserId::new(row.sender_id),
            sender_username: row.sender_username,
            sender_is_admin: row.sender_role == Some(RoleName::Admin),
            content: row.content,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

const ROOM_SELECT: &str = r"
    SELECT cr.id, cr.user_id, u.username, cr.admin_id, cr.is_active,
           cr.created_at, cr.updated_at
    FROM chat_rooms cr
    JOIN users u ON u.id = cr.user_id
";

const MESSAGE_SELECT: &str = r"
    SELECT m.id, m.room_id, m.sender_id, u.username AS sender_username,
           r.name AS sender_role, m.content, m.is_read, m.created_at
    FROM chat_messages m
    JOIN users u ON u.id = m.sender_id
    LEFT JOIN roles r ON r.id = u.role_id
";

/// Repository for chat database operations.
pub struct ChatRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ChatRepository<'a> {
    /// Create a new chat repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's active room, creating one if none exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_or_create_for_user(
        &self,
        user_id: UserId,
    ) -> Result<ChatRoom, RepositoryError> {
        let sql = format!("{ROOM_SELECT} WHERE cr.user_id = $1 AND cr.is_active");
        if let Some(row) = sqlx::query_as::<_, ChatRoomRow>(&sql)
            .bind(user_id.as_i32())
            .fetch_optional(self.pool)
            .await?
        {
            return Ok(row.into());
        }

        let sql = format!(
            "WITH inserted AS (
                INSERT INTO chat_rooms (user_id) VALUES ($1)
                ON CONFLICT (user_id) WHERE is_active DO UPDATE SET updated_at = NOW()
                RETURNING *
             )
             SELECT cr.id, cr.user_id, u.username, cr.admin_id, cr.is_active,
                    cr.created_at, cr.updated_at
             FROM inserted cr JOIN users u ON u.id = cr.user_id"
        );
        let row = sqlx::query_as::<_, ChatRoomRow>(&sql)
            .bind(user_id.as_i32())
            .fetch_one(self.pool)
            .await?;

        Ok(row.into())
    }

    /// Get a room by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_room(&self, id: ChatRoomId) -> Result<Option<ChatRoom>, RepositoryError> {
        let sql = format!("{ROOM_SELECT} WHERE cr.id = $1");
        let row = sqlx::query_as::<_, ChatRoomRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
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
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let sql = format!(
            "SELECT * FROM ({MESSAGE_SELECT} WHERE m.room_id = $1 ORDER BY m.created_at DESC LIMIT $2) recent
             ORDER BY created_at ASC"
        );
        let rows = sqlx::query_as::<_, ChatMessageRow>(&sql)
            .bind(room_id.as_i32())
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Persist a message and bump the room's `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_message(
        &self,
        room_id: ChatRoomId,
        sender_id: UserId,
        content: &str,
    ) -> Result<ChatMessage, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (message_id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO chat_messages (room_id, sender_id, content)
            VALUES ($1, $2, $3)
            RETURNING id
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

        let sql = format!("{MESSAGE_SELECT} WHERE m.id = $1");
        let row = sqlx::query_as::<_, ChatMessageRow>(&sql)
            .bind(message_id)
            .fetch_one(self.pool)
            .await?;

        Ok(row.into())
    }

    /// Mark all messages in a room not sent by `reader_id` as read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_read(
        &self,
        room_id: ChatRoomId,
        reader_id: UserId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE chat_messages
            SET is_read = TRUE
            WHERE room_id = $1 AND sender_id <> $2 AND is_read = FALSE
            ",
        )
        .bind(room_id.as_i32())
        .bind(reader_id.as_i32())
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
