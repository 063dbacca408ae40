//! Repository for message data access operations.

use crate::entities::{AuthoredMessage, CreateMessageRequest, Message};
use crate::types::{timestamp_now, DatabaseResult};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

// Newest first. Messages sharing a timestamp fall back to reverse send order so
// every window over the sequence is stable.
const AUTHORED_SELECT: &str = "SELECT m.id, cm.chat_id, m.user_id, m.content, m.read, m.created_at,
        u.name AS author_name, u.avatar AS author_avatar
     FROM chat_messages cm
     JOIN messages m ON m.id = cm.message_id
     JOIN users u ON u.id = m.user_id
     WHERE cm.chat_id = ?
     ORDER BY m.created_at DESC, cm.position DESC";

/// Repository for message database operations
#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts an unread message destined for `chat_id`.
    ///
    /// The message joins the chat's sequence once the caller appends it with
    /// [`crate::ChatRepository::append_message_in`].
    pub async fn insert_in(
        conn: &mut SqliteConnection,
        chat_id: &str,
        request: &CreateMessageRequest,
    ) -> DatabaseResult<Message> {
        let message = Message {
            id: cuid2::cuid(),
            chat_id: chat_id.to_string(),
            user_id: request.user_id.clone(),
            content: request.content.clone(),
            read: false,
            created_at: timestamp_now(),
        };

        sqlx::query(
            "INSERT INTO messages (id, user_id, content, read, created_at) VALUES (?, ?, ?, 0, ?)",
        )
        .bind(&message.id)
        .bind(&message.user_id)
        .bind(&message.content)
        .bind(&message.created_at)
        .execute(&mut *conn)
        .await?;

        debug!(message_id = %message.id, chat_id = %chat_id, "stored message");
        Ok(message)
    }

    /// All messages of a chat, newest first, with author display fields.
    pub async fn list_for_chat(&self, chat_id: &str) -> DatabaseResult<Vec<AuthoredMessage>> {
        let rows = sqlx::query(AUTHORED_SELECT)
            .bind(chat_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(AuthoredMessage::from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// A newest-first window of a chat's messages.
    pub async fn page_for_chat(
        &self,
        chat_id: &str,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<AuthoredMessage>> {
        let rows = sqlx::query(&format!("{AUTHORED_SELECT} LIMIT ? OFFSET ?"))
            .bind(chat_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(AuthoredMessage::from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub async fn count_for_chat(&self, chat_id: &str) -> DatabaseResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM chat_messages WHERE chat_id = ?")
                .bind(chat_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// The last element of the chat's message sequence, in send order.
    pub async fn last_appended(&self, chat_id: &str) -> DatabaseResult<Option<Message>> {
        let row = sqlx::query(
            "SELECT m.id, cm.chat_id, m.user_id, m.content, m.read, m.created_at
             FROM chat_messages cm JOIN messages m ON m.id = cm.message_id
             WHERE cm.chat_id = ? ORDER BY cm.position DESC LIMIT 1",
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Message::from_row).transpose()?)
    }

    /// Marks every unread message in the chat that `reader_id` did not author as read.
    pub async fn mark_read(&self, chat_id: &str, reader_id: &str) -> DatabaseResult<u64> {
        let updated = sqlx::query(
            "UPDATE messages SET read = 1
             WHERE read = 0 AND user_id != ?
               AND id IN (SELECT message_id FROM chat_messages WHERE chat_id = ?)",
        )
        .bind(reader_id)
        .bind(chat_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated > 0 {
            info!(chat_id = %chat_id, reader_id = %reader_id, updated, "marked messages read");
        }
        Ok(updated)
    }
}
