//! Repository for two-party chats and the users' chat sets.

use crate::entities::{member_pair, Chat};
use crate::types::{timestamp_now, DatabaseResult};
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{debug, info};

const CHAT_COLUMNS: &str = "id, member_low, member_high, created_at";

#[derive(Clone)]
pub struct ChatRepository {
    pool: SqlitePool,
}

impl ChatRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, chat_id: &str) -> DatabaseResult<Option<Chat>> {
        let row = sqlx::query(&format!("SELECT {CHAT_COLUMNS} FROM chats WHERE id = ?"))
            .bind(chat_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(Chat::from_row).transpose()?)
    }

    /// Chats in the user's chat set, in the order they were added.
    pub async fn find_for_user(&self, user_id: &str) -> DatabaseResult<Vec<Chat>> {
        let rows = sqlx::query(
            "SELECT c.id, c.member_low, c.member_high, c.created_at
             FROM user_chats uc JOIN chats c ON c.id = uc.chat_id
             WHERE uc.user_id = ? ORDER BY uc.position ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(Chat::from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Every chat with its message count, oldest first.
    pub async fn list_with_counts(&self) -> DatabaseResult<Vec<(Chat, i64)>> {
        let rows = sqlx::query(
            "SELECT c.id, c.member_low, c.member_high, c.created_at,
                    (SELECT COUNT(*) FROM chat_messages cm WHERE cm.chat_id = c.id) AS message_count
             FROM chats c ORDER BY c.created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> DatabaseResult<(Chat, i64)> {
                Ok((Chat::from_row(row)?, row.try_get::<i64, _>("message_count")?))
            })
            .collect()
    }

    /// Find-or-create on the pool, in its own transaction.
    pub async fn resolve(&self, a: &str, b: &str) -> DatabaseResult<Chat> {
        let mut tx = self.pool.begin().await?;
        let (chat, _) = Self::resolve_in(&mut *tx, a, b).await?;
        tx.commit().await?;
        Ok(chat)
    }

    /// Find-or-create the chat for `{a, b}` on an open connection.
    ///
    /// The insert runs first and relies on the unique member pair, so two
    /// concurrent resolutions for the same pair end up with one row. The chat is
    /// appended to both users' chat sets only by the caller that created it.
    /// Returns the chat and whether this call created it.
    pub async fn resolve_in(
        conn: &mut SqliteConnection,
        a: &str,
        b: &str,
    ) -> DatabaseResult<(Chat, bool)> {
        let (low, high) = member_pair(a, b);
        let id = cuid2::cuid();

        let inserted = sqlx::query(
            "INSERT INTO chats (id, member_low, member_high, created_at) VALUES (?, ?, ?, ?)
             ON CONFLICT (member_low, member_high) DO NOTHING",
        )
        .bind(&id)
        .bind(low)
        .bind(high)
        .bind(timestamp_now())
        .execute(&mut *conn)
        .await?
        .rows_affected()
            == 1;

        if inserted {
            for member in [low, high] {
                sqlx::query("INSERT OR IGNORE INTO user_chats (user_id, chat_id) VALUES (?, ?)")
                    .bind(member)
                    .bind(&id)
                    .execute(&mut *conn)
                    .await?;
            }
            info!(chat_id = %id, member_low = %low, member_high = %high, "created chat");
        }

        let chat = Self::find_by_members_in(conn, low, high)
            .await?
            .ok_or_else(|| crate::DatabaseError::not_found(format!("chat {low}/{high}")))?;

        debug!(chat_id = %chat.id, created = inserted, "resolved chat");
        Ok((chat, inserted))
    }

    pub async fn find_by_members_in(
        conn: &mut SqliteConnection,
        a: &str,
        b: &str,
    ) -> DatabaseResult<Option<Chat>> {
        let (low, high) = member_pair(a, b);
        let row = sqlx::query(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE member_low = ? AND member_high = ?"
        ))
        .bind(low)
        .bind(high)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.as_ref().map(Chat::from_row).transpose()?)
    }

    /// Appends a message to the end of the chat's message sequence.
    pub async fn append_message_in(
        conn: &mut SqliteConnection,
        chat_id: &str,
        message_id: &str,
    ) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO chat_messages (chat_id, message_id) VALUES (?, ?)")
            .bind(chat_id)
            .bind(message_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
