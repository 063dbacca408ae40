//! Message entity definitions

use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub user_id: String,
    pub content: String,
    pub read: bool,
    pub created_at: String,
}

impl Message {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            user_id: row.try_get("user_id")?,
            content: row.try_get("content")?,
            read: row.try_get("read")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// A message joined with its author's display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthoredMessage {
    #[serde(flatten)]
    pub message: Message,
    pub author_name: String,
    pub author_avatar: Option<String>,
}

impl AuthoredMessage {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            message: Message::from_row(row)?,
            author_name: row.try_get("author_name")?,
            author_avatar: row.try_get("author_avatar")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub user_id: String,
    pub content: String,
}
