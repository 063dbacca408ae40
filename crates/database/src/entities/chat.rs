//! Chat entity definitions

use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};

/// A two-party conversation. Members are kept as a sorted pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub member_low: String,
    pub member_high: String,
    pub created_at: String,
}

impl Chat {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            member_low: row.try_get("member_low")?,
            member_high: row.try_get("member_high")?,
            created_at: row.try_get("created_at")?,
        })
    }

    pub fn members(&self) -> [&str; 2] {
        [&self.member_low, &self.member_high]
    }

    pub fn has_member(&self, user_id: &str) -> bool {
        self.member_low == user_id || self.member_high == user_id
    }

    /// The other member relative to `user_id`, if `user_id` belongs to the chat.
    pub fn partner_of(&self, user_id: &str) -> Option<&str> {
        if self.member_low == user_id {
            Some(&self.member_high)
        } else if self.member_high == user_id {
            Some(&self.member_low)
        } else {
            None
        }
    }
}

/// Orders a member pair the way the `chats` table stores it.
///
/// ```
/// use agora_database::member_pair;
///
/// assert_eq!(member_pair("b", "a"), ("a", "b"));
/// assert_eq!(member_pair("a", "b"), ("a", "b"));
/// ```
pub fn member_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
