//! User repository for database operations.

use crate::entities::{CreateUserRequest, User, UserProfile};
use crate::types::{timestamp_now, DatabaseResult};
use sqlx::SqlitePool;
use tracing::info;

const USER_COLUMNS: &str = "id, name, login, avatar, created_at";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(User::from_row).transpose()?)
    }

    pub async fn exists(&self, id: &str) -> DatabaseResult<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// Display fields for every listed user that exists. Unknown ids are skipped.
    pub async fn profiles(&self, ids: &[&str]) -> DatabaseResult<Vec<UserProfile>> {
        let mut profiles = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.find_by_id(id).await? {
                profiles.push(user.profile());
            }
        }
        Ok(profiles)
    }

    pub async fn list(&self) -> DatabaseResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(User::from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub async fn create(&self, request: &CreateUserRequest) -> DatabaseResult<User> {
        let user = User {
            id: cuid2::cuid(),
            name: request.name.clone(),
            login: request.login.clone(),
            avatar: request.avatar.clone(),
            created_at: timestamp_now(),
        };

        sqlx::query("INSERT INTO users (id, name, login, avatar, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.login)
            .bind(&user.avatar)
            .bind(&user.created_at)
            .execute(&self.pool)
            .await?;

        info!(user_id = %user.id, login = %user.login, "created user");
        Ok(user)
    }

    /// The user's chat set, in the order chats were added.
    pub async fn chat_ids(&self, user_id: &str) -> DatabaseResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT chat_id FROM user_chats WHERE user_id = ? ORDER BY position ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
