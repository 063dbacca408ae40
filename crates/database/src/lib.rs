//! Agora Database Crate
//!
//! SQLite storage for the chat core: connection preparation, embedded
//! migrations, entities, and repositories for users, chats, and messages.

use agora_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};

pub use repos::{ChatRepository, MessageRepository, UserRepository};

pub use entities::{
    member_pair, AuthoredMessage, Chat, CreateMessageRequest, CreateUserRequest, Message, User,
    UserProfile,
};

pub use types::{errors::DatabaseError, timestamp_now, DatabaseResult};

/// Connect to the configured database and bring its schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn initialize_database_runs_migrations() {
        let temp_dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", temp_dir.path().join("init.db").display()),
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn initialize_database_reports_unreachable_location() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", blocker.join("agora.db").display()),
            max_connections: 1,
        };

        let error = initialize_database(&config).await.unwrap_err();
        assert!(matches!(error, DatabaseError::ConnectionError(_)));
    }
}
