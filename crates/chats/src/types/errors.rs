//! Error types for the chat core.

use agora_database::DatabaseError;
use thiserror::Error;

/// Result type alias for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("User not found: {id}")]
    UserNotFound { id: String },

    #[error("Chat not found: {id}")]
    ChatNotFound { id: String },

    #[error("Access denied: {reason}")]
    AccessDenied { reason: String },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] DatabaseError),
}

impl ChatError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::UserNotFound { id: id.into() }
    }

    pub fn chat_not_found(id: impl Into<String>) -> Self {
        Self::ChatNotFound { id: id.into() }
    }

    pub fn access_denied(reason: impl Into<String>) -> Self {
        Self::AccessDenied {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code sent to clients in `error` events.
    pub fn code(&self) -> &'static str {
        match self {
            ChatError::Unauthenticated => "unauthenticated",
            ChatError::Validation { .. } => "validation",
            ChatError::UserNotFound { .. } => "user_not_found",
            ChatError::ChatNotFound { .. } => "chat_not_found",
            ChatError::AccessDenied { .. } => "access_denied",
            ChatError::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl From<sqlx::Error> for ChatError {
    fn from(error: sqlx::Error) -> Self {
        Self::StoreUnavailable(DatabaseError::from(error))
    }
}
