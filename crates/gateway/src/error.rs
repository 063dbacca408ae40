//! Error types for the gateway layer

use agora_chats::ChatError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            GatewayError::AuthorizationFailed(_) => StatusCode::FORBIDDEN,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = json!({
            "error": status.as_str(),
            "message": self.to_string(),
        });

        (status, Json(error_response)).into_response()
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<ChatError> for GatewayError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Unauthenticated => GatewayError::AuthenticationFailed(err.to_string()),
            ChatError::Validation { message } => GatewayError::InvalidRequest(message),
            ChatError::UserNotFound { .. } | ChatError::ChatNotFound { .. } => {
                GatewayError::NotFound(err.to_string())
            }
            ChatError::AccessDenied { reason } => GatewayError::AuthorizationFailed(reason),
            ChatError::StoreUnavailable(source) => {
                error!(error = %source, "chat store unavailable");
                GatewayError::ServiceUnavailable("chat store unavailable".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_database::DatabaseError;

    #[test]
    fn chat_errors_map_to_http_status() {
        let cases = [
            (ChatError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ChatError::validation("empty"), StatusCode::BAD_REQUEST),
            (ChatError::chat_not_found("c1"), StatusCode::NOT_FOUND),
            (ChatError::user_not_found("u1"), StatusCode::NOT_FOUND),
            (ChatError::access_denied("nope"), StatusCode::FORBIDDEN),
            (
                ChatError::StoreUnavailable(DatabaseError::QueryError("locked".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(GatewayError::from(error).status_code(), status);
        }
    }

    #[test]
    fn store_failures_do_not_leak_details() {
        let error = GatewayError::from(ChatError::StoreUnavailable(DatabaseError::QueryError(
            "disk I/O error at /var/lib/agora.db".into(),
        )));
        assert!(!error.to_string().contains("/var/lib"));
    }
}
