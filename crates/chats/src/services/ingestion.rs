use agora_database::{ChatRepository, CreateMessageRequest, MessageRepository, UserRepository};
use sqlx::SqlitePool;
use tracing::info;

use crate::types::{ChatError, ChatResult, DeliveryEnvelope};

/// Persists inbound messages and appends them to their chat.
#[derive(Clone)]
pub struct MessageIngestion {
    pool: SqlitePool,
    users: UserRepository,
    max_message_length: usize,
}

impl MessageIngestion {
    pub fn new(pool: SqlitePool, max_message_length: usize) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            pool,
            max_message_length,
        }
    }

    /// Store `content` from `author_id` to `partner_id` and return its envelope.
    ///
    /// Chat resolution, the message insert, and the append commit together.
    /// Nothing is written when any step fails.
    pub async fn ingest(
        &self,
        author_id: Option<&str>,
        content: &str,
        partner_id: &str,
    ) -> ChatResult<DeliveryEnvelope> {
        let author_id = author_id.ok_or(ChatError::Unauthenticated)?;
        self.validate(author_id, content, partner_id).await?;

        let mut tx = self.pool.begin().await?;
        let (chat, created) = ChatRepository::resolve_in(&mut *tx, author_id, partner_id).await?;
        let message = MessageRepository::insert_in(
            &mut *tx,
            &chat.id,
            &CreateMessageRequest {
                user_id: author_id.to_string(),
                content: content.to_string(),
            },
        )
        .await?;
        ChatRepository::append_message_in(&mut *tx, &chat.id, &message.id).await?;
        tx.commit().await?;

        info!(
            chat_id = %chat.id,
            message_id = %message.id,
            author_id = %author_id,
            partner_id = %partner_id,
            new_chat = created,
            "message ingested"
        );
        Ok(DeliveryEnvelope::from(&message))
    }

    async fn validate(&self, author_id: &str, content: &str, partner_id: &str) -> ChatResult<()> {
        if content.trim().is_empty() {
            return Err(ChatError::validation("message text must not be empty"));
        }
        let length = content.chars().count();
        if length > self.max_message_length {
            return Err(ChatError::validation(format!(
                "message text is {length} characters, the limit is {}",
                self.max_message_length
            )));
        }
        if partner_id.trim().is_empty() {
            return Err(ChatError::validation("partnerId must not be empty"));
        }
        if partner_id == author_id {
            return Err(ChatError::validation("cannot start a chat with yourself"));
        }

        for user_id in [author_id, partner_id] {
            if !self.users.exists(user_id).await? {
                return Err(ChatError::user_not_found(user_id));
            }
        }
        Ok(())
    }
}
