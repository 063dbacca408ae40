use agora_database::{ChatRepository, MessageRepository};

use super::member_chat;
use crate::types::ChatResult;

/// Moves messages from unread to read on behalf of the reading member.
#[derive(Clone)]
pub struct ReadState {
    chats: ChatRepository,
    messages: MessageRepository,
}

impl ReadState {
    pub fn new(chats: ChatRepository, messages: MessageRepository) -> Self {
        Self { chats, messages }
    }

    /// Marks the partner's unread messages in `chat_id` as read. The reader's
    /// own messages are left for the partner to read. Returns how many changed.
    pub async fn mark_read(&self, chat_id: &str, reader_id: &str) -> ChatResult<u64> {
        member_chat(&self.chats, chat_id, reader_id).await?;
        Ok(self.messages.mark_read(chat_id, reader_id).await?)
    }
}
