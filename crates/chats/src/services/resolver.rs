use agora_database::{Chat, ChatRepository};

use crate::types::{ChatError, ChatResult};

/// Finds or creates the single chat shared by two users.
#[derive(Clone)]
pub struct ChatResolver {
    chats: ChatRepository,
}

impl ChatResolver {
    pub fn new(chats: ChatRepository) -> Self {
        Self { chats }
    }

    pub async fn resolve(&self, member_a: &str, member_b: &str) -> ChatResult<Chat> {
        if member_a == member_b {
            return Err(ChatError::validation("a chat needs two distinct members"));
        }
        Ok(self.chats.resolve(member_a, member_b).await?)
    }
}
