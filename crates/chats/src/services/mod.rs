//! Chat core services.

pub mod chat_list;
pub mod delivery;
pub mod history;
pub mod ingestion;
pub mod read_state;
pub mod resolver;

pub use chat_list::{select_preview, ChatListAggregator};
pub use delivery::{DeliveryOutcome, DeliveryRouter};
pub use history::MessageHistoryPager;
pub use ingestion::MessageIngestion;
pub use read_state::ReadState;
pub use resolver::ChatResolver;

use agora_database::{Chat, ChatRepository};

use crate::types::{ChatError, ChatResult};

/// Loads a chat and checks that `user_id` is one of its two members.
pub(crate) async fn member_chat(
    chats: &ChatRepository,
    chat_id: &str,
    user_id: &str,
) -> ChatResult<Chat> {
    let chat = chats
        .find_by_id(chat_id)
        .await?
        .ok_or_else(|| ChatError::chat_not_found(chat_id))?;

    if !chat.has_member(user_id) {
        return Err(ChatError::access_denied(format!(
            "user {user_id} is not a member of chat {chat_id}"
        )));
    }
    Ok(chat)
}
