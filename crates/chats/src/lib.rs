//! # Agora Chats Crate
//!
//! The real-time chat core: presence of live connections, two-party chat
//! resolution, message ingestion and delivery, and the read paths behind the
//! chat list and message history.
//!
//! ## Architecture
//!
//! - **Presence**: [`PresenceRegistry`] maps online users to their connection
//! - **Services**: resolution, ingestion, delivery, chat list, history, read state
//! - **Types**: wire events, read-side views, and [`ChatError`]
//!
//! [`ChatServices`] bundles everything a connection handler needs.

pub mod presence;
pub mod services;
pub mod types;

pub use presence::{ConnectionHandle, PresenceRegistry, PushError};
pub use services::{
    select_preview, ChatListAggregator, ChatResolver, DeliveryOutcome, DeliveryRouter,
    MessageHistoryPager, MessageIngestion, ReadState,
};
pub use types::{
    ChatError, ChatResult, ChatSummary, ClientEvent, DeliveryEnvelope, MessagePage, MessageView,
    ServerEvent,
};

use agora_config::RealtimeConfig;
use agora_database::{Chat, ChatRepository, MessageRepository, UserRepository};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct ChatServices {
    pub presence: PresenceRegistry,
    pub resolver: ChatResolver,
    pub ingestion: MessageIngestion,
    pub delivery: DeliveryRouter,
    pub chat_list: ChatListAggregator,
    pub history: MessageHistoryPager,
    pub read_state: ReadState,
    chats: ChatRepository,
}

impl ChatServices {
    pub fn new(pool: SqlitePool, presence: PresenceRegistry, config: &RealtimeConfig) -> Self {
        let users = UserRepository::new(pool.clone());
        let chats = ChatRepository::new(pool.clone());
        let messages = MessageRepository::new(pool.clone());

        Self {
            resolver: ChatResolver::new(chats.clone()),
            ingestion: MessageIngestion::new(pool, config.max_message_length),
            delivery: DeliveryRouter::new(presence.clone()),
            chat_list: ChatListAggregator::new(users, chats.clone(), messages.clone()),
            history: MessageHistoryPager::new(
                chats.clone(),
                messages.clone(),
                config.history_page_size,
            ),
            read_state: ReadState::new(chats.clone(), messages),
            presence,
            chats,
        }
    }

    /// Ingest a message and route it. Delivery problems are logged by the
    /// router and never fail the send once the message is stored.
    pub async fn send_message(
        &self,
        author_id: Option<&str>,
        text: &str,
        partner_id: &str,
        sender: &ConnectionHandle,
    ) -> ChatResult<DeliveryEnvelope> {
        let envelope = self.ingestion.ingest(author_id, text, partner_id).await?;
        self.delivery.deliver(&envelope, partner_id, sender).await;
        Ok(envelope)
    }

    /// The chat, provided `user_id` is one of its members.
    pub async fn authorize(&self, chat_id: &str, user_id: &str) -> ChatResult<Chat> {
        services::member_chat(&self.chats, chat_id, user_id).await
    }
}
