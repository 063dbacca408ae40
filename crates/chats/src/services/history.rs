use agora_database::{ChatRepository, MessageRepository};

use crate::types::{ChatError, ChatResult, MessagePage, MessageView};

/// Newest-first paging over a chat's messages.
#[derive(Clone)]
pub struct MessageHistoryPager {
    chats: ChatRepository,
    messages: MessageRepository,
    default_page_size: u32,
}

impl MessageHistoryPager {
    pub const DEFAULT_PAGE_SIZE: u32 = 20;

    pub fn new(chats: ChatRepository, messages: MessageRepository, default_page_size: u32) -> Self {
        Self {
            chats,
            messages,
            default_page_size: if default_page_size == 0 {
                Self::DEFAULT_PAGE_SIZE
            } else {
                default_page_size
            },
        }
    }

    pub fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    pub async fn page(&self, chat_id: &str, skip: u32) -> ChatResult<MessagePage> {
        self.page_sized(chat_id, skip, self.default_page_size).await
    }

    /// At most `page_size` messages starting `skip` messages from the newest.
    /// `has_more` is true while messages remain past this window.
    pub async fn page_sized(
        &self,
        chat_id: &str,
        skip: u32,
        page_size: u32,
    ) -> ChatResult<MessagePage> {
        if self.chats.find_by_id(chat_id).await?.is_none() {
            return Err(ChatError::chat_not_found(chat_id));
        }
        if page_size == 0 {
            return Err(ChatError::validation("page size must be positive"));
        }

        let messages = self
            .messages
            .page_for_chat(chat_id, i64::from(page_size), i64::from(skip))
            .await?;
        let total = self.messages.count_for_chat(chat_id).await?;
        let has_more = i64::from(skip) + (messages.len() as i64) < total;

        Ok(MessagePage {
            messages: messages.into_iter().map(MessageView::from).collect(),
            has_more,
        })
    }
}
