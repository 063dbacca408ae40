use agora_database::{AuthoredMessage, ChatRepository, MessageRepository, UserRepository};
use regex::RegexBuilder;
use tracing::debug;

use crate::types::{ChatError, ChatResult, ChatSummary, MessageView};

/// Builds a user's chat list previews.
#[derive(Clone)]
pub struct ChatListAggregator {
    users: UserRepository,
    chats: ChatRepository,
    messages: MessageRepository,
}

impl ChatListAggregator {
    pub fn new(
        users: UserRepository,
        chats: ChatRepository,
        messages: MessageRepository,
    ) -> Self {
        Self {
            users,
            chats,
            messages,
        }
    }

    /// One summary per chat in the user's chat set, in the order they were added.
    pub async fn chat_list(&self, user_id: &str) -> ChatResult<Vec<ChatSummary>> {
        let chats = self.chats.find_for_user(user_id).await?;
        let mut summaries = Vec::with_capacity(chats.len());

        for chat in chats {
            let members = self.users.profiles(&chat.members()).await?;
            let partner = chat
                .partner_of(user_id)
                .and_then(|partner_id| members.iter().find(|m| m.id == partner_id))
                .cloned();
            let messages = self.messages.list_for_chat(&chat.id).await?;

            summaries.push(ChatSummary {
                id: chat.id,
                members,
                partner,
                messages: select_preview(messages)
                    .into_iter()
                    .map(MessageView::from)
                    .collect(),
            });
        }

        debug!(user_id = %user_id, chats = summaries.len(), "built chat list");
        Ok(summaries)
    }

    /// The chat list narrowed to partners whose name contains `text`, ignoring case.
    pub async fn search(&self, user_id: &str, text: &str) -> ChatResult<Vec<ChatSummary>> {
        let pattern = RegexBuilder::new(&regex::escape(text.trim()))
            .case_insensitive(true)
            .build()
            .map_err(|e| ChatError::validation(format!("invalid search text: {e}")))?;

        let summaries = self.chat_list(user_id).await?;
        Ok(summaries
            .into_iter()
            .filter(|summary| {
                summary
                    .partner
                    .as_ref()
                    .is_some_and(|partner| pattern.is_match(&partner.name))
            })
            .collect())
    }
}

/// The messages a chat-list entry surfaces: every unread message, newest
/// first, or only the most recent message when nothing is unread.
pub fn select_preview(mut messages: Vec<AuthoredMessage>) -> Vec<AuthoredMessage> {
    // Stable, so equal timestamps keep the incoming order.
    messages.sort_by(|a, b| b.message.created_at.cmp(&a.message.created_at));

    let unread: Vec<AuthoredMessage> = messages
        .iter()
        .filter(|entry| !entry.message.read)
        .cloned()
        .collect();

    if unread.is_empty() {
        messages.truncate(1);
        messages
    } else {
        unread
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_database::Message;

    fn authored(id: &str, minute: u32, read: bool) -> AuthoredMessage {
        AuthoredMessage {
            message: Message {
                id: id.to_string(),
                chat_id: "c1".to_string(),
                user_id: "u1".to_string(),
                content: format!("message {id}"),
                read,
                created_at: format!("2024-05-01T10:{minute:02}:00.000000Z"),
            },
            author_name: "Ada".to_string(),
            author_avatar: None,
        }
    }

    fn ids(messages: &[AuthoredMessage]) -> Vec<&str> {
        messages.iter().map(|m| m.message.id.as_str()).collect()
    }

    #[test]
    fn all_read_surfaces_only_the_latest() {
        let messages = vec![
            authored("a", 1, true),
            authored("c", 3, true),
            authored("b", 2, true),
            authored("e", 5, true),
            authored("d", 4, true),
        ];

        assert_eq!(ids(&select_preview(messages)), vec!["e"]);
    }

    #[test]
    fn unread_set_is_surfaced_in_full_newest_first() {
        let messages = vec![
            authored("a", 1, true),
            authored("b", 2, false),
            authored("c", 3, true),
            authored("d", 4, false),
            authored("e", 5, true),
        ];

        assert_eq!(ids(&select_preview(messages)), vec!["d", "b"]);
    }

    #[test]
    fn empty_chat_surfaces_nothing() {
        assert!(select_preview(Vec::new()).is_empty());
    }
}
