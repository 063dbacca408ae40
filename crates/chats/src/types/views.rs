//! Read-side views returned by the chat list and history paths.

use agora_database::{AuthoredMessage, UserProfile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: String,
    pub chat_id: String,
    pub content: String,
    pub read: bool,
    pub date: String,
    pub author: UserProfile,
}

impl From<AuthoredMessage> for MessageView {
    fn from(entry: AuthoredMessage) -> Self {
        let message = entry.message;
        Self {
            author: UserProfile {
                id: message.user_id,
                name: entry.author_name,
                avatar: entry.author_avatar,
            },
            id: message.id,
            chat_id: message.chat_id,
            content: message.content,
            read: message.read,
            date: message.created_at,
        }
    }
}

/// One entry of a user's chat list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub id: String,
    pub members: Vec<UserProfile>,
    /// The other member, relative to the user the list was built for.
    pub partner: Option<UserProfile>,
    /// The unread set when non-empty, otherwise the single latest message.
    pub messages: Vec<MessageView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub messages: Vec<MessageView>,
    pub has_more: bool,
}
