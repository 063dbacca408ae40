//! Wire events exchanged over a live chat connection.
//!
//! Frames are JSON objects of the form `{"event": "<name>", "data": <payload>}`.

use agora_database::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The wire-visible shape of a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryEnvelope {
    pub chat_id: String,
    pub message_id: String,
    pub read: bool,
    pub user_id: String,
    pub content: String,
    pub date: String,
}

impl From<&Message> for DeliveryEnvelope {
    fn from(message: &Message) -> Self {
        Self {
            chat_id: message.chat_id.clone(),
            message_id: message.id.clone(),
            read: message.read,
            user_id: message.user_id.clone(),
            content: message.content.clone(),
            date: message.created_at.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    try_from = "RawClientEvent"
)]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    NewMessage { text: String, partner_id: String },
    /// Diagnostic payload fanned out to every connection.
    Test(Value),
    #[serde(rename_all = "camelCase")]
    MarkRead { chat_id: String },
}

/// An inbound frame before its payload is typed. `data` may be absent.
#[derive(Deserialize)]
struct RawClientEvent {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewMessageData {
    text: String,
    partner_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkReadData {
    chat_id: String,
}

impl TryFrom<RawClientEvent> for ClientEvent {
    type Error = String;

    fn try_from(raw: RawClientEvent) -> Result<Self, Self::Error> {
        let invalid = |error: serde_json::Error| format!("invalid {} payload: {error}", raw.event);
        match raw.event.as_str() {
            "newMessage" => {
                let data: NewMessageData =
                    serde_json::from_value(raw.data).map_err(invalid)?;
                Ok(Self::NewMessage {
                    text: data.text,
                    partner_id: data.partner_id,
                })
            }
            "test" => Ok(Self::Test(raw.data)),
            "markRead" => {
                let data: MarkReadData = serde_json::from_value(raw.data).map_err(invalid)?;
                Ok(Self::MarkRead {
                    chat_id: data.chat_id,
                })
            }
            other => Err(format!("unknown event `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    Hello {
        user_id: Option<String>,
        authenticated: bool,
    },
    NewMessage(DeliveryEnvelope),
    Test(Value),
    #[serde(rename_all = "camelCase")]
    ChatRead { chat_id: String, updated: u64 },
    Error { code: String, message: String },
}

impl ServerEvent {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ChatError> for ServerEvent {
    fn from(error: &crate::ChatError) -> Self {
        Self::error(error.code(), error.to_string())
    }
}
