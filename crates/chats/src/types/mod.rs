//! Shared types for the chat core.

pub mod errors;
pub mod events;
pub mod views;

pub use errors::{ChatError, ChatResult};
pub use events::{ClientEvent, DeliveryEnvelope, ServerEvent};
pub use views::{ChatSummary, MessagePage, MessageView};
