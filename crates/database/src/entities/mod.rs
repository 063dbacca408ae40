//! Domain entities for the database layer

pub mod chat;
pub mod message;
pub mod user;

pub use chat::{member_pair, Chat};
pub use message::{AuthoredMessage, CreateMessageRequest, Message};
pub use user::{CreateUserRequest, User, UserProfile};
