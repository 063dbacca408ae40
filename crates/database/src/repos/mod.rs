//! Database repository implementations

pub mod chat_repository;
pub mod message_repository;
pub mod user_repository;

pub use chat_repository::*;
pub use message_repository::*;
pub use user_repository::*;
