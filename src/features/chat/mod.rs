//! Chat feature: the conversation transcript and the completion client that
//! answers it.

pub mod client;
pub mod conversation;
pub mod types;

pub use client::{store_api_key, CompletionClient};
pub use conversation::{Conversation, GREETING};
pub use types::{Message, Role};
