//! Conversation domain: messages, the append-only log, and its persistence
//! contract.

pub mod log;
pub mod message;
pub mod repository;

pub use log::ConversationLog;
pub use message::{Message, MessageRole, SourceSnippet};
pub use repository::ConversationRepository;
