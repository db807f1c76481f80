//! Storage implementations for the Riskviz client.

pub mod json_conversation_repository;

pub use json_conversation_repository::JsonConversationRepository;
