//! Conversation repository trait.
//!
//! Defines the interface for conversation-log persistence operations.

use super::message::Message;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for the single persisted conversation slot.
///
/// This trait defines the contract for persisting and retrieving the ordered
/// message log, decoupling the pipeline from the specific storage mechanism
/// (e.g., a JSON file, an in-memory fake for tests).
///
/// # Implementation Notes
///
/// Implementations should handle:
/// - A missing slot: `load` returns an empty log, never an error
/// - A malformed slot: discarded (not repaired), `load` returns an empty log
/// - Write-through saves: `save` replaces the whole slot atomically
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Loads the full ordered message log.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Message>)`: The persisted log (empty if the slot is absent
    ///   or malformed)
    /// - `Err(_)`: Error occurred during retrieval
    async fn load(&self) -> Result<Vec<Message>>;

    /// Persists the full ordered message log, replacing the previous slot.
    ///
    /// # Arguments
    ///
    /// * `messages` - The complete log to persist
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Log saved successfully
    /// - `Err(_)`: Error occurred during save
    async fn save(&self, messages: &[Message]) -> Result<()>;

    /// Removes the persisted slot entirely.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Slot removed (or didn't exist)
    /// - `Err(_)`: Error occurred during removal
    async fn clear(&self) -> Result<()>;
}
