//! JSON file-based ConversationRepository implementation.
//!
//! The persisted shape is a single slot: one JSON array of messages in
//! `conversation.json`. This is the durable analog of the browser
//! local-storage slot the conversation originally lived in.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use riskviz_core::conversation::{ConversationRepository, Message};
use riskviz_core::error::{Result, RiskvizError};

const SLOT_FILE: &str = "conversation.json";

/// A repository storing the conversation log as one JSON file.
///
/// - `load` returns an empty log for an absent slot, and discards (does not
///   repair) a malformed slot with a warning.
/// - `save` replaces the whole slot via tmp file + atomic rename, so a
///   partially written log is never observable.
/// - `clear` removes the slot file entirely.
pub struct JsonConversationRepository {
    base_dir: PathBuf,
}

impl JsonConversationRepository {
    /// Creates a repository rooted at the given base directory.
    ///
    /// The directory is created lazily on the first save.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Creates a repository at the default location (~/.riskviz).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_location() -> Result<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| RiskvizError::config("Failed to get home directory"))?;
        Ok(Self::new(home_dir.join(".riskviz")))
    }

    fn slot_path(&self) -> PathBuf {
        self.base_dir.join(SLOT_FILE)
    }
}

#[async_trait]
impl ConversationRepository for JsonConversationRepository {
    async fn load(&self) -> Result<Vec<Message>> {
        let path = self.slot_path();
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str(&content) {
            Ok(messages) => Ok(messages),
            Err(err) => {
                tracing::warn!(
                    "discarding malformed conversation slot at {}: {}",
                    path.display(),
                    err
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, messages: &[Message]) -> Result<()> {
        fs::create_dir_all(&self.base_dir).await?;

        let json = serde_json::to_string_pretty(messages)?;

        // tmp file + rename keeps the slot atomic with respect to crashes
        let tmp_path = self.base_dir.join(format!("{}.tmp", SLOT_FILE));
        fs::write(&tmp_path, json).await?;
        fs::rename(&tmp_path, self.slot_path()).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_file(self.slot_path()).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_load_roundtrips_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let repository = JsonConversationRepository::new(dir.path());

        let messages = vec![Message::user("first"), Message::assistant("second")];
        repository.save(&messages).await.unwrap();

        let loaded = repository.load().await.unwrap();
        assert_eq!(loaded, messages);
    }

    #[tokio::test]
    async fn test_absent_slot_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repository = JsonConversationRepository::new(dir.path());

        assert!(repository.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_slot_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let repository = JsonConversationRepository::new(dir.path());

        std::fs::write(dir.path().join(SLOT_FILE), "{not json").unwrap();

        assert!(repository.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_slot_file() {
        let dir = tempfile::tempdir().unwrap();
        let repository = JsonConversationRepository::new(dir.path());

        repository.save(&[Message::user("q")]).await.unwrap();
        assert!(dir.path().join(SLOT_FILE).exists());

        repository.clear().await.unwrap();
        assert!(!dir.path().join(SLOT_FILE).exists());
        assert!(repository.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_on_absent_slot_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let repository = JsonConversationRepository::new(dir.path());

        repository.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_save_replaces_previous_slot() {
        let dir = tempfile::tempdir().unwrap();
        let repository = JsonConversationRepository::new(dir.path());

        repository
            .save(&[Message::user("a"), Message::assistant("b")])
            .await
            .unwrap();
        let shorter = vec![Message::user("only")];
        repository.save(&shorter).await.unwrap();

        assert_eq!(repository.load().await.unwrap(), shorter);
    }
}
