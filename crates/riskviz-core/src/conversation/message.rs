//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation,
//! including roles, provenance snippets, and follow-up suggestions.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// A provenance snippet attached to an assistant answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSnippet {
    /// Kind of source ("sheet", "document", ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// The quoted snippet content.
    pub content: String,
    /// Relevance of the snippet to the answer, in `[0, 1]`.
    pub relevance_score: f64,
}

/// A single message in a conversation history.
///
/// Messages are append-only: once created they are never mutated. The log of
/// messages is the sole unit of persisted conversation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique, monotonically orderable identifier (timestamp-derived).
    pub id: String,
    /// The role of the message sender.
    pub role: MessageRole,
    /// The display text of the message.
    pub content: String,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
    /// Provenance snippets attached to an assistant answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceSnippet>>,
    /// Follow-up question suggestions attached to an assistant answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

/// High-water mark for issued message ids, in milliseconds since the epoch.
///
/// Two messages created within the same millisecond would otherwise collide,
/// so each new id is bumped past the last one issued by this process.
static LAST_ID_MILLIS: AtomicI64 = AtomicI64::new(0);

fn next_message_id() -> String {
    let now = Utc::now().timestamp_millis();
    loop {
        let last = LAST_ID_MILLIS.load(Ordering::SeqCst);
        let candidate = now.max(last + 1);
        if LAST_ID_MILLIS
            .compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            return candidate.to_string();
        }
    }
}

impl Message {
    /// Creates a user message with a fresh id and timestamp.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message with a fresh id and timestamp.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: next_message_id(),
            role,
            content: content.into(),
            timestamp: Utc::now().to_rfc3339(),
            sources: None,
            suggestions: None,
        }
    }

    /// Attaches provenance snippets to this message.
    pub fn with_sources(mut self, sources: Vec<SourceSnippet>) -> Self {
        self.sources = Some(sources);
        self
    }

    /// Attaches follow-up question suggestions to this message.
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = Some(suggestions);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_ids_are_unique_and_monotonic() {
        let ids: Vec<i64> = (0..100)
            .map(|_| Message::user("q").id.parse().unwrap())
            .collect();

        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1], "ids must strictly increase");
        }
    }

    #[test]
    fn test_roles_serialize_lowercase() {
        let msg = Message::assistant("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        // Absent optional fields are omitted, not serialized as null
        assert!(json.get("sources").is_none());
        assert!(json.get("suggestions").is_none());
    }

    #[test]
    fn test_source_snippet_roundtrip() {
        let msg = Message::assistant("answer").with_sources(vec![SourceSnippet {
            kind: "sheet".to_string(),
            content: "Incidents 2024, row 17".to_string(),
            relevance_score: 0.82,
        }]);

        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"sheet\""));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
