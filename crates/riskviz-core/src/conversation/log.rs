//! The append-only conversation log.

use super::message::Message;

/// An ordered, append-only log of conversation messages.
///
/// Messages can be appended and the whole log can be cleared; individual
/// messages are never mutated or removed. Appending preserves submission
/// order, which is what keeps user/assistant pairs contiguous.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log from previously persisted messages, preserving order.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Appends a message to the end of the log.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Discards the entire log.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// The ordered messages in the log.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recently appended message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut log = ConversationLog::new();
        log.append(Message::user("first"));
        log.append(Message::assistant("second"));

        let contents: Vec<&str> = log.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert_eq!(log.last().unwrap().content, "second");
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut log = ConversationLog::from_messages(vec![Message::user("q")]);
        assert_eq!(log.len(), 1);

        log.clear();
        assert!(log.is_empty());
    }
}
