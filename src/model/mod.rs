//! Data model for parsed chat exports.
//!
//! A [`ChatDocument`] is the immutable result of parsing one chat folder: the
//! ordered [`Message`] sequence plus the attachments it references, grouped
//! by kind into a [`MediaStore`]. Documents are built once by the parser and
//! shared read-only through the registry afterwards.

pub mod media;
pub mod message;

pub use media::*;
pub use message::*;

use serde::{Deserialize, Serialize};

/// A fully parsed chat: messages in transcript order plus classified media.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatDocument {
    /// Messages in parse order. `messages[i].original_index == i`.
    pub messages: Vec<Message>,
    /// Attachments that exist on disk, grouped by kind.
    pub media: MediaStore,
}

impl ChatDocument {
    /// Number of messages in the chat.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the chat has no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The final message, used for recency ranking and list previews.
    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Get the messages in `[start, end)`, clamped to the document bounds.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> &[Message] {
        let end = end.min(self.messages.len());
        let start = start.min(end);
        &self.messages[start..end]
    }

    /// Look up a message by its stable index.
    #[must_use]
    pub fn get(&self, original_index: usize) -> Option<&Message> {
        self.messages.get(original_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(count: usize) -> ChatDocument {
        ChatDocument {
            messages: (0..count)
                .map(|i| Message::new("1/2/23", "09:00", "Alice", format!("msg {i}"), i))
                .collect(),
            media: MediaStore::default(),
        }
    }

    #[test]
    fn test_slice_is_clamped() {
        let doc = doc_with(5);
        assert_eq!(doc.slice(3, 10).len(), 2);
        assert!(doc.slice(7, 9).is_empty());
        assert!(doc.slice(4, 2).is_empty());
    }

    #[test]
    fn test_last_message() {
        assert!(doc_with(0).last_message().is_none());
        assert_eq!(doc_with(3).last_message().map(|m| m.original_index), Some(2));
    }
}
