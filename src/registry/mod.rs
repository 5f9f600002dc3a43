//! Registry of parsed chats.
//!
//! The registry is populated once from a directory listing and read many
//! times afterwards. Each chat is parsed exactly once; documents are handed
//! out as `Arc<ChatDocument>` so controllers can hold on to the active chat
//! without borrowing the registry.
//!
//! A chat whose transcript cannot be read is logged and left out. Loading
//! never fails as a whole.

use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::discovery::{ChatDirectory, ChatFolder};
use crate::error::{Result, ViewerError};
use crate::model::ChatDocument;
use crate::parser::TranscriptParser;
use crate::timestamp::{self, UNPARSEABLE};
use crate::util::truncate_preview;

/// Sidebar entry for one chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatSummary {
    /// Chat identifier.
    pub id: String,
    /// Normalized instant of the final message, or the sentinel when
    /// the chat is empty or its date is unparseable.
    pub timestamp: i64,
    /// Preview of the final message body.
    pub preview: String,
    /// Date of the final message as written in the transcript.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_date: Option<String>,
    /// Number of messages in the chat.
    pub messages: usize,
    /// Number of attachments indexed.
    pub media: usize,
}

/// Owned map of chat identifier to parsed document.
#[derive(Debug, Clone, Default)]
pub struct ChatRegistry {
    chats: IndexMap<String, Arc<ChatDocument>>,
    /// Chats omitted because their transcript could not be loaded.
    failed: Vec<String>,
}

impl ChatRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every listed chat in parallel.
    #[instrument(skip_all, fields(root = %dir.root().display(), chats = folders.len()))]
    pub fn load(dir: &ChatDirectory, folders: &[ChatFolder]) -> Self {
        let results: Vec<(String, Result<ChatDocument>)> = folders
            .par_iter()
            .map(|folder| {
                let mut parser = TranscriptParser::new();
                let doc = parser.parse_file(
                    dir.transcript_path(&folder.id),
                    &folder.id,
                    &folder.inventory(),
                );
                (folder.id.clone(), doc)
            })
            .collect();

        Self::from_results(results)
    }

    /// Build a registry from per-chat load results, in listing order.
    pub fn from_results(results: impl IntoIterator<Item = (String, Result<ChatDocument>)>) -> Self {
        let mut registry = Self::new();
        for (id, result) in results {
            match result {
                Ok(doc) => registry.insert(id, doc),
                Err(e) => {
                    warn!(chat = %id, error = %e, "Failed to load chat");
                    registry.failed.push(id);
                }
            }
        }

        info!(
            loaded = registry.len(),
            failed = registry.failed.len(),
            "Chat registry populated"
        );
        registry
    }

    /// Add a parsed chat. The first document stored under an id wins.
    pub fn insert(&mut self, id: impl Into<String>, doc: ChatDocument) {
        let id = id.into();
        if self.chats.contains_key(&id) {
            debug!(chat = %id, "Chat already registered, keeping first parse");
            return;
        }
        self.chats.insert(id, Arc::new(doc));
    }

    /// Look up a chat.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<ChatDocument>> {
        self.chats.get(id).cloned()
    }

    /// Look up a chat, failing when it is not registered.
    pub fn require(&self, id: &str) -> Result<Arc<ChatDocument>> {
        self.get(id).ok_or_else(|| ViewerError::ChatNotFound {
            chat_id: id.to_string(),
        })
    }

    /// Whether a chat is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.chats.contains_key(id)
    }

    /// Number of registered chats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chats.len()
    }

    /// Whether no chats are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }

    /// Identifiers of chats that failed to load.
    #[must_use]
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// Chat identifiers in listing order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.chats.keys().map(String::as_str)
    }

    /// Summaries sorted by recency of the final message, newest first.
    ///
    /// Ties keep listing order. Previews are cut at `preview_len` characters.
    #[must_use]
    pub fn summaries(&self, preview_len: usize) -> Vec<ChatSummary> {
        let mut summaries: Vec<ChatSummary> = self
            .chats
            .iter()
            .map(|(id, doc)| summarize(id, doc, preview_len))
            .collect();
        summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        summaries
    }
}

fn summarize(id: &str, doc: &ChatDocument, preview_len: usize) -> ChatSummary {
    let last = doc.last_message();
    ChatSummary {
        id: id.to_string(),
        timestamp: last.map_or(UNPARSEABLE, |m| timestamp::normalize(&m.date, &m.time)),
        preview: last.map(|m| truncate_preview(&m.text, preview_len)).unwrap_or_default(),
        last_date: last.map(|m| m.date.clone()),
        messages: doc.len(),
        media: doc.media.total(),
    }
}

/// Keep the summaries whose chat name contains `query`, ignoring case.
///
/// An empty query keeps everything.
#[must_use]
pub fn filter_contacts<'a>(summaries: &'a [ChatSummary], query: &str) -> Vec<&'a ChatSummary> {
    let needle = query.to_lowercase();
    summaries
        .iter()
        .filter(|s| s.id.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_chat;
    use pretty_assertions::assert_eq;

    fn registry() -> ChatRegistry {
        ChatRegistry::from_results(vec![
            (
                "Alice".to_string(),
                Ok(parse_chat("[1/2/23, 09:00] Alice: older", "Alice", &[])),
            ),
            (
                "Bob".to_string(),
                Ok(parse_chat("[5/6/24, 10:00] Bob: newer", "Bob", &[])),
            ),
            (
                "Broken".to_string(),
                Err(ViewerError::transcript(
                    "Broken",
                    std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                )),
            ),
            ("Empty".to_string(), Ok(ChatDocument::default())),
        ])
    }

    #[test]
    fn test_failed_chats_are_omitted() {
        let reg = registry();
        assert_eq!(reg.len(), 3);
        assert!(!reg.contains("Broken"));
        assert_eq!(reg.failed(), &["Broken".to_string()]);
        assert!(matches!(reg.require("Broken"), Err(ViewerError::ChatNotFound { .. })));
    }

    #[test]
    fn test_summaries_sorted_by_recency() {
        let ids: Vec<String> = registry().summaries(50).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["Bob", "Alice", "Empty"]);
    }

    #[test]
    fn test_preview_truncated() {
        let mut reg = ChatRegistry::new();
        let body = "x".repeat(60);
        reg.insert("Long", parse_chat(&format!("[1/2/23, 09:00] A: {body}"), "Long", &[]));

        let summary = &reg.summaries(50)[0];
        assert_eq!(summary.preview, format!("{}...", "x".repeat(50)));
        assert_eq!(summary.last_date.as_deref(), Some("1/2/23"));
    }

    #[test]
    fn test_filter_contacts() {
        let summaries = registry().summaries(50);
        let hits: Vec<&str> = filter_contacts(&summaries, "b").iter().map(|s| s.id.as_str()).collect();
        assert_eq!(hits, vec!["Bob"]);
        assert_eq!(filter_contacts(&summaries, "").len(), 3);
    }

    #[test]
    fn test_first_insert_wins() {
        let mut reg = ChatRegistry::new();
        reg.insert("A", parse_chat("[1/2/23, 09:00] A: one", "A", &[]));
        reg.insert("A", ChatDocument::default());
        assert_eq!(reg.require("A").unwrap().len(), 1);
    }
}
