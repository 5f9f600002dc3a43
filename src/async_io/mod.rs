//! Async transcript loading.
//!
//! Transcripts are read concurrently with tokio and parsed synchronously once
//! the bytes are in memory. Parsing is CPU-bound and cheap next to the read,
//! so it runs inline rather than on a blocking pool.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::instrument;

use crate::discovery::{ChatDirectory, ChatFolder};
use crate::error::{Result, ViewerError};
use crate::model::ChatDocument;
use crate::parser::{Inventory, TranscriptParser};
use crate::registry::ChatRegistry;

/// Async reader for one chat transcript.
pub struct AsyncTranscriptReader {
    path: PathBuf,
    chat_id: String,
}

impl AsyncTranscriptReader {
    /// Create a reader for the transcript of `chat_id` at `path`.
    pub fn new(path: impl AsRef<Path>, chat_id: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            chat_id: chat_id.into(),
        }
    }

    /// Read the raw transcript text.
    pub async fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .await
            .map_err(|e| ViewerError::transcript(&self.chat_id, e))
    }

    /// Read and parse the transcript.
    pub async fn parse(&self, inventory: &Inventory) -> Result<ChatDocument> {
        let raw = self.read().await?;

        // Parse synchronously (CPU-bound operation)
        let mut parser = TranscriptParser::new();
        Ok(parser.parse(&raw, &self.chat_id, inventory))
    }

    /// Stream transcript lines.
    pub async fn stream_lines(&self) -> Result<impl futures::Stream<Item = Result<String>>> {
        let file = fs::File::open(&self.path)
            .await
            .map_err(|e| ViewerError::transcript(&self.chat_id, e))?;

        let lines = BufReader::new(file).lines();

        Ok(futures::stream::unfold(lines, |mut lines| async move {
            match lines.next_line().await {
                Ok(Some(line)) => Some((Ok(line), lines)),
                Ok(None) => None,
                Err(e) => Some((Err(ViewerError::io("Failed to read line", e)), lines)),
            }
        }))
    }
}

/// Read and parse every listed chat concurrently.
///
/// Results come back in listing order.
pub async fn parse_chats_concurrent(
    dir: &ChatDirectory,
    folders: &[ChatFolder],
) -> Vec<(String, Result<ChatDocument>)> {
    let futures = folders.iter().map(|folder| async move {
        let reader = AsyncTranscriptReader::new(dir.transcript_path(&folder.id), &folder.id);
        (folder.id.clone(), reader.parse(&folder.inventory()).await)
    });

    join_all(futures).await
}

impl ChatRegistry {
    /// Populate a registry by reading transcripts concurrently.
    #[instrument(skip_all, fields(root = %dir.root().display(), chats = folders.len()))]
    pub async fn load_async(dir: &ChatDirectory, folders: &[ChatFolder]) -> Self {
        Self::from_results(parse_chats_concurrent(dir, folders).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tempfile::tempdir;

    fn write_chat(root: &Path, id: &str, body: &str) {
        let folder = root.join(id);
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join(crate::TRANSCRIPT_FILE_NAME), body).unwrap();
    }

    #[tokio::test]
    async fn test_load_async_skips_unreadable() {
        let dir = tempdir().unwrap();
        write_chat(dir.path(), "Alice", "[1/2/23, 09:00] Alice: hi");

        let root = ChatDirectory::from_path(dir.path()).unwrap();
        let folders = vec![
            ChatFolder::new("Alice", vec![]),
            ChatFolder::new("Ghost", vec![]),
        ];

        let registry = ChatRegistry::load_async(&root, &folders).await;
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.failed(), &["Ghost".to_string()]);
    }

    #[tokio::test]
    async fn test_stream_lines() {
        let dir = tempdir().unwrap();
        write_chat(dir.path(), "Bob", "[1/2/23, 09:00] Bob: one\ntwo\n");

        let root = ChatDirectory::from_path(dir.path()).unwrap();
        let reader = AsyncTranscriptReader::new(root.transcript_path("Bob"), "Bob");
        let lines: Vec<String> = reader
            .stream_lines()
            .await
            .unwrap()
            .map(|l| l.unwrap())
            .collect()
            .await;

        assert_eq!(lines, vec!["[1/2/23, 09:00] Bob: one", "two"]);
    }

    #[tokio::test]
    async fn test_missing_transcript_error() {
        let reader = AsyncTranscriptReader::new("/nonexistent/_chat.txt", "Nobody");
        let err = reader.parse(&Inventory::new()).await.unwrap_err();
        assert!(matches!(err, ViewerError::TranscriptUnavailable { .. }));
    }
}
