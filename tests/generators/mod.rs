//! Synthetic transcript generators.
//!
//! Builds export folders of arbitrary size for tests that need more
//! messages than the checked-in fixtures hold.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate};

/// Shape of a generated transcript.
#[derive(Debug, Clone)]
pub struct TranscriptConfig {
    /// Number of messages.
    pub messages: usize,
    /// Senders, used round-robin.
    pub senders: Vec<String>,
    /// Every Nth message carries an image attachment.
    pub attachment_every: Option<usize>,
    /// Every Nth message spans two lines.
    pub multiline_every: Option<usize>,
    /// Messages per calendar day.
    pub per_day: usize,
    /// Date of the first message.
    pub start: NaiveDate,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            messages: 100,
            senders: vec!["Alice".to_string(), "John Doe".to_string()],
            attachment_every: None,
            multiline_every: None,
            per_day: 100,
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        }
    }
}

impl TranscriptConfig {
    /// A chat of `messages` plain messages.
    pub fn plain(messages: usize) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// A chat with attachments and multi-line messages mixed in.
    pub fn mixed(messages: usize) -> Self {
        Self {
            messages,
            attachment_every: Some(10),
            multiline_every: Some(7),
            ..Default::default()
        }
    }
}

/// A generated transcript and the attachment files it references.
#[derive(Debug, Clone)]
pub struct GeneratedChat {
    /// Raw `_chat.txt` content.
    pub raw: String,
    /// Attachment file names.
    pub files: Vec<String>,
}

/// Generate a transcript.
pub fn transcript(config: &TranscriptConfig) -> GeneratedChat {
    let mut lines = Vec::with_capacity(config.messages);
    let mut files = Vec::new();

    for i in 0..config.messages {
        let date = config.start + Duration::days((i / config.per_day.max(1)) as i64);
        let sender = &config.senders[i % config.senders.len()];
        let time = format!("{:02}:{:02}", (i / 60) % 24, i % 60);

        let mut body = match config.attachment_every {
            Some(n) if i % n == n - 1 => {
                let name = format!("IMG-{i:05}.jpg");
                let body = format!("<attached: {name}> pic {i}");
                files.push(name);
                body
            }
            _ => format!("message {i}"),
        };
        if matches!(config.multiline_every, Some(n) if i % n == n - 1) {
            body.push_str(&format!("\nsecond line {i}"));
        }

        lines.push(format!("[{}, {time}] {sender}: {body}", date.format("%-d/%-m/%y")));
    }

    GeneratedChat {
        raw: lines.join("\n"),
        files,
    }
}

/// Write a chat folder under `root`, creating each attachment as an empty file.
pub fn write_chat(root: &Path, id: &str, chat: &GeneratedChat) {
    let dir = root.join(id);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("_chat.txt"), &chat.raw).unwrap();
    for file in &chat.files {
        fs::write(dir.join(file), b"").unwrap();
    }
}
