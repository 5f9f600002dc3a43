//! Transcript parsing for exported chat logs.
//!
//! An export is a line-oriented text log where every message starts with a
//! header of the form
//!
//! ```text
//! [D/M/Y, H:M[:S]] sender: body
//! ```
//!
//! and any following non-header lines continue the body. Attachments are
//! referenced inline with `<attached: filename>`. The parser makes a single
//! forward pass with one open accumulator and produces a [`ChatDocument`]:
//! messages in order, plus the attachments that exist on disk grouped by kind.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashSet;
//! use chatlog_viewer::parser::TranscriptParser;
//!
//! let raw = "[1/2/23, 09:00] Alice: hi\n[1/2/23, 09:01] Bob: <attached: photo.jpg>";
//! let inventory: HashSet<String> = ["photo.jpg".to_string()].into_iter().collect();
//!
//! let mut parser = TranscriptParser::new();
//! let doc = parser.parse(raw, "Alice", &inventory);
//!
//! assert_eq!(doc.messages.len(), 2);
//! assert_eq!(doc.media.images.len(), 1);
//! assert_eq!(parser.stats().attachments, 1);
//! ```
//!
//! Malformed input never fails: lines before the first header are dropped,
//! and attachments missing from the inventory are flagged on the message
//! instead of being indexed.

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument, trace};

use crate::error::{Result, ViewerError};
use crate::model::{ChatDocument, MediaItem, MediaStore, MediaType, Message};
use crate::util::media_location;

/// Set of filenames known to exist in a chat folder.
pub type Inventory = HashSet<String>;

/// Compiled patterns for the transcript grammar.
struct TranscriptPatterns {
    /// `[date, time] sender: content`
    header: Regex,
    /// `<attached: filename>`
    attachment: Regex,
}

impl TranscriptPatterns {
    fn new() -> Self {
        Self {
            header: Regex::new(
                r"^\[(\d{1,2}/\d{1,2}/\d{2,4}),\s*(\d{1,2}:\d{1,2}(?::\d{1,2})?)\]\s*(.*?):\s*(.*)$",
            )
            .unwrap(),
            attachment: Regex::new(r"<attached: (.*?)>").unwrap(),
        }
    }
}

static PATTERNS: Lazy<TranscriptPatterns> = Lazy::new(TranscriptPatterns::new);

/// Statistics about a parse run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Total lines scanned.
    pub lines_processed: usize,
    /// Lines that opened a new message.
    pub headers: usize,
    /// Lines appended to an open message.
    pub continuations: usize,
    /// Lines before the first header, discarded.
    pub dropped_lines: usize,
    /// Attachments found in the inventory and indexed.
    pub attachments: usize,
    /// Attachments referenced but absent from the inventory.
    pub missing_attachments: usize,
}

/// Message under construction while scanning lines.
struct Accumulator {
    message: Message,
    /// Set once the attachment marker has been resolved against the
    /// inventory, so later continuation lines cannot index it twice.
    attachment_resolved: bool,
}

/// Single-pass transcript parser.
#[derive(Debug, Default)]
pub struct TranscriptParser {
    stats: ParseStats,
}

impl TranscriptParser {
    /// Create a new parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics from the last parse.
    #[must_use]
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Parse a transcript file from disk.
    ///
    /// Read failures are reported as [`ViewerError::TranscriptUnavailable`]
    /// for `chat_id`.
    #[instrument(skip(self, inventory), fields(path = %path.as_ref().display()))]
    pub fn parse_file(
        &mut self,
        path: impl AsRef<Path>,
        chat_id: &str,
        inventory: &Inventory,
    ) -> Result<ChatDocument> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ViewerError::transcript(chat_id, e))?;
        Ok(self.parse(&raw, chat_id, inventory))
    }

    /// Parse raw transcript text belonging to `chat_id`.
    #[instrument(skip(self, raw, inventory), fields(chat = chat_id, bytes = raw.len()))]
    pub fn parse(&mut self, raw: &str, chat_id: &str, inventory: &Inventory) -> ChatDocument {
        self.stats = ParseStats::default();

        let mut messages = Vec::new();
        let mut media = MediaStore::default();
        let mut current: Option<Accumulator> = None;

        // `lines` also strips the `\r` of CRLF terminators
        for line in raw.lines() {
            self.stats.lines_processed += 1;
            let clean = strip_invisible_prefix(line);

            if let Some(caps) = PATTERNS.header.captures(clean) {
                if let Some(done) = current.take() {
                    messages.push(finish(done, messages.len()));
                }
                self.stats.headers += 1;

                let mut acc = Accumulator {
                    message: Message::new(
                        &caps[1],
                        &caps[2],
                        caps[3].trim(),
                        caps[4].trim(),
                        0,
                    ),
                    attachment_resolved: false,
                };
                self.check_attachment(&mut acc, chat_id, inventory, &mut media);
                current = Some(acc);
            } else if let Some(acc) = current.as_mut() {
                self.stats.continuations += 1;
                acc.message.text.push('\n');
                acc.message.text.push_str(clean.trim());
                self.check_attachment(acc, chat_id, inventory, &mut media);
            } else {
                self.stats.dropped_lines += 1;
                trace!(line = self.stats.lines_processed, "Dropping line outside any message");
            }
        }

        if let Some(done) = current.take() {
            messages.push(finish(done, messages.len()));
        }

        debug!(
            messages = messages.len(),
            images = media.images.len(),
            videos = media.videos.len(),
            docs = media.docs.len(),
            dropped = self.stats.dropped_lines,
            missing = self.stats.missing_attachments,
            "Transcript parsed"
        );

        ChatDocument { messages, media }
    }

    /// Re-check the accumulator for an attachment marker after its text changed.
    fn check_attachment(
        &mut self,
        acc: &mut Accumulator,
        chat_id: &str,
        inventory: &Inventory,
        media: &mut MediaStore,
    ) {
        let msg = &mut acc.message;
        let Some(caps) = PATTERNS.attachment.captures(&msg.text) else {
            return;
        };

        let marker = caps.get(0).map_or("", |m| m.as_str());
        let filename = caps[1].trim().to_string();
        msg.is_media = true;
        msg.clean_text = Some(msg.text.replacen(marker, "", 1).trim().to_string());

        if acc.attachment_resolved {
            return;
        }
        acc.attachment_resolved = true;
        msg.filename = Some(filename.clone());

        if !inventory.contains(&filename) {
            msg.is_missing = true;
            self.stats.missing_attachments += 1;
            debug!(chat = chat_id, %filename, "Attachment missing from inventory");
            return;
        }

        let extension = extension_of(&filename);
        let kind = MediaType::from_extension(&extension);
        msg.media_type = Some(kind);
        media.push(
            kind,
            MediaItem {
                path: media_location(chat_id, &filename),
                filename,
                extension,
                is_missing: false,
            },
        );
        self.stats.attachments += 1;
    }
}

/// Parse a transcript with a file list as inventory.
pub fn parse_chat(raw: &str, chat_id: &str, files: &[String]) -> ChatDocument {
    let inventory: Inventory = files.iter().cloned().collect();
    TranscriptParser::new().parse(raw, chat_id, &inventory)
}

fn finish(acc: Accumulator, index: usize) -> Message {
    let mut message = acc.message;
    message.original_index = index;
    message
}

/// Whether `c` is one of the invisible formatting characters exporters
/// prepend to lines (zero-width, directional marks, embeddings, isolates, BOM).
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}' | '\u{FEFF}'
    )
}

/// Strip the leading run of whitespace and invisible control characters.
#[must_use]
pub fn strip_invisible_prefix(line: &str) -> &str {
    line.trim_start_matches(|c: char| c.is_whitespace() || is_invisible(c))
}

/// Lower-cased text after the last `.`, or the whole name when there is none.
fn extension_of(filename: &str) -> String {
    filename.rsplit('.').next().unwrap_or_default().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn inventory(files: &[&str]) -> Inventory {
        files.iter().map(|f| (*f).to_string()).collect()
    }

    const TWO_LINE: &str = "[1/2/23, 09:00] Alice: hi\n[1/2/23, 09:01] Bob: <attached: photo.jpg>";

    #[test]
    fn test_parse_empty() {
        let mut parser = TranscriptParser::new();
        let doc = parser.parse("", "chat", &Inventory::new());
        assert!(doc.messages.is_empty());
        assert!(doc.media.is_empty());
    }

    #[test]
    fn test_attachment_present() {
        let mut parser = TranscriptParser::new();
        let doc = parser.parse(TWO_LINE, "chat", &inventory(&["photo.jpg"]));

        assert_eq!(doc.messages.len(), 2);
        let bob = &doc.messages[1];
        assert!(bob.is_media);
        assert!(!bob.is_missing);
        assert_eq!(bob.media_type, Some(MediaType::Image));
        assert_eq!(bob.filename.as_deref(), Some("photo.jpg"));
        assert_eq!(bob.clean_text.as_deref(), Some(""));

        assert_eq!(doc.media.images.len(), 1);
        assert_eq!(doc.media.images[0].filename, "photo.jpg");
        assert_eq!(doc.media.images[0].path, "chat/photo.jpg");
        assert!(doc.media.videos.is_empty());
        assert!(doc.media.docs.is_empty());
    }

    #[test]
    fn test_attachment_missing() {
        let mut parser = TranscriptParser::new();
        let doc = parser.parse(TWO_LINE, "chat", &Inventory::new());

        let bob = &doc.messages[1];
        assert!(bob.is_media);
        assert!(bob.is_missing);
        assert_eq!(bob.media_type, None);
        assert!(doc.media.is_empty());
        assert_eq!(parser.stats().missing_attachments, 1);
    }

    #[test]
    fn test_continuation_lines() {
        let raw = "[1/2/23, 09:00] Alice: first\n  second line  \nthird\n[1/2/23, 09:05] Bob: ok";
        let doc = parse_chat(raw, "chat", &[]);

        assert_eq!(doc.messages.len(), 2);
        assert_eq!(doc.messages[0].text, "first\nsecond line\nthird");
        assert_eq!(doc.messages[1].text, "ok");
    }

    #[test]
    fn test_trailing_newline_not_appended() {
        let doc = parse_chat("[1/2/23, 09:00] Alice: hi\n[1/2/23, 09:01] Bob: bye\n", "chat", &[]);
        assert_eq!(doc.messages.len(), 2);
        assert_eq!(doc.messages[1].text, "bye");
    }

    #[test]
    fn test_leading_orphans_dropped() {
        let raw = "Messages are end-to-end encrypted.\n\n[1/2/23, 09:00] Alice: hi";
        let mut parser = TranscriptParser::new();
        let doc = parser.parse(raw, "chat", &Inventory::new());

        assert_eq!(doc.messages.len(), 1);
        assert_eq!(doc.messages[0].text, "hi");
        assert_eq!(parser.stats().dropped_lines, 2);
    }

    #[test]
    fn test_invisible_prefix_stripped() {
        let raw = "\u{200E}[1/2/23, 09:00] Alice: \u{200E}<attached: clip.MP4>";
        let doc = parse_chat(raw, "chat", &["clip.MP4".to_string()]);

        assert_eq!(doc.messages.len(), 1);
        assert_eq!(doc.messages[0].media_type, Some(MediaType::Video));
        assert_eq!(doc.media.videos[0].extension, "mp4");
    }

    #[test]
    fn test_crlf_and_seconds() {
        let raw = "[01/02/2023, 09:00:15] Alice: hi\r\n[01/02/2023, 09:00:20] Bob: yo\r\n";
        let doc = parse_chat(raw, "chat", &[]);

        assert_eq!(doc.messages.len(), 2);
        assert_eq!(doc.messages[0].time, "09:00:15");
        assert_eq!(doc.messages[0].text, "hi");
        assert_eq!(doc.messages[1].date, "01/02/2023");
    }

    #[test]
    fn test_marker_on_continuation_line_with_caption() {
        let raw = "[1/2/23, 09:00] Alice: look at this\n<attached: report.PDF>\nnice, right?";
        let mut parser = TranscriptParser::new();
        let doc = parser.parse(raw, "My Chat", &inventory(&["report.PDF"]));

        let msg = &doc.messages[0];
        assert!(msg.is_media);
        assert_eq!(msg.media_type, Some(MediaType::Doc));
        assert_eq!(msg.clean_text.as_deref(), Some("look at this\n\nnice, right?"));
        // Indexed exactly once even though the marker is re-seen on the last line
        assert_eq!(doc.media.docs.len(), 1);
        assert_eq!(doc.media.docs[0].path, "My%20Chat/report.PDF");
        assert_eq!(doc.media.docs[0].extension, "pdf");
        assert_eq!(parser.stats().attachments, 1);
    }

    #[test]
    fn test_original_index_contiguous() {
        let raw = (0..25)
            .map(|i| format!("[1/2/23, 09:{:02}] User{}: message {}", i % 60, i % 3, i))
            .collect::<Vec<_>>()
            .join("\n");
        let doc = parse_chat(&raw, "chat", &[]);

        let indexes: Vec<usize> = doc.messages.iter().map(|m| m.original_index).collect();
        assert_eq!(indexes, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_sender_with_colon_in_body() {
        let doc = parse_chat("[1/2/23, 09:00] Alice: time is 10:30: late", "chat", &[]);
        assert_eq!(doc.messages[0].sender, "Alice");
        assert_eq!(doc.messages[0].text, "time is 10:30: late");
    }

    #[test]
    fn test_extension_without_dot_is_doc() {
        let doc = parse_chat("[1/2/23, 09:00] Alice: <attached: README>", "chat", &["README".to_string()]);
        assert_eq!(doc.messages[0].media_type, Some(MediaType::Doc));
        assert_eq!(doc.media.docs[0].extension, "readme");
    }
}
