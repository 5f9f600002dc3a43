//! A single logical utterance from a chat transcript.

use serde::{Deserialize, Serialize};

use super::media::MediaType;

/// One message as it appeared in the transcript.
///
/// `date` and `time` are kept verbatim for display; only the timestamp
/// normalizer interprets them. `text` is the raw accumulated body and may
/// still contain the attachment marker, while `clean_text` holds the caption
/// with the marker removed and is only populated for media messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Date as written in the header (`D/M/Y`).
    pub date: String,
    /// Time as written in the header (`H:M[:S]`).
    pub time: String,
    /// Sender name.
    pub sender: String,
    /// Raw body, possibly multi-line.
    pub text: String,
    /// Body with the attachment marker stripped (media messages only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_text: Option<String>,
    /// Position in parse order; the only stable handle across views.
    pub original_index: usize,
    /// Whether the body references an attachment.
    #[serde(default)]
    pub is_media: bool,
    /// Whether the referenced attachment is absent from the inventory.
    #[serde(default)]
    pub is_missing: bool,
    /// Attachment classification, when present on disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    /// Attachment filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl Message {
    /// Create a plain text message.
    pub fn new(
        date: impl Into<String>,
        time: impl Into<String>,
        sender: impl Into<String>,
        text: impl Into<String>,
        original_index: usize,
    ) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            sender: sender.into(),
            text: text.into(),
            original_index,
            ..Self::default()
        }
    }

    /// Text suitable for display: the caption for media messages, the raw
    /// body otherwise.
    #[must_use]
    pub fn display_text(&self) -> &str {
        match (&self.clean_text, self.is_media) {
            (Some(clean), true) => clean,
            _ => &self.text,
        }
    }

    /// Whether this message carries an attachment that can be shown.
    #[must_use]
    pub fn has_available_media(&self) -> bool {
        self.is_media && !self.is_missing && self.media_type.is_some()
    }

    /// Whether `name` identifies the sender as the viewer's own account.
    #[must_use]
    pub fn is_from(&self, name: &str) -> bool {
        !name.is_empty() && self.sender.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text_prefers_caption() {
        let mut msg = Message::new("1/2/23", "09:01", "Bob", "<attached: a.jpg> look", 1);
        assert_eq!(msg.display_text(), "<attached: a.jpg> look");

        msg.is_media = true;
        msg.clean_text = Some("look".to_string());
        assert_eq!(msg.display_text(), "look");
    }

    #[test]
    fn test_is_from() {
        let msg = Message::new("1/2/23", "09:01", "John Doe (work)", "hi", 0);
        assert!(msg.is_from("John Doe"));
        assert!(!msg.is_from("Jane"));
        assert!(!msg.is_from(""));
    }

    #[test]
    fn test_serializes_camel_case() {
        let msg = Message::new("1/2/23", "09:01", "Bob", "hi", 4);
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"originalIndex\":4"));
        assert!(!json.contains("cleanText"));
    }
}
