//! Attachment references and their per-kind indexes.

use serde::{Deserialize, Serialize};

/// Extensions classified as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Extensions classified as videos.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];

/// Attachment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Still image.
    Image,
    /// Video clip.
    Video,
    /// Anything else.
    Doc,
}

impl MediaType {
    /// Classify a lower-cased file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        if IMAGE_EXTENSIONS.contains(&ext) {
            Self::Image
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            Self::Video
        } else {
            Self::Doc
        }
    }

    /// The media drawer tab that lists this kind.
    #[must_use]
    pub const fn tab(self) -> MediaTab {
        match self {
            Self::Image => MediaTab::Images,
            Self::Video => MediaTab::Videos,
            Self::Doc => MediaTab::Docs,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
            Self::Doc => write!(f, "doc"),
        }
    }
}

/// Tabs of the media drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaTab {
    /// Image grid.
    #[default]
    Images,
    /// Video grid.
    Videos,
    /// Document list.
    Docs,
}

impl MediaTab {
    /// All tabs in display order.
    pub const ALL: [Self; 3] = [Self::Images, Self::Videos, Self::Docs];

    /// Tab title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Images => "Images",
            Self::Videos => "Videos",
            Self::Docs => "Docs",
        }
    }

    /// Whether the tab lays items out as a grid rather than a list.
    #[must_use]
    pub const fn is_grid(self) -> bool {
        matches!(self, Self::Images | Self::Videos)
    }
}

/// A reference to an attachment file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// Percent-escaped `chat/filename` location. Opaque once built.
    pub path: String,
    /// File name as referenced in the transcript.
    pub filename: String,
    /// Lower-cased extension.
    pub extension: String,
    /// Whether the file is absent from the inventory.
    #[serde(default)]
    pub is_missing: bool,
}

/// Attachments grouped by kind, each list in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaStore {
    /// Image attachments.
    pub images: Vec<MediaItem>,
    /// Video attachments.
    pub videos: Vec<MediaItem>,
    /// Document attachments.
    pub docs: Vec<MediaItem>,
}

impl MediaStore {
    /// Append an item to the list for `kind`.
    pub fn push(&mut self, kind: MediaType, item: MediaItem) {
        match kind {
            MediaType::Image => self.images.push(item),
            MediaType::Video => self.videos.push(item),
            MediaType::Doc => self.docs.push(item),
        }
    }

    /// The list shown by a drawer tab.
    #[must_use]
    pub fn list(&self, tab: MediaTab) -> &[MediaItem] {
        match tab {
            MediaTab::Images => &self.images,
            MediaTab::Videos => &self.videos,
            MediaTab::Docs => &self.docs,
        }
    }

    /// Total number of attachments across all kinds.
    #[must_use]
    pub fn total(&self) -> usize {
        self.images.len() + self.videos.len() + self.docs.len()
    }

    /// Whether no attachments were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(MediaType::from_extension("jpeg"), MediaType::Image);
        assert_eq!(MediaType::from_extension("webp"), MediaType::Image);
        assert_eq!(MediaType::from_extension("mkv"), MediaType::Video);
        assert_eq!(MediaType::from_extension("pdf"), MediaType::Doc);
        assert_eq!(MediaType::from_extension(""), MediaType::Doc);
    }

    #[test]
    fn test_store_routes_by_kind() {
        let mut store = MediaStore::default();
        let item = MediaItem {
            path: "chat/a.mov".to_string(),
            filename: "a.mov".to_string(),
            extension: "mov".to_string(),
            is_missing: false,
        };
        store.push(MediaType::Video, item.clone());

        assert_eq!(store.list(MediaTab::Videos), &[item]);
        assert!(store.list(MediaTab::Images).is_empty());
        assert_eq!(store.total(), 1);
    }
}
