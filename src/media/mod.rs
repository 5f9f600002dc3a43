//! Media drawer pagination.
//!
//! The drawer shows one tab (images, videos or documents) at a time and
//! loads it a page at a time as the user scrolls. Entries flagged missing
//! consume a slot in the page but are not rendered.

use std::sync::Arc;

use tracing::debug;

use crate::config::MediaConfig;
use crate::model::{ChatDocument, MediaItem, MediaTab};
use crate::render::{RenderAdapter, ScrollMetrics};

/// Per-chat cursor over the active media tab.
#[derive(Debug, Clone)]
pub struct MediaPager {
    config: MediaConfig,
    doc: Option<Arc<ChatDocument>>,
    tab: MediaTab,
    cursor: usize,
}

impl MediaPager {
    /// Create a pager with no chat.
    #[must_use]
    pub fn new(config: MediaConfig) -> Self {
        Self {
            config,
            doc: None,
            tab: MediaTab::default(),
            cursor: 0,
        }
    }

    /// Active tab.
    #[must_use]
    pub const fn tab(&self) -> MediaTab {
        self.tab
    }

    /// Position of the next entry to load.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Entries in the active tab.
    #[must_use]
    pub fn items(&self) -> &[MediaItem] {
        match &self.doc {
            Some(doc) => doc.media.list(self.tab),
            None => &[],
        }
    }

    /// Whether every entry of the active tab has been loaded.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.items().len()
    }

    /// Start on the image tab of `doc` and load the first page.
    pub fn open(&mut self, doc: Arc<ChatDocument>, surface: &mut impl RenderAdapter<MediaItem>) {
        self.doc = Some(doc);
        self.tab = MediaTab::Images;
        self.load_next_page(true, surface);
    }

    /// Forget the chat.
    pub fn close(&mut self) {
        self.doc = None;
        self.cursor = 0;
        self.tab = MediaTab::default();
    }

    /// Show another tab from its first page.
    pub fn switch_tab(&mut self, tab: MediaTab, surface: &mut impl RenderAdapter<MediaItem>) {
        self.tab = tab;
        self.load_next_page(true, surface);
    }

    /// Load the next page of the active tab.
    ///
    /// With `reset` the surface is cleared and the cursor rewound first.
    /// Returns the number of entries rendered.
    pub fn load_next_page(&mut self, reset: bool, surface: &mut impl RenderAdapter<MediaItem>) -> usize {
        if reset {
            surface.clear();
            self.cursor = 0;
        }

        let Some(doc) = self.doc.clone() else {
            return 0;
        };
        let list = doc.media.list(self.tab);
        if self.cursor >= list.len() {
            return 0;
        }

        let end = (self.cursor + self.config.chunk_size).min(list.len());
        let page: Vec<MediaItem> = list[self.cursor..end]
            .iter()
            .filter(|item| !item.is_missing)
            .cloned()
            .collect();

        if !page.is_empty() {
            surface.append(&page);
        }
        debug!(
            tab = self.tab.title(),
            from = self.cursor,
            to = end,
            rendered = page.len(),
            "Media page loaded"
        );
        self.cursor = end;
        page.len()
    }

    /// Load another page when the drawer overflows and is scrolled near its end.
    pub fn on_scroll(
        &mut self,
        metrics: ScrollMetrics,
        surface: &mut impl RenderAdapter<MediaItem>,
    ) -> Option<usize> {
        if metrics.overflows() && metrics.is_near_bottom(self.config.near_bottom_threshold) {
            Some(self.load_next_page(false, surface))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MediaStore, MediaType};
    use crate::render::{MemorySurface, RenderOp};
    use pretty_assertions::assert_eq;

    fn item(name: &str, missing: bool) -> MediaItem {
        MediaItem {
            path: format!("chat/{name}"),
            filename: name.to_string(),
            extension: "jpg".to_string(),
            is_missing: missing,
        }
    }

    fn doc(images: usize) -> Arc<ChatDocument> {
        let mut media = MediaStore::default();
        for i in 0..images {
            media.push(MediaType::Image, item(&format!("img{i}.jpg"), i == 1));
        }
        media.push(MediaType::Doc, item("notes.pdf", false));
        Arc::new(ChatDocument {
            messages: Vec::new(),
            media,
        })
    }

    #[test]
    fn test_pages_advance_and_stop() {
        let mut pager = MediaPager::new(MediaConfig::default());
        let mut surface = MemorySurface::new(1, 10);
        pager.open(doc(70), &mut surface);

        // Entry 1 is missing: consumed but not rendered
        assert_eq!(pager.cursor(), 30);
        assert_eq!(surface.len(), 29);

        assert_eq!(pager.load_next_page(false, &mut surface), 30);
        assert_eq!(pager.load_next_page(false, &mut surface), 10);
        assert_eq!(pager.cursor(), 70);
        assert!(pager.is_exhausted());

        surface.clear_ops();
        assert_eq!(pager.load_next_page(false, &mut surface), 0);
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_switch_tab_resets() {
        let mut pager = MediaPager::new(MediaConfig::default());
        let mut surface = MemorySurface::new(1, 10);
        pager.open(doc(5), &mut surface);
        pager.switch_tab(MediaTab::Docs, &mut surface);

        assert_eq!(pager.tab(), MediaTab::Docs);
        assert_eq!(pager.cursor(), 1);
        assert_eq!(surface.items(), &[item("notes.pdf", false)]);
        assert_eq!(
            &surface.ops()[surface.ops().len() - 2..],
            &[RenderOp::Replace(0), RenderOp::Append(1)]
        );

        pager.switch_tab(MediaTab::Videos, &mut surface);
        assert!(surface.is_empty());
        assert!(pager.is_exhausted());
    }

    #[test]
    fn test_scroll_trigger_needs_overflow() {
        let mut pager = MediaPager::new(MediaConfig::default());
        let mut surface = MemorySurface::new(1, 10);
        pager.open(doc(70), &mut surface);

        assert!(pager.on_scroll(ScrollMetrics::new(0, 500, 400), &mut surface).is_none());
        assert!(pager.on_scroll(ScrollMetrics::new(0, 100, 1000), &mut surface).is_none());
        assert_eq!(pager.on_scroll(ScrollMetrics::new(750, 100, 1000), &mut surface), Some(30));
    }
}
