//! Terminal surfaces for the message list and the media drawer.
//!
//! Extents are measured in terminal rows. A message takes one header row,
//! one row per body line, and one more for a date divider when its date
//! differs from the node above it.

use std::time::{Duration, Instant};

use crate::model::{MediaItem, Message};
use crate::render::{MessageSurface, RenderAdapter, ScrollAlign, ScrollMetrics};

/// Row height of a node given the node rendered above it.
pub trait RowExtent {
    /// Rows this node occupies.
    fn rows(&self, above: Option<&Self>) -> u64;
}

impl RowExtent for Message {
    fn rows(&self, above: Option<&Self>) -> u64 {
        let divider = u64::from(above.map_or(true, |prev| prev.date != self.date));
        let body = self.display_text().lines().count().max(1) as u64;
        let attachment = u64::from(self.is_media);
        divider + 1 + body + attachment
    }
}

impl RowExtent for MediaItem {
    fn rows(&self, _above: Option<&Self>) -> u64 {
        1
    }
}

/// Node list rendered into a scrolling terminal panel.
#[derive(Debug, Clone)]
pub struct TuiSurface<T> {
    items: Vec<T>,
    scroll_top: u64,
    viewport: u64,
    highlight: Option<(usize, Instant)>,
}

impl<T> Default for TuiSurface<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            scroll_top: 0,
            viewport: 0,
            highlight: None,
        }
    }
}

impl<T: RowExtent + Clone> TuiSurface<T> {
    /// Nodes, first to last.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Current scroll offset in rows.
    pub const fn scroll_top(&self) -> u64 {
        self.scroll_top
    }

    /// Set the number of visible rows.
    pub fn set_viewport(&mut self, rows: u64) {
        self.viewport = rows;
        self.scroll_top = self.scroll_top.min(self.max_scroll());
    }

    /// Current scroll geometry.
    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(self.scroll_top, self.viewport, self.content_rows())
    }

    /// Scroll by `delta` rows, clamped to the content.
    pub fn scroll_by(&mut self, delta: i64) {
        let target = self.scroll_top.saturating_add_signed(delta);
        self.scroll_top = target.min(self.max_scroll());
    }

    /// Original index of the highlighted node, while the highlight lasts.
    pub fn highlighted(&self, now: Instant) -> Option<usize> {
        self.highlight
            .filter(|(_, until)| now < *until)
            .map(|(index, _)| index)
    }

    fn heights(&self) -> impl Iterator<Item = u64> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| item.rows(i.checked_sub(1).map(|p| &self.items[p])))
    }

    fn content_rows(&self) -> u64 {
        self.heights().sum()
    }

    fn max_scroll(&self) -> u64 {
        self.content_rows().saturating_sub(self.viewport)
    }

    fn rows_before(&self, count: usize) -> u64 {
        self.heights().take(count).sum()
    }
}

impl<T: RowExtent + Clone> RenderAdapter<T> for TuiSurface<T> {
    fn replace(&mut self, items: &[T]) {
        self.items = items.to_vec();
        self.scroll_top = 0;
    }

    fn prepend(&mut self, items: &[T]) {
        let before = self.content_rows();
        self.items.splice(0..0, items.iter().cloned());
        self.scroll_top += self.content_rows() - before;
    }

    fn append(&mut self, items: &[T]) {
        self.items.extend_from_slice(items);
    }
}

impl MessageSurface for TuiSurface<Message> {
    fn scroll_to_end(&mut self) {
        self.scroll_top = self.max_scroll();
    }

    fn scroll_into_view(&mut self, original_index: usize, align: ScrollAlign) {
        let Some(pos) = self.items.iter().position(|m| m.original_index == original_index) else {
            return;
        };
        let top = self.rows_before(pos);
        let height = self.heights().nth(pos).unwrap_or(1);
        let target = match align {
            ScrollAlign::Start => top,
            ScrollAlign::Center => (top + height / 2).saturating_sub(self.viewport / 2),
            ScrollAlign::End => (top + height).saturating_sub(self.viewport),
        };
        self.scroll_top = target.min(self.max_scroll());
    }

    fn highlight_transient(&mut self, original_index: usize, duration: Duration) {
        self.highlight = Some((original_index, Instant::now() + duration));
    }

    fn leading_extent(&self, count: usize) -> u64 {
        let removed = self.rows_before(count);
        // The new first node gains the divider it shared with the removed ones
        match (count.checked_sub(1).and_then(|p| self.items.get(p)), self.items.get(count)) {
            (Some(prev), Some(next)) => removed + next.rows(Some(prev)) - next.rows(None),
            _ => removed,
        }
    }

    fn remove_first(&mut self, count: usize) {
        self.items.drain(..count.min(self.items.len()));
    }

    fn remove_last(&mut self, count: usize) {
        let keep = self.items.len().saturating_sub(count);
        self.items.truncate(keep);
    }

    fn shift_scroll(&mut self, delta: i64) {
        self.scroll_top = self
            .scroll_top
            .saturating_add_signed(delta)
            .min(self.max_scroll());
    }
}
