//! Headless surface that keeps its nodes in memory.

use std::time::Duration;

use super::{MessageSurface, RenderAdapter, ScrollAlign, ScrollMetrics};
use crate::model::Message;

/// A request received by a [`MemorySurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOp {
    /// `replace` with this many items.
    Replace(usize),
    /// `prepend` with this many items.
    Prepend(usize),
    /// `append` with this many items.
    Append(usize),
    /// `remove_first(n)`.
    RemoveFirst(usize),
    /// `remove_last(n)`.
    RemoveLast(usize),
    /// `scroll_to_end`.
    ScrollToEnd,
    /// `scroll_into_view(index, align)`.
    ScrollIntoView(usize, ScrollAlign),
    /// `highlight_transient(index, duration)`.
    Highlight(usize, Duration),
    /// `shift_scroll(delta)`.
    ShiftScroll(i64),
}

/// In-memory node list where every node has the same extent.
#[derive(Debug, Clone)]
pub struct MemorySurface<T> {
    items: Vec<T>,
    node_extent: u64,
    viewport: u64,
    scroll_top: u64,
    ops: Vec<RenderOp>,
}

impl<T: Clone> MemorySurface<T> {
    /// Create a surface whose nodes are `node_extent` units tall, shown
    /// through a viewport of `viewport` units.
    #[must_use]
    pub const fn new(node_extent: u64, viewport: u64) -> Self {
        Self {
            items: Vec::new(),
            node_extent,
            viewport,
            scroll_top: 0,
            ops: Vec::new(),
        }
    }

    /// Current nodes, first to last.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Requests received so far.
    #[must_use]
    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    /// Forget the recorded requests.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Current scroll geometry.
    #[must_use]
    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(self.scroll_top, self.viewport, self.content_extent())
    }

    /// Move the viewport to an absolute offset, clamped to the content.
    pub fn scroll_to(&mut self, offset: u64) {
        self.scroll_top = offset.min(self.max_scroll());
    }

    fn content_extent(&self) -> u64 {
        self.items.len() as u64 * self.node_extent
    }

    fn max_scroll(&self) -> u64 {
        self.content_extent().saturating_sub(self.viewport)
    }
}

impl<T: Clone> RenderAdapter<T> for MemorySurface<T> {
    fn replace(&mut self, items: &[T]) {
        self.items = items.to_vec();
        self.scroll_top = 0;
        self.ops.push(RenderOp::Replace(items.len()));
    }

    fn prepend(&mut self, items: &[T]) {
        self.items.splice(0..0, items.iter().cloned());
        // Keep the previously visible node in place
        self.scroll_top += items.len() as u64 * self.node_extent;
        self.ops.push(RenderOp::Prepend(items.len()));
    }

    fn append(&mut self, items: &[T]) {
        self.items.extend_from_slice(items);
        self.ops.push(RenderOp::Append(items.len()));
    }
}

impl MessageSurface for MemorySurface<Message> {
    fn scroll_to_end(&mut self) {
        self.scroll_top = self.max_scroll();
        self.ops.push(RenderOp::ScrollToEnd);
    }

    fn scroll_into_view(&mut self, original_index: usize, align: ScrollAlign) {
        if let Some(pos) = self.items.iter().position(|m| m.original_index == original_index) {
            let node_top = pos as u64 * self.node_extent;
            let target = match align {
                ScrollAlign::Start => node_top,
                ScrollAlign::Center => {
                    (node_top + self.node_extent / 2).saturating_sub(self.viewport / 2)
                }
                ScrollAlign::End => (node_top + self.node_extent).saturating_sub(self.viewport),
            };
            self.scroll_to(target);
        }
        self.ops.push(RenderOp::ScrollIntoView(original_index, align));
    }

    fn highlight_transient(&mut self, original_index: usize, duration: Duration) {
        self.ops.push(RenderOp::Highlight(original_index, duration));
    }

    fn leading_extent(&self, count: usize) -> u64 {
        count.min(self.items.len()) as u64 * self.node_extent
    }

    fn remove_first(&mut self, count: usize) {
        let count = count.min(self.items.len());
        self.items.drain(..count);
        self.ops.push(RenderOp::RemoveFirst(count));
    }

    fn remove_last(&mut self, count: usize) {
        let keep = self.items.len().saturating_sub(count);
        self.items.truncate(keep);
        self.scroll_top = self.scroll_top.min(self.max_scroll());
        self.ops.push(RenderOp::RemoveLast(count));
    }

    fn shift_scroll(&mut self, delta: i64) {
        self.scroll_top = self.scroll_top.saturating_add_signed(delta).min(self.max_scroll());
        self.ops.push(RenderOp::ShiftScroll(delta));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(range: std::ops::Range<usize>) -> Vec<Message> {
        range
            .map(|i| Message::new("1/2/23", "09:00", "A", format!("m{i}"), i))
            .collect()
    }

    #[test]
    fn test_prepend_keeps_anchor() {
        let mut surface = MemorySurface::new(10, 100);
        surface.replace(&messages(10..20));
        surface.prepend(&messages(0..10));

        assert_eq!(surface.len(), 20);
        assert_eq!(surface.metrics().scroll_top, 100);
        assert_eq!(surface.items()[0].original_index, 0);
    }

    #[test]
    fn test_remove_first_then_shift() {
        let mut surface = MemorySurface::new(10, 50);
        surface.replace(&messages(0..20));
        surface.scroll_to(120);

        let extent = surface.leading_extent(5);
        surface.remove_first(5);
        surface.shift_scroll(-(extent as i64));

        assert_eq!(extent, 50);
        assert_eq!(surface.metrics().scroll_top, 70);
        assert_eq!(surface.items()[0].original_index, 5);
    }

    #[test]
    fn test_scroll_into_view_centers() {
        let mut surface = MemorySurface::new(10, 40);
        surface.replace(&messages(0..50));
        surface.scroll_into_view(25, ScrollAlign::Center);

        // node 25 spans 250..260, center 255, viewport half 20
        assert_eq!(surface.metrics().scroll_top, 235);
    }
}
