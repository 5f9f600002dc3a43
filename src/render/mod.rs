//! Render adapter contract.
//!
//! Controllers never touch a display directly. They issue requests through
//! the traits in this module and the front end decides what a node, a scroll
//! position, or a highlight looks like. [`MemorySurface`] is a headless
//! implementation used by the command line views and the tests.

mod memory;

pub use memory::{MemorySurface, RenderOp};

use std::time::Duration;

use crate::model::Message;

/// Where a message should land when scrolled into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollAlign {
    /// Top edge of the viewport.
    Start,
    /// Middle of the viewport.
    #[default]
    Center,
    /// Bottom edge of the viewport.
    End,
}

/// A visible node list of `T` that can be replaced or grown at either end.
pub trait RenderAdapter<T> {
    /// Replace every node with `items`.
    fn replace(&mut self, items: &[T]);

    /// Insert `items` before the first node, keeping the visible position
    /// anchored on the content the user was looking at.
    fn prepend(&mut self, items: &[T]);

    /// Insert `items` after the last node.
    fn append(&mut self, items: &[T]);

    /// Remove every node.
    fn clear(&mut self) {
        self.replace(&[]);
    }
}

/// The message list surface, with the scroll and pruning hooks the window
/// controller needs.
pub trait MessageSurface: RenderAdapter<Message> {
    /// Scroll to the physical end of the list.
    fn scroll_to_end(&mut self);

    /// Bring the node for `original_index` into view.
    fn scroll_into_view(&mut self, original_index: usize, align: ScrollAlign);

    /// Highlight the node for `original_index` for `duration`.
    fn highlight_transient(&mut self, original_index: usize, duration: Duration);

    /// Aggregate extent of the first `count` nodes, in surface units.
    fn leading_extent(&self, count: usize) -> u64;

    /// Remove the first `count` nodes.
    fn remove_first(&mut self, count: usize);

    /// Remove the last `count` nodes.
    fn remove_last(&mut self, count: usize);

    /// Move the scroll offset by `delta` surface units.
    fn shift_scroll(&mut self, delta: i64);
}

/// Scroll geometry of a surface, in surface units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    /// Offset of the viewport from the start of the content.
    pub scroll_top: u64,
    /// Height of the viewport.
    pub viewport: u64,
    /// Height of the whole content.
    pub content: u64,
}

impl ScrollMetrics {
    /// Create from raw measurements.
    #[must_use]
    pub const fn new(scroll_top: u64, viewport: u64, content: u64) -> Self {
        Self {
            scroll_top,
            viewport,
            content,
        }
    }

    /// Distance between the bottom of the viewport and the end of the content.
    #[must_use]
    pub const fn distance_from_bottom(&self) -> u64 {
        self.content.saturating_sub(self.scroll_top + self.viewport)
    }

    /// Whether the viewport sits at the very start of the content.
    #[must_use]
    pub const fn is_at_top(&self) -> bool {
        self.scroll_top == 0
    }

    /// Whether the viewport is within `threshold` of the end.
    #[must_use]
    pub const fn is_near_bottom(&self, threshold: u64) -> bool {
        self.distance_from_bottom() <= threshold
    }

    /// Whether the content is taller than the viewport.
    #[must_use]
    pub const fn overflows(&self) -> bool {
        self.content > self.viewport
    }
}
