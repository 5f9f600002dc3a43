//! Windowed message controller.
//!
//! Only a contiguous slice `[msg_start, msg_end)` of the open chat is
//! materialized on the surface. Scrolling near either edge grows the slice by
//! one chunk and then prunes the opposite edge back under the
//! materialization ceiling. Jumping to a message replaces the slice with one
//! centered on the target.
//!
//! ```text
//!            open / exit search / jump to latest
//!   Idle ───────────────────────────────▶ Windowed ◀──┐
//!                                          │   ▲       │ bottom extension
//!                              enter search│   │exit   │ reaches the tail
//!                                          ▼   │       │
//!                                        Searching ──▶ HistoryView
//!                                               jump to
//! ```
//!
//! Every transition that rebuilds the slice bumps a generation counter.
//! Extensions are planned as a [`PageRequest`] tagged with the generation and
//! the edge they were computed against, and applying a request whose tag no
//! longer matches is refused. Two scroll callbacks racing for the same edge
//! therefore extend it once.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace};

use crate::config::WindowConfig;
use crate::error::{Result, ViewerError};
use crate::model::{ChatDocument, Message};
use crate::render::{MessageSurface, ScrollAlign, ScrollMetrics};

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// No chat open.
    #[default]
    Idle,
    /// Normal paging, entered from the tail.
    Windowed,
    /// Search overlay; paging suspended.
    Searching,
    /// Paging after a jump, until the window reaches the tail again.
    HistoryView,
}

impl ViewMode {
    /// Short label for status lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Windowed => "windowed",
            Self::Searching => "search",
            Self::HistoryView => "history",
        }
    }
}

/// Side of the window being extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Older messages, before `msg_start`.
    Top,
    /// Newer messages, after `msg_end`.
    Bottom,
}

/// A planned one-chunk extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    generation: u64,
    edge: Edge,
    /// First message to fetch.
    pub start: usize,
    /// One past the last message to fetch.
    pub end: usize,
}

impl PageRequest {
    /// Edge this request extends.
    #[must_use]
    pub const fn edge(&self) -> Edge {
        self.edge
    }

    /// Number of messages it adds.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether it adds nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Result of applying a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// The window grew by `added` and lost `pruned` from the other side.
    Extended {
        /// Messages materialized.
        added: usize,
        /// Messages pruned from the opposite edge.
        pruned: usize,
    },
    /// The window moved on since the request was planned.
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct Highlight {
    index: usize,
    until: Instant,
}

/// Controller for the materialized message slice of one chat.
#[derive(Debug, Clone)]
pub struct WindowController {
    config: WindowConfig,
    doc: Option<Arc<ChatDocument>>,
    msg_start: usize,
    msg_end: usize,
    mode: ViewMode,
    generation: u64,
    highlight: Option<Highlight>,
}

impl WindowController {
    /// Create an idle controller.
    #[must_use]
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            doc: None,
            msg_start: 0,
            msg_end: 0,
            mode: ViewMode::Idle,
            generation: 0,
            highlight: None,
        }
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Window bounds `(msg_start, msg_end)`.
    #[must_use]
    pub const fn bounds(&self) -> (usize, usize) {
        (self.msg_start, self.msg_end)
    }

    /// Messages in the open chat.
    #[must_use]
    pub fn total(&self) -> usize {
        self.doc.as_ref().map_or(0, |d| d.len())
    }

    /// Current generation; changes whenever the slice is rebuilt.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The open chat, if any.
    #[must_use]
    pub fn document(&self) -> Option<&Arc<ChatDocument>> {
        self.doc.as_ref()
    }

    /// The materialized slice, `messages[msg_start..msg_end]`.
    #[must_use]
    pub fn materialized(&self) -> &[Message] {
        match &self.doc {
            Some(doc) => doc.slice(self.msg_start, self.msg_end),
            None => &[],
        }
    }

    /// Message whose jump highlight is still active.
    #[must_use]
    pub fn highlighted(&self) -> Option<usize> {
        self.highlight
            .filter(|h| Instant::now() < h.until)
            .map(|h| h.index)
    }

    /// Show the last chunk of `doc` and scroll to the end.
    pub fn open(&mut self, doc: Arc<ChatDocument>, surface: &mut impl MessageSurface) {
        let total = doc.len();
        self.generation += 1;
        self.mode = ViewMode::Windowed;
        self.highlight = None;
        self.msg_end = total;
        self.msg_start = total.saturating_sub(self.config.chunk_size);
        self.doc = Some(doc);

        surface.replace(self.materialized());
        surface.scroll_to_end();
        debug!(
            start = self.msg_start,
            end = self.msg_end,
            generation = self.generation,
            "Window opened"
        );
    }

    /// Drop the open chat.
    pub fn close(&mut self) {
        self.generation += 1;
        self.doc = None;
        self.mode = ViewMode::Idle;
        self.msg_start = 0;
        self.msg_end = 0;
        self.highlight = None;
    }

    /// Plan a one-chunk extension at `edge`.
    ///
    /// Returns `None` when the edge is already at the document boundary, no
    /// chat is open, or search is active.
    #[must_use]
    pub fn plan(&self, edge: Edge) -> Option<PageRequest> {
        if matches!(self.mode, ViewMode::Idle | ViewMode::Searching) {
            return None;
        }

        let chunk = self.config.chunk_size;
        let (start, end) = match edge {
            Edge::Top if self.msg_start > 0 => {
                (self.msg_start.saturating_sub(chunk), self.msg_start)
            }
            Edge::Bottom if self.msg_end < self.total() => {
                (self.msg_end, (self.msg_end + chunk).min(self.total()))
            }
            _ => return None,
        };

        Some(PageRequest {
            generation: self.generation,
            edge,
            start,
            end,
        })
    }

    /// Apply a planned extension, then prune the opposite edge.
    pub fn apply(&mut self, request: PageRequest, surface: &mut impl MessageSurface) -> PageOutcome {
        let still_valid = request.generation == self.generation
            && !matches!(self.mode, ViewMode::Idle | ViewMode::Searching)
            && match request.edge {
                Edge::Top => request.end == self.msg_start,
                Edge::Bottom => request.start == self.msg_end,
            };
        if !still_valid {
            trace!(?request, generation = self.generation, "Discarding stale page request");
            return PageOutcome::Stale;
        }

        let Some(doc) = self.doc.clone() else {
            return PageOutcome::Stale;
        };
        let page = doc.slice(request.start, request.end);
        let added = page.len();

        let pruned = match request.edge {
            Edge::Top => {
                surface.prepend(page);
                self.msg_start = request.start;
                self.prune(Edge::Bottom, added, surface)
            }
            Edge::Bottom => {
                surface.append(page);
                self.msg_end = request.end;
                let pruned = self.prune(Edge::Top, added, surface);
                if self.mode == ViewMode::HistoryView && self.msg_end == doc.len() {
                    debug!("Window reached the tail, leaving history view");
                    self.mode = ViewMode::Windowed;
                }
                pruned
            }
        };

        debug!(
            edge = ?request.edge,
            added,
            pruned,
            start = self.msg_start,
            end = self.msg_end,
            "Window extended"
        );
        PageOutcome::Extended { added, pruned }
    }

    /// Load one older chunk.
    pub fn scroll_near_top(&mut self, surface: &mut impl MessageSurface) -> Option<PageOutcome> {
        let request = self.plan(Edge::Top)?;
        Some(self.apply(request, surface))
    }

    /// Load one newer chunk.
    pub fn scroll_near_bottom(&mut self, surface: &mut impl MessageSurface) -> Option<PageOutcome> {
        let request = self.plan(Edge::Bottom)?;
        Some(self.apply(request, surface))
    }

    /// React to a scroll position change.
    ///
    /// At the very top an older chunk is loaded; otherwise, within the
    /// near-bottom threshold, a newer one. Ignored while searching.
    pub fn on_scroll(
        &mut self,
        metrics: ScrollMetrics,
        surface: &mut impl MessageSurface,
    ) -> Option<PageOutcome> {
        if metrics.is_at_top() {
            if let Some(outcome) = self.scroll_near_top(surface) {
                return Some(outcome);
            }
        }
        if metrics.is_near_bottom(self.config.near_bottom_threshold) {
            return self.scroll_near_bottom(surface);
        }
        None
    }

    /// Trim the materialized slice back under the ceiling.
    ///
    /// `shrink` names the edge nodes are removed from. At most
    /// `added + chunk_size` nodes go in one step, and the highlighted jump
    /// target is kept while its highlight lasts.
    fn prune(&mut self, shrink: Edge, added: usize, surface: &mut impl MessageSurface) -> usize {
        let count = self.msg_end - self.msg_start;
        if count <= self.config.max_materialized {
            return 0;
        }

        let mut excess = (count - self.config.max_materialized).min(added + self.config.chunk_size);
        let protected = self
            .highlighted()
            .filter(|&i| i >= self.msg_start && i < self.msg_end);

        match shrink {
            Edge::Bottom => {
                if let Some(target) = protected {
                    excess = excess.min(self.msg_end - target - 1);
                }
                if excess == 0 {
                    return 0;
                }
                surface.remove_last(excess);
                self.msg_end -= excess;
            }
            Edge::Top => {
                if let Some(target) = protected {
                    excess = excess.min(target - self.msg_start);
                }
                if excess == 0 {
                    return 0;
                }
                let extent = surface.leading_extent(excess);
                surface.remove_first(excess);
                surface.shift_scroll(-i64::try_from(extent).unwrap_or(i64::MAX));
                self.msg_start += excess;
            }
        }

        trace!(edge = ?shrink, removed = excess, "Pruned window");
        excess
    }

    /// Recenter the window on `index` and highlight it.
    pub fn jump_to(&mut self, index: usize, surface: &mut impl MessageSurface) -> Result<()> {
        let doc = self.doc.clone().ok_or(ViewerError::NoChatOpen)?;
        let total = doc.len();
        if index >= total {
            return Err(ViewerError::IndexOutOfRange { index, total });
        }

        let (start, end) = jump_window(index, total, self.config.chunk_size);
        self.generation += 1;
        self.mode = ViewMode::HistoryView;
        self.msg_start = start;
        self.msg_end = end;

        surface.replace(self.materialized());
        surface.scroll_into_view(index, ScrollAlign::Center);
        let duration = self.config.highlight();
        surface.highlight_transient(index, duration);
        self.highlight = Some(Highlight {
            index,
            until: Instant::now() + duration,
        });

        debug!(index, start, end, "Jumped to message");
        Ok(())
    }

    /// Reopen at the tail.
    pub fn jump_to_latest(&mut self, surface: &mut impl MessageSurface) -> Result<()> {
        let doc = self.doc.clone().ok_or(ViewerError::NoChatOpen)?;
        self.open(doc, surface);
        Ok(())
    }

    /// Suspend paging for the search overlay.
    pub fn enter_search(&mut self) -> Result<()> {
        if self.doc.is_none() {
            return Err(ViewerError::NoChatOpen);
        }
        if self.mode != ViewMode::Searching {
            self.generation += 1;
            self.mode = ViewMode::Searching;
            debug!("Entered search");
        }
        Ok(())
    }

    /// Leave the search overlay by reopening the chat at the tail.
    pub fn exit_search(&mut self, surface: &mut impl MessageSurface) -> Result<()> {
        if self.mode != ViewMode::Searching {
            return Ok(());
        }
        debug!("Leaving search");
        self.jump_to_latest(surface)
    }

    /// Whether the window ends near the last message and the viewport is
    /// near the physical bottom.
    #[must_use]
    pub fn is_at_tail(&self, metrics: ScrollMetrics) -> bool {
        let near_end = self.msg_end >= self.total().saturating_sub(self.config.tail_tolerance);
        let near_bottom = metrics.distance_from_bottom() < self.config.bottom_distance;
        near_end && near_bottom
    }

    /// Whether a "jump to latest" affordance should be offered.
    #[must_use]
    pub fn show_jump_to_latest(&self, metrics: ScrollMetrics) -> bool {
        match self.mode {
            ViewMode::Idle | ViewMode::Searching => false,
            ViewMode::Windowed | ViewMode::HistoryView => !self.is_at_tail(metrics),
        }
    }
}

/// Window of `chunk` messages centered on `index`, clamped to `[0, total]`.
///
/// When the natural end is clipped by `total` the start is pulled back so the
/// full width is kept whenever `total >= chunk`.
#[must_use]
pub fn jump_window(index: usize, total: usize, chunk: usize) -> (usize, usize) {
    let mut start = index.saturating_sub(chunk / 2);
    let end = (start + chunk).min(total);
    if end - start < chunk && start > 0 {
        start = end.saturating_sub(chunk);
    }
    (start, end)
}
