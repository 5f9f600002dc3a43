//! Controllers for the active chat, wired together.
//!
//! [`Viewer`] owns the registry and one instance of each controller. Front
//! ends forward user input to it and pass in their surfaces; it keeps the
//! window, media drawer and search overlay consistent with each other.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, ViewerError};
use crate::media::MediaPager;
use crate::model::{ChatDocument, MediaItem, MediaTab};
use crate::registry::ChatRegistry;
use crate::render::{MessageSurface, RenderAdapter, ScrollMetrics};
use crate::search::{SearchController, SearchHit, SearchUpdate};
use crate::window::{PageOutcome, ViewMode, WindowController};

/// Snapshot of what is materialized for the active chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderWindow {
    /// First materialized message.
    pub msg_start: usize,
    /// One past the last materialized message.
    pub msg_end: usize,
    /// Next media entry to load.
    pub media_cursor: usize,
    /// Whether the search overlay is active.
    pub is_searching: bool,
    /// Whether the window was entered through a jump.
    pub is_history_view: bool,
}

/// The viewer core: registry plus controllers for one active chat.
#[derive(Debug)]
pub struct Viewer {
    registry: ChatRegistry,
    config: Config,
    active: Option<String>,
    window: WindowController,
    media: MediaPager,
    search: SearchController,
}

impl Viewer {
    /// Create a viewer over a loaded registry.
    #[must_use]
    pub fn new(registry: ChatRegistry, config: Config) -> Self {
        Self {
            window: WindowController::new(config.window.clone()),
            media: MediaPager::new(config.media.clone()),
            search: SearchController::new(config.search.clone()),
            registry,
            config,
            active: None,
        }
    }

    /// The chat registry.
    #[must_use]
    pub const fn registry(&self) -> &ChatRegistry {
        &self.registry
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Identifier of the open chat.
    #[must_use]
    pub fn active_chat(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The open chat's document.
    #[must_use]
    pub fn document(&self) -> Option<&Arc<ChatDocument>> {
        self.window.document()
    }

    /// The message window controller.
    #[must_use]
    pub const fn window(&self) -> &WindowController {
        &self.window
    }

    /// The media pager.
    #[must_use]
    pub const fn media(&self) -> &MediaPager {
        &self.media
    }

    /// Hits of the last search.
    #[must_use]
    pub fn search_results(&self) -> &[SearchHit] {
        self.search.results()
    }

    /// Last query that ran.
    #[must_use]
    pub fn search_query(&self) -> &str {
        self.search.query()
    }

    /// Current state, if a chat is open.
    #[must_use]
    pub fn render_window(&self) -> Option<RenderWindow> {
        self.active.as_ref()?;
        let (msg_start, msg_end) = self.window.bounds();
        Some(RenderWindow {
            msg_start,
            msg_end,
            media_cursor: self.media.cursor(),
            is_searching: self.window.mode() == ViewMode::Searching,
            is_history_view: self.window.mode() == ViewMode::HistoryView,
        })
    }

    /// Open a chat at its tail with the image tab loaded.
    pub fn open(
        &mut self,
        chat_id: &str,
        messages: &mut impl MessageSurface,
        media: &mut impl RenderAdapter<MediaItem>,
    ) -> Result<()> {
        let doc = self.registry.require(chat_id)?;
        info!(chat = chat_id, messages = doc.len(), "Opening chat");

        self.search.reset();
        self.window.open(Arc::clone(&doc), messages);
        self.media.open(doc, media);
        self.active = Some(chat_id.to_string());
        Ok(())
    }

    /// Close the open chat.
    pub fn close(&mut self) {
        self.search.reset();
        self.window.close();
        self.media.close();
        self.active = None;
    }

    /// Forward a message-list scroll.
    pub fn on_message_scroll(
        &mut self,
        metrics: ScrollMetrics,
        surface: &mut impl MessageSurface,
    ) -> Option<PageOutcome> {
        self.window.on_scroll(metrics, surface)
    }

    /// Load older messages.
    pub fn scroll_near_top(&mut self, surface: &mut impl MessageSurface) -> Option<PageOutcome> {
        self.window.scroll_near_top(surface)
    }

    /// Load newer messages.
    pub fn scroll_near_bottom(&mut self, surface: &mut impl MessageSurface) -> Option<PageOutcome> {
        self.window.scroll_near_bottom(surface)
    }

    /// Forward a media drawer scroll.
    pub fn on_media_scroll(
        &mut self,
        metrics: ScrollMetrics,
        surface: &mut impl RenderAdapter<MediaItem>,
    ) -> Option<usize> {
        self.media.on_scroll(metrics, surface)
    }

    /// Load the next media page.
    pub fn load_media_page(&mut self, surface: &mut impl RenderAdapter<MediaItem>) -> usize {
        self.media.load_next_page(false, surface)
    }

    /// Switch the media drawer tab.
    pub fn switch_tab(&mut self, tab: MediaTab, surface: &mut impl RenderAdapter<MediaItem>) {
        self.media.switch_tab(tab, surface);
    }

    /// Queue a search keystroke.
    pub fn search_input(&mut self, query: impl Into<String>, now: Instant) {
        if self.active.is_some() {
            self.search.input(query, now);
        }
    }

    /// Whether a search keystroke is waiting on the debounce.
    #[must_use]
    pub fn search_pending(&self) -> bool {
        self.search.is_pending()
    }

    /// Run a debounced query whose delay has elapsed.
    pub fn poll_search(
        &mut self,
        now: Instant,
        surface: &mut impl MessageSurface,
    ) -> Result<Option<SearchUpdate>> {
        let Some(doc) = self.window.document().cloned() else {
            return Ok(None);
        };
        let update = self.search.poll(now, &doc)?;
        if let Some(update) = update {
            self.after_search(update, surface)?;
        }
        Ok(update)
    }

    /// Run a query immediately.
    pub fn search_now(&mut self, query: &str, surface: &mut impl MessageSurface) -> Result<SearchUpdate> {
        let doc = self.window.document().cloned().ok_or(ViewerError::NoChatOpen)?;
        let update = self.search.submit(query, &doc)?;
        self.after_search(update, surface)?;
        Ok(update)
    }

    fn after_search(&mut self, update: SearchUpdate, surface: &mut impl MessageSurface) -> Result<()> {
        match update {
            SearchUpdate::Cleared => self.window.exit_search(surface),
            SearchUpdate::Results(count) => {
                debug!(count, query = self.search.query(), "Search results ready");
                self.window.enter_search()
            }
        }
    }

    /// Leave search and reopen the chat at its tail.
    pub fn cancel_search(&mut self, surface: &mut impl MessageSurface) -> Result<()> {
        self.search.reset();
        self.window.exit_search(surface)
    }

    /// Jump to the message behind search hit `hit`.
    pub fn select_result(&mut self, hit: usize, surface: &mut impl MessageSurface) -> Result<()> {
        let index = self
            .search
            .results()
            .get(hit)
            .map(|h| h.original_index)
            .ok_or_else(|| ViewerError::IndexOutOfRange {
                index: hit,
                total: self.search.results().len(),
            })?;
        self.search.reset();
        self.window.jump_to(index, surface)
    }

    /// Recenter on a message.
    pub fn jump_to(&mut self, index: usize, surface: &mut impl MessageSurface) -> Result<()> {
        self.search.reset();
        self.window.jump_to(index, surface)
    }

    /// Reopen the chat at its tail.
    pub fn jump_to_latest(&mut self, surface: &mut impl MessageSurface) -> Result<()> {
        self.search.reset();
        self.window.jump_to_latest(surface)
    }

    /// Whether to offer "jump to latest".
    #[must_use]
    pub fn show_jump_to_latest(&self, metrics: ScrollMetrics) -> bool {
        self.window.show_jump_to_latest(metrics)
    }
}
