//! TUI application state.

use std::time::Instant;

use tracing::debug;

use crate::config::Config;
use crate::model::{MediaItem, MediaTab, Message};
use crate::registry::{filter_contacts, ChatRegistry, ChatSummary};
use crate::search::SearchUpdate;
use crate::viewer::Viewer;

use super::surface::TuiSurface;
use super::theme::Theme;

/// Rows taken by borders, the input bar and the status bar.
const CHROME_ROWS: u16 = 6;

/// Which panel receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Chat list.
    Chats,
    /// Message list or search results.
    Messages,
    /// Media drawer.
    Media,
}

/// What typed characters go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Keys are commands.
    None,
    /// Chat list filter.
    Filter,
    /// In-chat search query.
    Search,
}

/// Application state.
pub struct AppState {
    /// Viewer core.
    pub viewer: Viewer,
    /// Chat list, most recent first.
    summaries: Vec<ChatSummary>,
    /// Chat list filter text.
    pub filter: String,
    /// Selected row in the filtered chat list.
    pub chat_selected: usize,
    /// Focused panel.
    pub focus: Focus,
    /// Where typed characters go.
    pub input_mode: InputMode,
    /// Search box contents.
    pub search_input: String,
    /// Selected search hit.
    pub result_selected: usize,
    /// Message panel.
    pub messages: TuiSurface<Message>,
    /// Media drawer panel.
    pub media: TuiSurface<MediaItem>,
    /// Current theme.
    pub theme: Theme,
    /// Show help overlay.
    pub show_help: bool,
    /// One-line status shown until the next key press.
    pub status_message: Option<String>,
}

impl AppState {
    /// Create state over a loaded registry.
    pub fn new(registry: ChatRegistry, config: Config) -> Self {
        let summaries = registry.summaries(config.display.preview_len);
        let theme = Theme::from_name(&config.display.theme).unwrap_or_default();
        let status_message = (!registry.failed().is_empty())
            .then(|| format!("Could not read: {}", registry.failed().join(", ")));

        Self {
            viewer: Viewer::new(registry, config.in_rows()),
            summaries,
            filter: String::new(),
            chat_selected: 0,
            focus: Focus::Chats,
            input_mode: InputMode::None,
            search_input: String::new(),
            result_selected: 0,
            messages: TuiSurface::default(),
            media: TuiSurface::default(),
            theme,
            show_help: false,
            status_message,
        }
    }

    /// Chats matching the filter.
    pub fn visible_chats(&self) -> Vec<&ChatSummary> {
        filter_contacts(&self.summaries, &self.filter)
    }

    /// Whether the search overlay is showing results.
    pub fn is_searching(&self) -> bool {
        self.viewer.render_window().is_some_and(|w| w.is_searching)
    }

    /// Resize both panels to the terminal height.
    pub fn resize(&mut self, height: u16) {
        let rows = u64::from(height.saturating_sub(CHROME_ROWS));
        self.messages.set_viewport(rows);
        self.media.set_viewport(rows);
    }

    /// Move the chat list selection.
    pub fn move_chat_selection(&mut self, delta: isize) {
        let len = self.visible_chats().len();
        if len == 0 {
            self.chat_selected = 0;
            return;
        }
        self.chat_selected = self.chat_selected.saturating_add_signed(delta).min(len - 1);
    }

    /// Append to the chat filter.
    pub fn filter_push(&mut self, c: char) {
        self.filter.push(c);
        self.chat_selected = 0;
    }

    /// Remove the last filter character.
    pub fn filter_pop(&mut self) {
        self.filter.pop();
        self.chat_selected = 0;
    }

    /// Open the chat under the list cursor.
    pub fn open_selected(&mut self) {
        let Some(id) = self.visible_chats().get(self.chat_selected).map(|c| c.id.clone()) else {
            return;
        };
        self.open_chat(&id);
    }

    /// Open a chat by identifier.
    pub fn open_chat(&mut self, id: &str) {
        match self.viewer.open(id, &mut self.messages, &mut self.media) {
            Ok(()) => {
                self.focus = Focus::Messages;
                self.input_mode = InputMode::None;
                self.search_input.clear();
                self.result_selected = 0;
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    /// Scroll the message panel and page if an edge was reached.
    pub fn scroll_messages(&mut self, delta: i64) {
        self.messages.scroll_by(delta);
        let metrics = self.messages.metrics();
        if let Some(outcome) = self.viewer.on_message_scroll(metrics, &mut self.messages) {
            debug!(?outcome, "Message window paged");
        }
    }

    /// Scroll the media drawer and load a page near its end.
    pub fn scroll_media(&mut self, delta: i64) {
        self.media.scroll_by(delta);
        let metrics = self.media.metrics();
        self.viewer.on_media_scroll(metrics, &mut self.media);
    }

    /// Load the next media page regardless of scroll position.
    pub fn load_more_media(&mut self) {
        let loaded = self.viewer.load_media_page(&mut self.media);
        if loaded == 0 {
            self.status_message = Some("No more media".to_string());
        }
    }

    /// Show another media tab.
    pub fn switch_tab(&mut self, tab: MediaTab) {
        if self.viewer.active_chat().is_some() {
            self.viewer.switch_tab(tab, &mut self.media);
        }
    }

    /// Start typing a search query.
    pub fn begin_search(&mut self) {
        if self.viewer.active_chat().is_some() {
            self.input_mode = InputMode::Search;
            self.focus = Focus::Messages;
        }
    }

    /// Append to the search query.
    pub fn search_push(&mut self, c: char) {
        self.search_input.push(c);
        self.viewer.search_input(self.search_input.clone(), Instant::now());
    }

    /// Remove the last query character.
    pub fn search_pop(&mut self) {
        self.search_input.pop();
        self.viewer.search_input(self.search_input.clone(), Instant::now());
    }

    /// Move the selected search hit.
    pub fn move_result_selection(&mut self, delta: isize) {
        let len = self.viewer.search_results().len();
        if len > 0 {
            self.result_selected = self.result_selected.saturating_add_signed(delta).min(len - 1);
        }
    }

    /// Jump to the selected hit.
    pub fn select_result(&mut self) {
        match self.viewer.select_result(self.result_selected, &mut self.messages) {
            Ok(()) => {
                self.input_mode = InputMode::None;
                self.search_input.clear();
                self.result_selected = 0;
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    /// Leave search and return to the tail.
    pub fn cancel_search(&mut self) {
        self.input_mode = InputMode::None;
        self.search_input.clear();
        self.result_selected = 0;
        if let Err(e) = self.viewer.cancel_search(&mut self.messages) {
            self.status_message = Some(e.to_string());
        }
    }

    /// Reopen the chat at its newest messages.
    pub fn jump_to_latest(&mut self) {
        if let Err(e) = self.viewer.jump_to_latest(&mut self.messages) {
            self.status_message = Some(e.to_string());
        }
    }

    /// Whether to show the "jump to latest" hint.
    pub fn show_jump_to_latest(&self) -> bool {
        self.viewer.active_chat().is_some() && self.viewer.show_jump_to_latest(self.messages.metrics())
    }

    /// Run a debounced search once typing has paused.
    pub fn on_tick(&mut self, now: Instant) {
        if !self.viewer.search_pending() {
            return;
        }
        match self.viewer.poll_search(now, &mut self.messages) {
            Ok(Some(SearchUpdate::Results(count))) => {
                self.result_selected = 0;
                self.status_message = Some(format!("{count} matches"));
            }
            Ok(Some(SearchUpdate::Cleared)) => self.result_selected = 0,
            Ok(None) => {}
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_chat;
    use std::time::Duration;

    fn state() -> AppState {
        let mut registry = ChatRegistry::new();
        let raw: Vec<String> = (0..80)
            .map(|i| format!("[1/2/23, 09:{:02}] Alice: line {i}", i % 60))
            .collect();
        registry.insert("Alice", parse_chat(&raw.join("\n"), "Alice", &[]));
        registry.insert("Bob", parse_chat("[1/1/22, 08:00] Bob: old", "Bob", &[]));
        let mut state = AppState::new(registry, Config::default());
        state.resize(30);
        state
    }

    #[test]
    fn test_chat_list_order_and_filter() {
        let mut state = state();
        let ids: Vec<&str> = state.visible_chats().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["Alice", "Bob"]);

        state.filter_push('b');
        assert_eq!(state.visible_chats().len(), 1);
        state.move_chat_selection(5);
        assert_eq!(state.chat_selected, 0);
    }

    #[test]
    fn test_open_and_search_flow() {
        let mut state = state();
        state.open_selected();
        assert_eq!(state.viewer.active_chat(), Some("Alice"));
        assert_eq!(state.messages.items().len(), 50);

        state.begin_search();
        for c in "line 7".chars() {
            state.search_push(c);
        }
        state.on_tick(Instant::now());
        assert!(!state.is_searching());

        state.on_tick(Instant::now() + Duration::from_secs(1));
        assert!(state.is_searching());
        assert_eq!(state.viewer.search_results().len(), 11);

        state.move_result_selection(1);
        state.select_result();
        assert!(!state.is_searching());
        assert!(state.messages.items().iter().any(|m| m.original_index == 70));
    }

    fn long_state() -> AppState {
        let raw: Vec<String> = (0..1000)
            .map(|i| format!("[1/2/23, {:02}:{:02}] Alice: line {i}", i / 60 % 24, i % 60))
            .collect();
        let mut raw = raw.join("\n");
        let files: Vec<String> = (0..100).map(|i| format!("IMG-{i:03}.jpg")).collect();
        for name in &files {
            raw.push_str(&format!("\n[2/2/23, 10:00] Bob: <attached: {name}>"));
        }

        let mut registry = ChatRegistry::new();
        registry.insert("Alice", parse_chat(&raw, "Alice", &files));
        let mut state = AppState::new(registry, Config::default());
        state.resize(30);
        state.open_selected();
        state
    }

    #[test]
    fn test_jump_to_latest_hint_follows_rows() {
        let mut state = long_state();
        assert!(!state.show_jump_to_latest());

        state.scroll_messages(-2);
        assert!(!state.show_jump_to_latest());

        state.scroll_messages(-100);
        assert!(state.messages.metrics().distance_from_bottom() > 8);
        assert!(state.show_jump_to_latest());

        state.scroll_messages(100_000);
        assert!(!state.show_jump_to_latest());
    }

    #[test]
    fn test_newer_messages_load_only_at_bottom() {
        let mut state = long_state();
        state.viewer.jump_to(500, &mut state.messages).unwrap();
        assert_eq!(state.viewer.window().bounds(), (475, 525));

        state.scroll_messages(1);
        assert!(state.messages.metrics().distance_from_bottom() > 3);
        assert_eq!(state.viewer.window().bounds(), (475, 525));

        state.scroll_messages(100_000);
        assert_eq!(state.viewer.window().bounds(), (475, 575));
    }

    #[test]
    fn test_media_pages_near_drawer_end() {
        let mut state = long_state();
        assert_eq!(state.media.items().len(), 30);
        assert_eq!(state.media.metrics().distance_from_bottom(), 6);

        state.scroll_media(1);
        assert_eq!(state.media.items().len(), 30);

        state.scroll_media(3);
        assert_eq!(state.media.items().len(), 60);
    }

    #[test]
    fn test_scroll_to_top_pages() {
        let mut state = state();
        state.open_selected();
        state.scroll_messages(-10_000);
        assert_eq!(state.messages.items().len(), 80);
        assert_eq!(state.messages.items()[0].original_index, 0);
    }
}
