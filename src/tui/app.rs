//! TUI application main loop.

use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListState, Paragraph, Tabs},
    Frame, Terminal,
};
use tracing::info;

use crate::config::Config;
use crate::discovery::{ChatDirectory, ChatFolder};
use crate::error::{Result, ViewerError};
use crate::model::MediaTab;
use crate::registry::ChatRegistry;

use super::components::{chat_items, centered_rect, media_items, message_lines, result_items, StatusBar};
use super::events::{Event, EventHandler, KeyBindings};
use super::state::{AppState, Focus, InputMode};
use super::theme::available_themes;

/// Tick rate of the event loop; bounds search debounce latency.
const TICK_RATE: Duration = Duration::from_millis(50);

/// Rows scrolled per key press.
const SCROLL_STEP: i64 = 3;

/// Load every chat, then run the TUI until the user quits.
pub fn run(dir: ChatDirectory, folders: Vec<ChatFolder>, config: Config, chat: Option<&str>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| ViewerError::io("Failed to start async runtime", e))?;
    let registry = runtime.block_on(ChatRegistry::load_async(&dir, &folders));
    info!(chats = registry.len(), "Registry loaded for TUI");

    let mut app = AppState::new(registry, config);
    if let Some(id) = chat {
        app.open_chat(id);
    }

    // Setup terminal
    enable_raw_mode().map_err(|e| {
        ViewerError::io(
            "Cannot launch TUI - no interactive terminal available. \
             The TUI requires a terminal with keyboard input support",
            e,
        )
    })?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| ViewerError::io("Failed to enter alternate screen", e))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| ViewerError::io("Failed to create terminal", e))?;

    let (_, height) = terminal::size().map_err(|e| ViewerError::io("Failed to read terminal size", e))?;
    app.resize(height);

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().map_err(|e| ViewerError::io("Failed to disable raw mode", e))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| ViewerError::io("Failed to leave alternate screen", e))?;
    terminal
        .show_cursor()
        .map_err(|e| ViewerError::io("Failed to show cursor", e))?;

    result
}

/// Main event loop using EventHandler.
fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let events = EventHandler::new(TICK_RATE);
    let bindings = KeyBindings::default();

    loop {
        terminal
            .draw(|f| draw_ui(f, app))
            .map_err(|e| ViewerError::io("Failed to draw TUI", e))?;

        match events.next() {
            Ok(Event::Key(key)) => {
                app.status_message = None;
                if handle_key(app, &bindings, key) {
                    return Ok(());
                }
            }
            Ok(Event::Resize(_, height)) => app.resize(height),
            Ok(Event::Tick) => app.on_tick(Instant::now()),
            Err(_) => {
                return Err(ViewerError::TuiError {
                    message: "Event channel closed".to_string(),
                })
            }
        }
    }
}

/// Apply one key press. Returns `true` to quit.
fn handle_key(app: &mut AppState, bindings: &KeyBindings, key: KeyEvent) -> bool {
    if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.show_help {
        app.show_help = false;
        return false;
    }

    match app.input_mode {
        InputMode::Filter => {
            match key.code {
                KeyCode::Esc => {
                    app.filter.clear();
                    app.input_mode = InputMode::None;
                }
                KeyCode::Enter => {
                    app.input_mode = InputMode::None;
                    app.open_selected();
                }
                KeyCode::Backspace => app.filter_pop(),
                KeyCode::Up => app.move_chat_selection(-1),
                KeyCode::Down => app.move_chat_selection(1),
                KeyCode::Char(c) => app.filter_push(c),
                _ => {}
            }
            return false;
        }
        InputMode::Search => {
            match key.code {
                KeyCode::Esc => app.cancel_search(),
                KeyCode::Enter => app.select_result(),
                KeyCode::Backspace => app.search_pop(),
                KeyCode::Up => app.move_result_selection(-1),
                KeyCode::Down => app.move_result_selection(1),
                KeyCode::Char(c) => app.search_push(c),
                _ => {}
            }
            return false;
        }
        InputMode::None => {}
    }

    if bindings.is_quit(&key) {
        return true;
    }

    match key.code {
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Tab => {
            app.focus = match app.focus {
                Focus::Chats => Focus::Messages,
                Focus::Messages => Focus::Media,
                Focus::Media => Focus::Chats,
            };
        }
        KeyCode::Char('f') => {
            app.focus = Focus::Chats;
            app.input_mode = InputMode::Filter;
        }
        KeyCode::Char('/') => app.begin_search(),
        KeyCode::Char('G') => app.jump_to_latest(),
        KeyCode::Char('1') => app.switch_tab(MediaTab::Images),
        KeyCode::Char('2') => app.switch_tab(MediaTab::Videos),
        KeyCode::Char('3') => app.switch_tab(MediaTab::Docs),
        KeyCode::Char('m') => app.load_more_media(),
        KeyCode::PageUp => scroll_focused(app, -app_page(app)),
        KeyCode::PageDown => scroll_focused(app, app_page(app)),
        _ if bindings.is_back(&key) && app.is_searching() => app.cancel_search(),
        _ if bindings.is_up(&key) => match app.focus {
            Focus::Chats => app.move_chat_selection(-1),
            _ => scroll_focused(app, -SCROLL_STEP),
        },
        _ if bindings.is_down(&key) => match app.focus {
            Focus::Chats => app.move_chat_selection(1),
            _ => scroll_focused(app, SCROLL_STEP),
        },
        _ if bindings.is_select(&key) => match app.focus {
            Focus::Chats => app.open_selected(),
            Focus::Messages if app.is_searching() => app.select_result(),
            _ => {}
        },
        _ => {}
    }
    false
}

fn app_page(app: &AppState) -> i64 {
    i64::try_from(app.messages.metrics().viewport).unwrap_or(SCROLL_STEP).max(1)
}

fn scroll_focused(app: &mut AppState, delta: i64) {
    match app.focus {
        Focus::Media => app.scroll_media(delta),
        _ if app.is_searching() => {
            app.move_result_selection(if delta < 0 { -1 } else { 1 });
        }
        _ => app.scroll_messages(delta),
    }
}

fn draw_ui(f: &mut Frame, app: &AppState) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3), Constraint::Length(1)])
        .split(f.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(50),
            Constraint::Percentage(25),
        ])
        .split(main_chunks[0]);

    draw_chat_list(f, app, chunks[0]);
    if app.is_searching() {
        draw_results(f, app, chunks[1]);
    } else {
        draw_messages(f, app, chunks[1]);
    }
    draw_media(f, app, chunks[2]);
    draw_input_bar(f, app, main_chunks[1]);
    draw_status_bar(f, app, main_chunks[2]);

    if app.show_help {
        draw_help_overlay(f, app);
    }
}

fn panel<'a>(title: String, focused: bool, app: &AppState) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(focused))
}

fn draw_chat_list(f: &mut Frame, app: &AppState, area: Rect) {
    let chats = app.visible_chats();
    let title = format!(" Chats ({}) ", chats.len());
    let list = List::new(chat_items(&chats, &app.theme))
        .block(panel(title, app.focus == Focus::Chats, app))
        .highlight_style(app.theme.selection_style());

    let mut state = ListState::default();
    if !chats.is_empty() {
        state.select(Some(app.chat_selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_messages(f: &mut Frame, app: &AppState, area: Rect) {
    let title = match (app.viewer.active_chat(), app.viewer.render_window()) {
        (Some(chat), Some(w)) => {
            let total = app.viewer.document().map_or(0, |d| d.len());
            format!(" {chat} [{}..{} of {total}] ", w.msg_start, w.msg_end)
        }
        _ => " Messages ".to_string(),
    };

    let self_name = &app.viewer.config().display.self_name;
    let highlighted = app.messages.highlighted(Instant::now());
    let lines = message_lines(app.messages.items(), self_name, highlighted, &app.theme);
    let scroll = u16::try_from(app.messages.scroll_top()).unwrap_or(u16::MAX);

    let paragraph = Paragraph::new(lines)
        .block(panel(title, app.focus == Focus::Messages, app))
        .scroll((scroll, 0));
    f.render_widget(paragraph, area);

    if app.show_jump_to_latest() {
        let hint = " G: jump to latest ";
        let width = (hint.len() as u16).min(area.width.saturating_sub(2));
        let badge = Rect {
            x: area.x + area.width.saturating_sub(width + 1),
            y: area.y + area.height.saturating_sub(2),
            width,
            height: 1,
        };
        f.render_widget(Paragraph::new(hint).style(app.theme.highlight_style()), badge);
    }
}

fn draw_results(f: &mut Frame, app: &AppState, area: Rect) {
    let hits = app.viewer.search_results();
    let title = format!(" Results for \"{}\" ({}) ", app.viewer.search_query(), hits.len());
    let list = List::new(result_items(hits, &app.theme))
        .block(panel(title, app.focus == Focus::Messages, app))
        .highlight_style(app.theme.selection_style());

    let mut state = ListState::default();
    if !hits.is_empty() {
        state.select(Some(app.result_selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_media(f: &mut Frame, app: &AppState, area: Rect) {
    let block = panel(" Media ".to_string(), app.focus == Focus::Media, app);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let selected = MediaTab::ALL
        .iter()
        .position(|t| *t == app.viewer.media().tab())
        .unwrap_or(0);
    let tabs = Tabs::new(MediaTab::ALL.iter().map(|t| t.title()))
        .select(selected)
        .highlight_style(Style::default().fg(app.theme.primary).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, rows[0]);

    let items = app.media.items();
    let offset = usize::try_from(app.media.scroll_top()).unwrap_or(0);
    let list = List::new(media_items(&items[offset.min(items.len())..]));
    f.render_widget(list, rows[1]);
}

fn draw_input_bar(f: &mut Frame, app: &AppState, area: Rect) {
    let (title, text, active) = match app.input_mode {
        InputMode::Filter => (" Filter chats ", app.filter.as_str(), true),
        InputMode::Search => (" Search (Enter to jump, Esc to cancel) ", app.search_input.as_str(), true),
        InputMode::None => (" f: filter  /: search  ?: help ", "", false),
    };
    let cursor = if active { "█" } else { "" };
    let style = if active {
        Style::default().fg(app.theme.primary).add_modifier(Modifier::BOLD)
    } else {
        app.theme.muted_style()
    };

    let paragraph = Paragraph::new(format!("{text}{cursor}"))
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.border_style(active))
                .title(title),
        );
    f.render_widget(paragraph, area);
}

fn draw_status_bar(f: &mut Frame, app: &AppState, area: Rect) {
    let mode = match (app.input_mode, app.viewer.render_window()) {
        (InputMode::Filter, _) => "FILTER",
        (InputMode::Search, _) => "SEARCH",
        (_, Some(w)) if w.is_searching => "RESULTS",
        (_, Some(w)) if w.is_history_view => "HISTORY",
        (_, Some(_)) => "CHAT",
        (_, None) => "CHATS",
    };

    let brand = Span::styled(
        " chatlog ",
        Style::default().fg(app.theme.primary).add_modifier(Modifier::BOLD),
    );
    let left = match &app.status_message {
        Some(msg) => vec![brand, Span::raw("│ "), Span::styled(msg.clone(), app.theme.warning_style())],
        None => vec![brand, Span::raw("│ "), Span::raw(mode)],
    };

    let right = match app.viewer.render_window() {
        Some(w) => vec![Span::raw(format!(
            "media {}/{} ",
            w.media_cursor,
            app.viewer.media().items().len()
        ))],
        None => vec![Span::raw(format!("{} chats ", app.visible_chats().len()))],
    };

    StatusBar::new().left(left).right(right).render(f, area, &app.theme);
}

fn draw_help_overlay(f: &mut Frame, app: &AppState) {
    let area = centered_rect(60, 70, f.area());
    let bindings = [
        ("j/k, ↑/↓", "Scroll or move selection"),
        ("PgUp/PgDn", "Scroll a page"),
        ("Tab", "Cycle panels"),
        ("Enter", "Open chat or jump to result"),
        ("f", "Filter chats"),
        ("/", "Search the open chat"),
        ("Esc", "Leave search"),
        ("G", "Jump to latest"),
        ("1/2/3", "Images, videos, docs"),
        ("m", "Load more media"),
        ("q", "Quit"),
    ];

    let mut lines: Vec<Line> = bindings
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("{key:>12}  "), app.theme.success_style()),
                Span::raw(*desc),
            ])
        })
        .collect();
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        format!("Theme: {} (available: {})", app.theme.name, available_themes().join(", ")),
        app.theme.muted_style(),
    ));

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(panel(" Help ".to_string(), true, app)),
        area,
    );
}
