//! Reusable TUI components.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{ListItem, Paragraph},
    Frame,
};

use crate::model::{MediaItem, Message};
use crate::registry::ChatSummary;
use crate::search::SearchHit;

use super::theme::Theme;

/// A status bar component.
pub struct StatusBar<'a> {
    left: Vec<Span<'a>>,
    right: Vec<Span<'a>>,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar.
    pub fn new() -> Self {
        Self {
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    /// Add left-aligned content.
    pub fn left(mut self, spans: Vec<Span<'a>>) -> Self {
        self.left = spans;
        self
    }

    /// Add right-aligned content.
    pub fn right(mut self, spans: Vec<Span<'a>>) -> Self {
        self.right = spans;
        self
    }

    /// Render the status bar.
    pub fn render(self, f: &mut Frame, area: Rect, theme: &Theme) {
        let used: usize = self
            .left
            .iter()
            .chain(&self.right)
            .map(|s| s.content.chars().count())
            .sum();
        let padding = (area.width as usize).saturating_sub(used).max(1);

        let mut spans = self.left;
        spans.push(Span::raw(" ".repeat(padding)));
        spans.extend(self.right);

        let paragraph = Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.selection).fg(theme.foreground));

        f.render_widget(paragraph, area);
    }
}

impl<'a> Default for StatusBar<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Lines for the materialized messages.
///
/// Row counts match [`super::surface::RowExtent`] so scroll offsets line up.
pub fn message_lines(
    messages: &[Message],
    self_name: &str,
    highlighted: Option<usize>,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut prev: Option<&Message> = None;

    for msg in messages {
        if prev.map_or(true, |p| p.date != msg.date) {
            lines.push(
                Line::from(Span::styled(format!("──── {} ────", msg.date), theme.muted_style()))
                    .centered(),
            );
        }

        let own = msg.is_from(self_name);
        let mut header = vec![
            Span::styled(msg.time.clone(), theme.muted_style()),
            Span::raw(" "),
            Span::styled(msg.sender.clone(), theme.sender_style(&msg.sender, own)),
        ];
        if highlighted == Some(msg.original_index) {
            header.push(Span::raw(" "));
            header.push(Span::styled(" ◀ ", theme.highlight_style()));
        }
        lines.push(Line::from(header));

        let body: Vec<&str> = msg.display_text().lines().collect();
        if body.is_empty() {
            lines.push(Line::raw(""));
        }
        for text in body {
            lines.push(Line::raw(format!("  {text}")));
        }

        if msg.is_media {
            lines.push(attachment_line(msg, theme));
        }
        prev = Some(msg);
    }

    lines
}

fn attachment_line(msg: &Message, theme: &Theme) -> Line<'static> {
    let name = msg.filename.clone().unwrap_or_default();
    if msg.is_missing {
        Line::from(Span::styled(format!("  [missing: {name}]"), theme.error_style()))
    } else {
        let kind = msg.media_type.map(|t| t.to_string()).unwrap_or_default();
        Line::from(Span::styled(
            format!("  [{kind}: {name}]"),
            Style::default().fg(theme.primary).add_modifier(Modifier::ITALIC),
        ))
    }
}

/// Chat list rows: name and date, then the preview.
pub fn chat_items(chats: &[&ChatSummary], theme: &Theme) -> Vec<ListItem<'static>> {
    chats
        .iter()
        .map(|chat| {
            let date = chat.last_date.clone().unwrap_or_default();
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(chat.id.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(" "),
                    Span::styled(date, theme.muted_style()),
                ]),
                Line::from(Span::styled(
                    chat.preview.replace('\n', " "),
                    theme.muted_style(),
                )),
            ])
        })
        .collect()
}

/// Search hit rows with matched runs highlighted.
pub fn result_items(hits: &[SearchHit], theme: &Theme) -> Vec<ListItem<'static>> {
    hits.iter()
        .map(|hit| {
            let mut body: Vec<Span<'static>> = vec![Span::raw("  ")];
            body.extend(hit.segments.iter().map(|s| {
                let text = s.text.replace('\n', " ");
                if s.matched {
                    Span::styled(text, theme.highlight_style())
                } else {
                    Span::raw(text)
                }
            }));

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("{} {}", hit.date, hit.time), theme.muted_style()),
                    Span::raw(" "),
                    Span::styled(hit.sender.clone(), theme.sender_style(&hit.sender, false)),
                ]),
                Line::from(body),
            ])
        })
        .collect()
}

/// Media drawer rows.
pub fn media_items(items: &[MediaItem]) -> Vec<ListItem<'static>> {
    items
        .iter()
        .map(|item| ListItem::new(format!("{} ({})", item.filename, item.extension)))
        .collect()
}

/// Center a rectangle of the given percentage size within `r`.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_chat;
    use crate::tui::surface::RowExtent;

    #[test]
    fn test_line_count_matches_row_extent() {
        let doc = parse_chat(
            "[1/2/23, 09:00] A: hi\nsecond line\n[1/2/23, 09:01] B: <attached: a.jpg>\n[2/2/23, 10:00] A: next day",
            "c",
            &["a.jpg".to_string()],
        );
        let expected: u64 = doc
            .messages
            .iter()
            .enumerate()
            .map(|(i, m)| m.rows(i.checked_sub(1).map(|p| &doc.messages[p])))
            .sum();

        let lines = message_lines(&doc.messages, "A", None, &Theme::dark());
        assert_eq!(lines.len() as u64, expected);
    }
}
