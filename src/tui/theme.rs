//! TUI theming and colors.

use ratatui::style::{Color, Modifier, Style};

use crate::util::sender_color;

/// Application theme.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Name of the theme.
    pub name: String,
    /// Foreground color.
    pub foreground: Color,
    /// Primary accent color.
    pub primary: Color,
    /// Border color (unfocused).
    pub border: Color,
    /// Border color (focused).
    pub border_focused: Color,
    /// Selection highlight.
    pub selection: Color,
    /// Own messages.
    pub own: Color,
    /// Date dividers and timestamps.
    pub muted: Color,
    /// Search matches and jump targets.
    pub highlight: Color,
    /// Error color.
    pub error: Color,
    /// Warning color.
    pub warning: Color,
    /// Success color.
    pub success: Color,
    /// Whether sender names get their derived colors.
    pub sender_colors: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Create the default dark theme.
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            foreground: Color::White,
            primary: Color::Cyan,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            selection: Color::DarkGray,
            own: Color::Green,
            muted: Color::DarkGray,
            highlight: Color::Yellow,
            error: Color::Red,
            warning: Color::Yellow,
            success: Color::Green,
            sender_colors: true,
        }
    }

    /// Create a light theme.
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            foreground: Color::Black,
            primary: Color::Blue,
            border: Color::Gray,
            border_focused: Color::Blue,
            selection: Color::LightBlue,
            own: Color::Green,
            muted: Color::Gray,
            highlight: Color::Magenta,
            error: Color::Red,
            warning: Color::Yellow,
            success: Color::Green,
            sender_colors: true,
        }
    }

    /// Create a high contrast theme.
    pub fn high_contrast() -> Self {
        Self {
            name: "high-contrast".to_string(),
            foreground: Color::White,
            primary: Color::Yellow,
            border: Color::White,
            border_focused: Color::Yellow,
            selection: Color::White,
            own: Color::Green,
            muted: Color::White,
            highlight: Color::Yellow,
            error: Color::Red,
            warning: Color::Yellow,
            success: Color::Green,
            sender_colors: false,
        }
    }

    /// Get theme by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            "high-contrast" | "highcontrast" => Some(Self::high_contrast()),
            _ => None,
        }
    }

    /// Get style for borders.
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.border_focused } else { self.border })
    }

    /// Get style for selected items.
    pub fn selection_style(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for a sender name. Own messages use the theme color.
    pub fn sender_style(&self, sender: &str, own: bool) -> Style {
        let color = if own {
            self.own
        } else if self.sender_colors {
            let (r, g, b) = sender_color(sender);
            Color::Rgb(r, g, b)
        } else {
            self.foreground
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Style for dividers and timestamps.
    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Style for matched text and jump targets.
    pub fn highlight_style(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for errors.
    pub fn error_style(&self) -> Style {
        Style::default()
            .fg(self.error)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for warnings.
    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    /// Get style for success.
    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }
}

/// Available themes list.
pub fn available_themes() -> Vec<&'static str> {
    vec!["dark", "light", "high-contrast"]
}
