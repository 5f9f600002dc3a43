//! Configuration management for chatlog-viewer.
//!
//! Handles:
//! - Window paging and pruning limits
//! - Media drawer paging
//! - Search debounce and result cap
//! - Display preferences
//! - Terminal viewer scroll thresholds, in rows

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};
use crate::util::atomic_write;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Message window settings.
    #[serde(default)]
    pub window: WindowConfig,
    /// Media drawer settings.
    #[serde(default)]
    pub media: MediaConfig,
    /// Search settings.
    #[serde(default)]
    pub search: SearchConfig,
    /// Display options.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Terminal viewer settings.
    #[serde(default)]
    pub tui: TuiConfig,
}

/// Per-export configuration filename, looked up in the export root.
pub const ROOT_CONFIG_FILENAME: &str = ".chatlog-viewer.toml";

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        let config_path = default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration with overrides from an export root.
    ///
    /// Searches for `.chatlog-viewer.toml` in `root` and merges it over the
    /// global configuration.
    pub fn load_for_root(root: &Path) -> Result<Self> {
        let mut config = Self::load().unwrap_or_default();

        let root_config_path = root.join(ROOT_CONFIG_FILENAME);
        if root_config_path.exists() {
            let root_config = Self::load_from(&root_config_path)?;
            config.merge_from(&root_config);
        }

        Ok(config)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ViewerError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ViewerError::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Merge another config into this one (non-default values in `other` win).
    pub fn merge_from(&mut self, other: &Config) {
        let window = WindowConfig::default();
        if other.window.chunk_size != window.chunk_size {
            self.window.chunk_size = other.window.chunk_size;
        }
        if other.window.max_materialized != window.max_materialized {
            self.window.max_materialized = other.window.max_materialized;
        }
        if other.window.near_bottom_threshold != window.near_bottom_threshold {
            self.window.near_bottom_threshold = other.window.near_bottom_threshold;
        }
        if other.window.tail_tolerance != window.tail_tolerance {
            self.window.tail_tolerance = other.window.tail_tolerance;
        }
        if other.window.bottom_distance != window.bottom_distance {
            self.window.bottom_distance = other.window.bottom_distance;
        }
        if other.window.highlight_ms != window.highlight_ms {
            self.window.highlight_ms = other.window.highlight_ms;
        }

        let media = MediaConfig::default();
        if other.media.chunk_size != media.chunk_size {
            self.media.chunk_size = other.media.chunk_size;
        }
        if other.media.near_bottom_threshold != media.near_bottom_threshold {
            self.media.near_bottom_threshold = other.media.near_bottom_threshold;
        }

        let search = SearchConfig::default();
        if other.search.debounce_ms != search.debounce_ms {
            self.search.debounce_ms = other.search.debounce_ms;
        }
        if other.search.max_results != search.max_results {
            self.search.max_results = other.search.max_results;
        }

        let display = DisplayConfig::default();
        if other.display.self_name != display.self_name {
            self.display.self_name = other.display.self_name.clone();
        }
        if other.display.theme != display.theme {
            self.display.theme = other.display.theme.clone();
        }
        if other.display.preview_len != display.preview_len {
            self.display.preview_len = other.display.preview_len;
        }

        let tui = TuiConfig::default();
        if other.tui.near_bottom_rows != tui.near_bottom_rows {
            self.tui.near_bottom_rows = other.tui.near_bottom_rows;
        }
        if other.tui.bottom_distance_rows != tui.bottom_distance_rows {
            self.tui.bottom_distance_rows = other.tui.bottom_distance_rows;
        }
        if other.tui.media_near_bottom_rows != tui.media_near_bottom_rows {
            self.tui.media_near_bottom_rows = other.tui.media_near_bottom_rows;
        }
    }

    /// Copy with scroll distances in terminal rows instead of pixels.
    ///
    /// `[window]` and `[media]` distances are measured on a pixel surface;
    /// the terminal viewer measures in rows and uses `[tui]` in their place.
    #[must_use]
    pub fn in_rows(&self) -> Self {
        let mut config = self.clone();
        config.window.near_bottom_threshold = self.tui.near_bottom_rows;
        config.window.bottom_distance = self.tui.bottom_distance_rows;
        config.media.near_bottom_threshold = self.tui.media_near_bottom_rows;
        config
    }

    /// Check that paging limits are usable.
    pub fn validate(&self) -> Result<()> {
        if self.window.chunk_size == 0 {
            return Err(ViewerError::config("window.chunk_size must be greater than 0"));
        }
        if self.window.max_materialized < self.window.chunk_size {
            return Err(ViewerError::config(format!(
                "window.max_materialized ({}) must be at least window.chunk_size ({})",
                self.window.max_materialized, self.window.chunk_size
            )));
        }
        if self.media.chunk_size == 0 {
            return Err(ViewerError::config("media.chunk_size must be greater than 0"));
        }
        if self.search.max_results == 0 {
            return Err(ViewerError::config("search.max_results must be greater than 0"));
        }
        Ok(())
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = default_config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific path.
    ///
    /// Written to a temporary file first, then atomically renamed over the
    /// target.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ViewerError::InvalidConfig {
            message: format!("Failed to serialize config: {e}"),
        })?;

        atomic_write(path, content.as_bytes())?;

        Ok(())
    }
}

/// Message window configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Messages loaded per paging step.
    #[serde(default = "default_chunk")]
    pub chunk_size: usize,
    /// Most messages kept materialized at once.
    #[serde(default = "default_max_materialized")]
    pub max_materialized: usize,
    /// Distance from the bottom that triggers loading newer messages.
    #[serde(default = "default_near_bottom")]
    pub near_bottom_threshold: u64,
    /// How many messages short of the end still count as the tail.
    #[serde(default = "default_tail_tolerance")]
    pub tail_tolerance: usize,
    /// Scroll distance from the bottom that still counts as the tail.
    #[serde(default = "default_bottom_distance")]
    pub bottom_distance: u64,
    /// Jump highlight duration in milliseconds.
    #[serde(default = "default_highlight_ms")]
    pub highlight_ms: u64,
}

impl WindowConfig {
    /// Jump highlight duration.
    #[must_use]
    pub const fn highlight(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk(),
            max_materialized: default_max_materialized(),
            near_bottom_threshold: default_near_bottom(),
            tail_tolerance: default_tail_tolerance(),
            bottom_distance: default_bottom_distance(),
            highlight_ms: default_highlight_ms(),
        }
    }
}

/// Media drawer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Items loaded per page.
    #[serde(default = "default_media_chunk")]
    pub chunk_size: usize,
    /// Distance from the bottom that triggers the next page.
    #[serde(default = "default_media_near_bottom")]
    pub near_bottom_threshold: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_media_chunk(),
            near_bottom_threshold: default_media_near_bottom(),
        }
    }
}

/// Search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before searching.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Result cap.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl SearchConfig {
    /// Debounce delay.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            max_results: default_max_results(),
        }
    }
}

/// Display configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Sender name treated as the viewer's own account.
    #[serde(default = "default_self_name")]
    pub self_name: String,
    /// TUI theme (`dark`, `light`, `high-contrast`).
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Characters of the last message shown in the chat list.
    #[serde(default = "default_preview_len")]
    pub preview_len: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            self_name: default_self_name(),
            theme: default_theme(),
            preview_len: default_preview_len(),
        }
    }
}

/// Terminal viewer scroll thresholds, in rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Rows from the bottom that trigger loading newer messages.
    #[serde(default = "default_near_bottom_rows")]
    pub near_bottom_rows: u64,
    /// Rows from the bottom that still count as the tail.
    #[serde(default = "default_bottom_distance_rows")]
    pub bottom_distance_rows: u64,
    /// Rows from the end of the media drawer that trigger the next page.
    #[serde(default = "default_media_near_bottom_rows")]
    pub media_near_bottom_rows: u64,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            near_bottom_rows: default_near_bottom_rows(),
            bottom_distance_rows: default_bottom_distance_rows(),
            media_near_bottom_rows: default_media_near_bottom_rows(),
        }
    }
}

// Default value functions for serde
const fn default_chunk() -> usize {
    50
}

const fn default_max_materialized() -> usize {
    200
}

const fn default_near_bottom() -> u64 {
    100
}

const fn default_tail_tolerance() -> usize {
    20
}

const fn default_bottom_distance() -> u64 {
    300
}

const fn default_highlight_ms() -> u64 {
    2000
}

const fn default_media_chunk() -> usize {
    30
}

const fn default_media_near_bottom() -> u64 {
    200
}

const fn default_debounce_ms() -> u64 {
    300
}

const fn default_max_results() -> usize {
    250
}

fn default_self_name() -> String {
    "John Doe".to_string()
}

fn default_theme() -> String {
    "dark".to_string()
}

const fn default_preview_len() -> usize {
    50
}

const fn default_near_bottom_rows() -> u64 {
    3
}

const fn default_bottom_distance_rows() -> u64 {
    8
}

const fn default_media_near_bottom_rows() -> u64 {
    3
}

/// Get the default configuration path.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| ViewerError::Unsupported {
        feature: "config directory discovery".to_string(),
    })?;

    Ok(config_dir.join("chatlog-viewer").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.window.chunk_size, 50);
        assert_eq!(config.window.max_materialized, 200);
        assert_eq!(config.media.chunk_size, 30);
        assert_eq!(config.search.max_results, 250);
        assert_eq!(config.display.self_name, "John Doe");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str("[window]\nchunk_size = 40\n").unwrap();
        assert_eq!(parsed.window.chunk_size, 40);
        assert_eq!(parsed.window.highlight_ms, 2000);
        assert_eq!(parsed.search.debounce_ms, 300);
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.display.theme = "light".to_string();

        let mut other = Config::default();
        other.window.chunk_size = 25;
        other.display.self_name = "Me".to_string();

        base.merge_from(&other);

        assert_eq!(base.window.chunk_size, 25);
        assert_eq!(base.display.self_name, "Me");
        // Defaults in `other` do not clobber
        assert_eq!(base.display.theme, "light");
    }

    #[test]
    fn test_in_rows_swaps_scroll_distances() {
        let mut config: Config = toml::from_str("[tui]\nbottom_distance_rows = 12\n").unwrap();
        config.window.chunk_size = 40;

        let rows = config.in_rows();
        assert_eq!(rows.window.near_bottom_threshold, 3);
        assert_eq!(rows.window.bottom_distance, 12);
        assert_eq!(rows.media.near_bottom_threshold, 3);
        assert_eq!(rows.window.chunk_size, 40);
        assert_eq!(config.window.bottom_distance, 300);
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        let mut config = Config::default();
        config.window.chunk_size = 0;
        assert!(matches!(config.validate(), Err(ViewerError::InvalidConfig { .. })));

        let mut config = Config::default();
        config.window.max_materialized = 10;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.media.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_for_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join(ROOT_CONFIG_FILENAME),
            "[search]\nmax_results = 10\n",
        )
        .unwrap();

        let config = Config::load_for_root(temp_dir.path()).unwrap();
        assert_eq!(config.search.max_results, 10);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.media.chunk_size = 12;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_invalid_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[window]\nchunk_size = \"big\"\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ViewerError::InvalidConfig { .. })));
    }
}
