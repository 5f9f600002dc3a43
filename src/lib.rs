//! chatlog-viewer: windowed viewer for large exported chat transcripts.
//!
//! This crate parses chat exports (one folder per chat, each holding a
//! `_chat.txt` transcript and its attachment files) and drives a view that
//! keeps only a bounded window of messages materialized at a time.
//!
//! # Features
//!
//! - **Tolerant parsing**: multi-line messages, invisible-character
//!   prefixes, attachment markers and missing files
//! - **Bounded rendering**: at most a fixed number of messages are ever
//!   handed to the display, however long the chat
//! - **Search and jump**: case-insensitive search over the whole chat,
//!   with a jump back into the windowed view around any hit
//! - **Media drawer**: paged image, video and document lists per chat
//! - **Dual Interface**: both CLI (scriptable) and TUI (interactive) modes
//!
//! # Example
//!
//! ```rust,no_run
//! use chatlog_viewer::config::Config;
//! use chatlog_viewer::discovery::ChatDirectory;
//! use chatlog_viewer::model::{MediaItem, Message};
//! use chatlog_viewer::registry::ChatRegistry;
//! use chatlog_viewer::render::MemorySurface;
//! use chatlog_viewer::viewer::Viewer;
//!
//! fn main() -> chatlog_viewer::Result<()> {
//!     let dir = ChatDirectory::from_path("exports")?;
//!     let folders = dir.scan()?;
//!     let registry = ChatRegistry::load(&dir, &folders);
//!
//!     for chat in registry.summaries(50) {
//!         println!("{}: {}", chat.id, chat.preview);
//!     }
//!
//!     let mut viewer = Viewer::new(registry, Config::default());
//!     let mut messages: MemorySurface<Message> = MemorySurface::new(1, 40);
//!     let mut media: MemorySurface<MediaItem> = MemorySurface::new(1, 40);
//!     viewer.open("Alice", &mut messages, &mut media)?;
//!     println!("{} messages materialized", messages.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`parser`]: transcript parsing into a [`model::ChatDocument`]
//! - [`timestamp`]: header date and time normalization
//! - [`discovery`]: export root scanning and listing files
//! - [`registry`]: parsed chats keyed by identifier, ranked by recency
//! - [`async_io`]: concurrent transcript loading on tokio
//! - [`render`]: the display contract the controllers drive
//! - [`window`]: the bounded message window
//! - [`media`]: media drawer pagination
//! - [`search`]: debounced in-chat search
//! - [`viewer`]: the controllers wired together
//! - [`cli`]: Command-line interface
//! - `tui`: Terminal user interface (feature `tui`)
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod async_io;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod media;
pub mod model;
pub mod parser;
pub mod registry;
pub mod render;
pub mod search;
pub mod timestamp;
#[cfg(feature = "tui")]
pub mod tui;
pub mod util;
pub mod viewer;
pub mod window;

// Re-export commonly used types at the crate root
pub use error::{Result, ViewerError};
pub use model::{ChatDocument, Message};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Transcript file expected in every chat folder.
pub const TRANSCRIPT_FILE_NAME: &str = "_chat.txt";

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::discovery::{ChatDirectory, ChatFolder};
    pub use crate::error::{Result, ViewerError};
    pub use crate::model::{ChatDocument, MediaItem, MediaTab, Message};
    pub use crate::parser::{parse_chat, TranscriptParser};
    pub use crate::registry::{ChatRegistry, ChatSummary};
    pub use crate::render::{MemorySurface, MessageSurface, RenderAdapter, ScrollMetrics};
    pub use crate::viewer::{RenderWindow, Viewer};
}
