//! Terminal user interface.
//!
//! Three panels: the chat list on the left, the windowed message view (or
//! search results) in the center, and the media drawer on the right. The
//! panels are terminal surfaces driven by the same controllers the
//! command line views use.
//!
//! Built with ratatui for cross-platform terminal support.

mod app;
mod components;
mod events;
mod state;
mod surface;
mod theme;

pub use app::run;
