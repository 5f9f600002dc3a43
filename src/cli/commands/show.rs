//! Show command implementation.
//!
//! Opens a chat the way the viewer does and prints the materialized
//! window. `--around` recenters on a message; `--page-up` replays scrolls
//! to the top.

use tracing::debug;

use crate::cli::{Cli, ShowArgs};
use crate::error::Result;
use crate::model::{MediaItem, Message};
use crate::render::MemorySurface;
use crate::window::PageOutcome;

use super::{print_window, viewer_for_chat};

/// Run the show command.
pub fn run(cli: &Cli, args: &ShowArgs) -> Result<()> {
    let mut viewer = viewer_for_chat(cli, &args.chat)?;
    let mut messages: MemorySurface<Message> = MemorySurface::new(1, 0);
    let mut media: MemorySurface<MediaItem> = MemorySurface::new(1, 0);

    viewer.open(&args.chat, &mut messages, &mut media)?;

    if let Some(index) = args.around {
        viewer.jump_to(index, &mut messages)?;
    }

    for step in 0..args.page_up {
        match viewer.scroll_near_top(&mut messages) {
            Some(PageOutcome::Extended { added, pruned }) => {
                debug!(step, added, pruned, "Loaded older messages");
            }
            _ => break,
        }
    }

    print_window(cli, &viewer, messages.items())
}
