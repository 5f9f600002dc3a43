//! Media command implementation.
//!
//! Pages through a chat's attachments one drawer tab at a time.

use std::io::{self, Write};

use crate::cli::{Cli, MediaArgs, OutputFormat};
use crate::error::Result;
use crate::model::{MediaItem, MediaTab, Message};
use crate::render::MemorySurface;

use super::viewer_for_chat;

/// Run the media command.
pub fn run(cli: &Cli, args: &MediaArgs) -> Result<()> {
    let mut viewer = viewer_for_chat(cli, &args.chat)?;
    let mut messages: MemorySurface<Message> = MemorySurface::new(1, 0);
    let mut media: MemorySurface<MediaItem> = MemorySurface::new(1, 0);

    viewer.open(&args.chat, &mut messages, &mut media)?;

    let tab = MediaTab::from(args.tab);
    if tab != MediaTab::Images {
        viewer.switch_tab(tab, &mut media);
    }
    for _ in 1..args.pages {
        if viewer.load_media_page(&mut media) == 0 {
            break;
        }
    }

    let total = viewer.media().items().len();
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    match cli.effective_output() {
        OutputFormat::Json => {
            writeln!(writer, "{}", serde_json::to_string_pretty(media.items())?)?;
        }
        OutputFormat::Tsv => {
            writeln!(writer, "filename\textension\tpath")?;
            for item in media.items() {
                writeln!(writer, "{}\t{}\t{}", item.filename, item.extension, item.path)?;
            }
        }
        OutputFormat::Compact => {
            for item in media.items() {
                writeln!(writer, "{}", item.path)?;
            }
        }
        OutputFormat::Text => {
            writeln!(
                writer,
                "{} ({} of {} loaded):",
                tab.title(),
                media.len(),
                total
            )?;
            for item in media.items() {
                writeln!(writer, "  {:<40} {}", item.filename, item.path)?;
            }
            if !viewer.media().is_exhausted() {
                writeln!(writer, "  ... use --pages to load more")?;
            }
        }
    }

    Ok(())
}
