//! Search command implementation.
//!
//! Runs one query over a chat. With `--select`, jumps to a hit and prints
//! the window around it.

use std::io::{self, Write};

use crate::cli::{Cli, OutputFormat, SearchArgs};
use crate::error::{Result, ViewerError};
use crate::model::{MediaItem, Message};
use crate::render::MemorySurface;
use crate::search::{SearchHit, SearchUpdate};

use super::{print_window, viewer_for_chat};

/// Run the search command.
pub fn run(cli: &Cli, args: &SearchArgs) -> Result<()> {
    let mut viewer = viewer_for_chat(cli, &args.chat)?;
    let mut messages: MemorySurface<Message> = MemorySurface::new(1, 0);
    let mut media: MemorySurface<MediaItem> = MemorySurface::new(1, 0);

    viewer.open(&args.chat, &mut messages, &mut media)?;

    if args.query.is_empty() {
        return Err(ViewerError::InvalidArgument {
            name: "query".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    let update = viewer.search_now(&args.query, &mut messages)?;

    if let Some(n) = args.select {
        let hit = n.checked_sub(1).ok_or_else(|| ViewerError::InvalidArgument {
            name: "select".to_string(),
            reason: "hits are numbered from 1".to_string(),
        })?;
        viewer.select_result(hit, &mut messages)?;
        return print_window(cli, &viewer, messages.items());
    }

    let hits = viewer.search_results();
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    match cli.effective_output() {
        OutputFormat::Json => {
            writeln!(writer, "{}", serde_json::to_string_pretty(hits)?)?;
        }
        OutputFormat::Tsv => {
            writeln!(writer, "index\tdate\ttime\tsender\ttext")?;
            for hit in hits {
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{}\t{}",
                    hit.original_index,
                    hit.date,
                    hit.time,
                    hit.sender,
                    plain_text(hit).replace('\n', "\\n")
                )?;
            }
        }
        OutputFormat::Compact => {
            for hit in hits {
                writeln!(writer, "{}", hit.original_index)?;
            }
        }
        OutputFormat::Text => {
            if update == SearchUpdate::Results(0) {
                writeln!(writer, "No messages match \"{}\".", args.query)?;
                return Ok(());
            }
            writeln!(writer, "{} hits for \"{}\":", hits.len(), args.query)?;
            writeln!(writer)?;
            for (n, hit) in hits.iter().enumerate() {
                writeln!(
                    writer,
                    "{:>4}. [{}] {} {} {}: {}",
                    n + 1,
                    hit.original_index,
                    hit.date,
                    hit.time,
                    hit.sender,
                    marked_text(hit).replace('\n', " ")
                )?;
            }
        }
    }

    Ok(())
}

fn plain_text(hit: &SearchHit) -> String {
    hit.segments.iter().map(|s| s.text.as_str()).collect()
}

/// Hit text with matches wrapped in `**`.
fn marked_text(hit: &SearchHit) -> String {
    hit.segments
        .iter()
        .map(|s| {
            if s.matched {
                format!("**{}**", s.text)
            } else {
                s.text.clone()
            }
        })
        .collect()
}
