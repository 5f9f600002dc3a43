//! List command implementation.
//!
//! Lists chats in the export root, most recent first.

use std::io::{self, Write};

use chrono::DateTime;

use crate::cli::{Cli, ListArgs, OutputFormat};
use crate::error::Result;
use crate::registry::{filter_contacts, ChatRegistry};
use crate::timestamp::UNPARSEABLE;

use super::{get_chat_dir, get_folders, load_config};

/// Run the list command.
pub fn run(cli: &Cli, args: &ListArgs) -> Result<()> {
    let dir = get_chat_dir(cli)?;
    let config = load_config(cli, &dir)?;
    let folders = get_folders(cli, &dir)?;

    let registry = ChatRegistry::load(&dir, &folders);
    let summaries = registry.summaries(config.display.preview_len);

    let mut chats = filter_contacts(&summaries, args.filter.as_deref().unwrap_or(""));
    if let Some(limit) = args.limit {
        chats.truncate(limit);
    }

    let stdout = io::stdout();
    let mut writer = stdout.lock();

    match cli.effective_output() {
        OutputFormat::Json => {
            writeln!(writer, "{}", serde_json::to_string_pretty(&chats)?)?;
        }
        OutputFormat::Tsv => {
            writeln!(writer, "chat\ttimestamp\tmessages\tmedia\tpreview")?;
            for chat in &chats {
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{}\t{}",
                    chat.id,
                    chat.timestamp,
                    chat.messages,
                    chat.media,
                    chat.preview.replace(['\t', '\n'], " ")
                )?;
            }
        }
        OutputFormat::Compact => {
            for chat in &chats {
                writeln!(writer, "{}", chat.id)?;
            }
        }
        OutputFormat::Text => {
            if chats.is_empty() {
                writeln!(writer, "No chats found.")?;
            } else {
                writeln!(writer, "Chats ({} found):", chats.len())?;
                writeln!(writer)?;
                for chat in &chats {
                    writeln!(
                        writer,
                        "  {:<24} {:>16}  {} messages, {} media",
                        chat.id,
                        format_timestamp(chat.timestamp),
                        chat.messages,
                        chat.media
                    )?;
                    if !chat.preview.is_empty() {
                        writeln!(writer, "    {}", chat.preview.replace('\n', " "))?;
                    }
                }
            }

            if !registry.failed().is_empty() {
                writeln!(writer)?;
                writeln!(writer, "Unreadable: {}", registry.failed().join(", "))?;
            }
        }
    }

    Ok(())
}

/// Render a normalized instant for the listing.
fn format_timestamp(timestamp: i64) -> String {
    if timestamp == UNPARSEABLE {
        return "-".to_string();
    }
    DateTime::from_timestamp_millis(timestamp)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(UNPARSEABLE), "-");
        assert_eq!(format_timestamp(1_672_567_200_000), "2023-01-01 10:00");
    }
}
