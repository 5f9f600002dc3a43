//! CLI command implementations.
//!
//! Each command is implemented in its own module with a `run` function
//! that handles the command logic.

pub mod config;
pub mod list;
pub mod media;
pub mod search;
pub mod show;
pub mod tui;

use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::discovery::{ChatDirectory, ChatFolder};
use crate::error::{Result, ViewerError};
use crate::model::Message;
use crate::parser::TranscriptParser;
use crate::registry::ChatRegistry;
use crate::viewer::{RenderWindow, Viewer};

/// Get the export root from CLI args, or the current directory.
pub fn get_chat_dir(cli: &Cli) -> Result<ChatDirectory> {
    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));
    ChatDirectory::from_path(root)
}

/// Load configuration from `--config`, or the global file plus root overrides.
pub fn load_config(cli: &Cli, dir: &ChatDirectory) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
            Config::default()
        }),
        None => Config::load_for_root(dir.root())?,
    };
    config.validate()?;
    Ok(config)
}

/// Chat folders from `--listing` or a scan of the root.
pub fn get_folders(cli: &Cli, dir: &ChatDirectory) -> Result<Vec<ChatFolder>> {
    dir.listing(cli.listing.as_deref())
}

/// Build a viewer holding only `chat_id`.
pub fn viewer_for_chat(cli: &Cli, chat_id: &str) -> Result<Viewer> {
    let dir = get_chat_dir(cli)?;
    let config = load_config(cli, &dir)?;
    let folder = get_folders(cli, &dir)?
        .into_iter()
        .find(|f| f.id == chat_id)
        .ok_or_else(|| ViewerError::ChatNotFound {
            chat_id: chat_id.to_string(),
        })?;

    let mut registry = ChatRegistry::new();
    let mut parser = TranscriptParser::new();
    let doc = parser.parse_file(dir.transcript_path(chat_id), chat_id, &folder.inventory())?;
    registry.insert(chat_id, doc);

    Ok(Viewer::new(registry, config))
}

/// A window of messages, as printed by `show` and `search --select`.
#[derive(Debug, Serialize)]
struct WindowOutput<'a> {
    chat: &'a str,
    total: usize,
    window: RenderWindow,
    messages: &'a [Message],
}

/// Print materialized messages in the requested format.
pub(crate) fn print_window(cli: &Cli, viewer: &Viewer, messages: &[Message]) -> Result<()> {
    let chat = viewer.active_chat().unwrap_or_default();
    let total = viewer.document().map_or(0, |d| d.len());
    let window = viewer.render_window().ok_or(ViewerError::NoChatOpen)?;
    let self_name = &viewer.config().display.self_name;

    match cli.effective_output() {
        OutputFormat::Json => {
            let output = WindowOutput {
                chat,
                total,
                window,
                messages,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("index\tdate\ttime\tsender\ttext\tmedia\tmissing");
            for msg in messages {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    msg.original_index,
                    msg.date,
                    msg.time,
                    msg.sender,
                    msg.display_text().replace('\n', "\\n"),
                    msg.media_type.map(|t| t.to_string()).unwrap_or_default(),
                    msg.is_missing
                );
            }
        }
        OutputFormat::Compact => {
            for msg in messages {
                println!(
                    "{}:{}:{}",
                    msg.original_index,
                    msg.sender,
                    msg.display_text().replace('\n', " ")
                );
            }
        }
        OutputFormat::Text => {
            println!(
                "{chat}: messages {}..{} of {total}",
                window.msg_start, window.msg_end
            );
            let mut last_date = "";
            for msg in messages {
                if msg.date != last_date {
                    println!("\n--- {} ---", msg.date);
                    last_date = msg.date.as_str();
                }
                let marker = if msg.is_from(self_name) { ">" } else { " " };
                println!(
                    "{marker}[{:>5}] {} {}: {}",
                    msg.original_index,
                    msg.time,
                    msg.sender,
                    format_body(msg)
                );
            }
        }
    }
    Ok(())
}

/// Message body with its attachment state spelled out.
pub(crate) fn format_body(msg: &Message) -> String {
    let text = msg.display_text().replace('\n', "\n          ");
    match (&msg.filename, msg.is_media) {
        (Some(name), true) if msg.is_missing => format!("[missing: {name}] {text}"),
        (Some(name), true) => {
            let kind = msg.media_type.map(|t| t.to_string()).unwrap_or_default();
            format!("[{kind}: {name}] {text}")
        }
        _ => text,
    }
    .trim_end()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_chat;

    #[test]
    fn test_format_body() {
        let doc = parse_chat(
            "[1/2/23, 09:00] A: <attached: a.jpg> look\n[1/2/23, 09:01] A: <attached: b.pdf>\n[1/2/23, 09:02] A: plain",
            "c",
            &["a.jpg".to_string()],
        );
        assert_eq!(format_body(&doc.messages[0]), "[image: a.jpg] look");
        assert_eq!(format_body(&doc.messages[1]), "[missing: b.pdf]");
        assert_eq!(format_body(&doc.messages[2]), "plain");
    }
}
