//! Utility functions shared across the crate.
//!
//! - Atomic file writes for configuration files
//! - Location escaping for attachment paths
//! - Text previews and stable sender colors

use std::io::{self, Write};
use std::path::Path;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tempfile::NamedTempFile;

use crate::error::{Result, ViewerError};

/// Characters escaped in a path component. Everything except the
/// URI-unreserved set and `!*'()`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Atomically write content to a file.
///
/// The content goes to a temporary file in the target's directory, is flushed,
/// and is then renamed over the target. If any step fails the original file
/// (if it exists) remains unchanged. Missing parent directories are created.
///
/// # Example
///
/// ```rust,no_run
/// use chatlog_viewer::util::atomic_write;
///
/// atomic_write("config.toml", b"[window]\nchunk_size = 40\n").unwrap();
/// ```
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    let parent = path.parent().ok_or_else(|| ViewerError::IoError {
        context: format!("Cannot determine parent directory for: {}", path.display()),
        source: io::Error::new(io::ErrorKind::InvalidInput, "No parent directory"),
    })?;

    if !parent.as_os_str().is_empty() && !parent.exists() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ViewerError::io(format!("Failed to create directory: {}", parent.display()), e)
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_dir = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };
    let mut temp_file = NamedTempFile::new_in(temp_dir).map_err(|e| {
        ViewerError::io(
            format!("Failed to create temporary file in: {}", temp_dir.display()),
            e,
        )
    })?;

    temp_file.write_all(content).map_err(|e| {
        ViewerError::io(
            format!("Failed to write to temporary file for: {}", path.display()),
            e,
        )
    })?;

    temp_file.flush().map_err(|e| {
        ViewerError::io(
            format!("Failed to flush temporary file for: {}", path.display()),
            e,
        )
    })?;

    temp_file.persist(path).map_err(|e| {
        ViewerError::io(format!("Failed to atomically write file: {}", path.display()), e.error)
    })?;

    Ok(())
}

/// Percent-escape a single path component (chat identifier or filename).
#[must_use]
pub fn escape_component(component: &str) -> String {
    utf8_percent_encode(component, COMPONENT).to_string()
}

/// Build the escaped location of an attachment inside a chat folder.
#[must_use]
pub fn media_location(chat_id: &str, filename: &str) -> String {
    format!("{}/{}", escape_component(chat_id), escape_component(filename))
}

/// Truncate a string for preview display, appending `...` when cut.
///
/// Counts characters rather than bytes so multi-byte text never splits.
#[must_use]
pub fn truncate_preview(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}

/// Derive a stable RGB color from a sender name.
///
/// Uses the classic `hash * 31 + code_unit` string hash over UTF-16 code
/// units and keeps the low 24 bits, so the same name always gets the same
/// color across runs.
#[must_use]
pub fn sender_color(name: &str) -> (u8, u8, u8) {
    let hash = name.encode_utf16().fold(0_i32, |hash, unit| {
        i32::from(unit).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    });
    let rgb = (hash & 0x00FF_FFFF) as u32;
    ((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Format a sender color as `#RRGGBB`.
#[must_use]
pub fn sender_color_hex(name: &str) -> String {
    let (r, g, b) = sender_color(name);
    format!("#{r:02X}{g:02X}{b:02X}")
}
