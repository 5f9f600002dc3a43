//! Chat folder discovery.
//!
//! An export root holds one folder per chat. Each folder contains the
//! transcript (`_chat.txt`) and the attachment files it references. The list
//! of folders and their files (the inventory) can come from scanning the root
//! directly, or from a JSON listing in the `[{ "id": ..., "files": [...] }]`
//! shape produced by an external directory-listing service.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Result, ViewerError};
use crate::parser::Inventory;
use crate::TRANSCRIPT_FILE_NAME;

/// One chat folder and the files known to exist in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatFolder {
    /// Chat identifier (the folder name).
    pub id: String,
    /// File names present in the folder.
    #[serde(default)]
    pub files: Vec<String>,
}

impl ChatFolder {
    /// Create a folder record.
    pub fn new(id: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            id: id.into(),
            files,
        }
    }

    /// The inventory used to resolve attachment markers.
    #[must_use]
    pub fn inventory(&self) -> Inventory {
        self.files.iter().cloned().collect()
    }
}

/// An export root directory.
#[derive(Debug, Clone)]
pub struct ChatDirectory {
    /// Root path containing one folder per chat.
    root: PathBuf,
}

impl ChatDirectory {
    /// Create from an explicit path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();

        if !root.is_dir() {
            return Err(ViewerError::DirectoryNotFound { path: root });
        }

        Ok(Self { root })
    }

    /// Get the root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of a chat's transcript.
    #[must_use]
    pub fn transcript_path(&self, chat_id: &str) -> PathBuf {
        self.root.join(chat_id).join(TRANSCRIPT_FILE_NAME)
    }

    /// Scan the root for chat folders.
    ///
    /// Every subdirectory containing a transcript is a chat; its inventory is
    /// the set of regular files directly inside it. Folders are returned
    /// sorted by identifier.
    pub fn scan(&self) -> Result<Vec<ChatFolder>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            ViewerError::io(format!("Failed to read export root: {}", self.root.display()), e)
        })?;

        let mut folders = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ViewerError::io("Failed to read directory entry", e))?;
            let path = entry.path();
            if !path.is_dir() || !path.join(TRANSCRIPT_FILE_NAME).is_file() {
                continue;
            }

            let Some(id) = path.file_name().and_then(|n| n.to_str()) else {
                warn!(path = %path.display(), "Skipping chat folder with non UTF-8 name");
                continue;
            };

            folders.push(ChatFolder::new(id, list_files(&path)));
        }

        folders.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(root = %self.root.display(), chats = folders.len(), "Scanned export root");
        Ok(folders)
    }

    /// Use a JSON listing when given, otherwise scan the root.
    pub fn listing(&self, listing_file: Option<&Path>) -> Result<Vec<ChatFolder>> {
        match listing_file {
            Some(path) => read_listing(path),
            None => self.scan(),
        }
    }
}

/// Read a JSON listing file.
pub fn read_listing(path: &Path) -> Result<Vec<ChatFolder>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ViewerError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ViewerError::io(format!("Failed to read listing: {}", path.display()), e)
        }
    })?;
    parse_listing(&content)
}

/// Parse a JSON listing.
pub fn parse_listing(json: &str) -> Result<Vec<ChatFolder>> {
    serde_json::from_str(json).map_err(|e| ViewerError::SerializationError {
        context: "Failed to parse chat listing".to_string(),
        source: e,
    })
}

/// Names of the regular files directly inside `dir`.
fn list_files(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .collect();
    files.sort();
    files
}
