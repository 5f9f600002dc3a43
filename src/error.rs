//! Error types for chatlog-viewer.
//!
//! Failures are contained to the chat or message they originate from: a
//! transcript that cannot be read drops that one chat from the registry, and
//! parse-level problems become data flags (`is_missing`) rather than errors.
//! The variants below cover what is left: I/O, configuration, lookups and the
//! terminal front end.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for chatlog-viewer operations.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// A chat's transcript could not be fetched or read.
    #[error("Transcript unavailable for chat '{chat_id}': {reason}")]
    TranscriptUnavailable {
        /// Identifier of the chat whose transcript failed to load.
        chat_id: String,
        /// Human-readable reason.
        reason: String,
        /// Underlying I/O error, if available.
        #[source]
        source: Option<std::io::Error>,
    },

    /// Chat not present in the registry.
    #[error("Chat not found: {chat_id}")]
    ChatNotFound {
        /// Identifier that was looked up.
        chat_id: String,
    },

    /// Export root directory not found.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// Path to the missing directory.
        path: PathBuf,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Permission denied when accessing a file or directory.
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// Path where access was denied.
        path: PathBuf,
    },

    /// An operation needed an open chat but none was open.
    #[error("No chat is open")]
    NoChatOpen,

    /// Message index outside the open chat.
    #[error("Message index {index} out of range (chat has {total} messages)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of messages in the chat.
        total: usize,
    },

    /// I/O error.
    #[error("I/O error: {context}")]
    IoError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {context}")]
    SerializationError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable error message.
        message: String,
    },

    /// Invalid argument.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Name of the invalid argument.
        name: String,
        /// Reason why the argument is invalid.
        reason: String,
    },

    /// TUI error.
    #[error("TUI error: {message}")]
    TuiError {
        /// Human-readable error message.
        message: String,
    },

    /// Unsupported operation or feature.
    #[error("Unsupported: {feature}")]
    Unsupported {
        /// Name of the unsupported feature.
        feature: String,
    },

    /// Interrupted operation.
    #[error("Operation interrupted")]
    Interrupted,
}

impl ViewerError {
    /// Create a transcript-unavailable error from an I/O failure.
    #[must_use]
    pub fn transcript(chat_id: impl Into<String>, source: std::io::Error) -> Self {
        Self::TranscriptUnavailable {
            chat_id: chat_id.into(),
            reason: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a new I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            context: context.into(),
            source,
        }
    }

    /// Create a new invalid-config error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a new unsupported error.
    #[must_use]
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
        }
    }

    /// Get the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::TranscriptUnavailable { .. } => exit_codes::EXIT_DATA_ERROR,
            Self::ChatNotFound { .. } | Self::FileNotFound { .. } | Self::DirectoryNotFound { .. } => {
                exit_codes::EXIT_NOT_FOUND
            }
            Self::PermissionDenied { .. } => exit_codes::EXIT_PERMISSION_DENIED,
            Self::InvalidConfig { .. } => exit_codes::EXIT_CONFIG_ERROR,
            Self::InvalidArgument { .. } | Self::IndexOutOfRange { .. } => exit_codes::EXIT_USAGE_ERROR,
            Self::Interrupted => exit_codes::EXIT_INTERRUPTED,
            Self::IoError { .. } => exit_codes::EXIT_IO_ERROR,
            _ => exit_codes::EXIT_GENERAL_ERROR,
        }
    }

    /// Check if this error only affects a single chat and the rest of the
    /// viewer can keep going.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TranscriptUnavailable { .. } | Self::ChatNotFound { .. } | Self::IndexOutOfRange { .. }
        )
    }
}

/// Result type alias for chatlog-viewer operations.
pub type Result<T> = std::result::Result<T, ViewerError>;

impl From<std::io::Error> for ViewerError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            context: "I/O operation failed".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            context: "JSON operation failed".to_string(),
            source: err,
        }
    }
}

/// Exit codes for CLI operations.
pub mod exit_codes {
    /// Operation completed successfully.
    pub const EXIT_SUCCESS: i32 = 0;
    /// General/unspecified error.
    pub const EXIT_GENERAL_ERROR: i32 = 1;
    /// Chat, file or directory not found.
    pub const EXIT_NOT_FOUND: i32 = 3;
    /// Insufficient permissions.
    pub const EXIT_PERMISSION_DENIED: i32 = 4;
    /// Invalid configuration.
    pub const EXIT_CONFIG_ERROR: i32 = 5;
    /// Invalid command-line usage (BSD standard).
    pub const EXIT_USAGE_ERROR: i32 = 64;
    /// Input data format error (BSD standard).
    pub const EXIT_DATA_ERROR: i32 = 65;
    /// I/O error (BSD standard).
    pub const EXIT_IO_ERROR: i32 = 74;
    /// Terminated by Ctrl+C (128 + SIGINT).
    pub const EXIT_INTERRUPTED: i32 = 130;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let not_found = ViewerError::ChatNotFound {
            chat_id: "Alice".to_string(),
        };
        assert_eq!(not_found.exit_code(), 3);

        let bad_arg = ViewerError::IndexOutOfRange { index: 9, total: 3 };
        assert_eq!(bad_arg.exit_code(), 64);

        assert_eq!(ViewerError::Interrupted.exit_code(), 130);
    }

    #[test]
    fn test_is_recoverable() {
        let unavailable = ViewerError::transcript(
            "Bob",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(unavailable.is_recoverable());
        assert!(unavailable.to_string().contains("Bob"));

        let config = ViewerError::config("chunk_size must be positive");
        assert!(!config.is_recoverable());
    }
}
