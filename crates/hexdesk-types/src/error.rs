//! Error types for hexdesk.

use std::io;

/// Errors produced by the hexdesk core.
///
/// Every variant is recoverable: callers turn them into a message (terminal
/// line, toast, or modal) and carry on with unchanged state.
#[derive(Debug, thiserror::Error)]
pub enum HexError {
    #[error("no such file or directory: {0}")]
    NotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("is a directory: {0}")]
    IsADirectory(String),

    #[error("file exists: {0}")]
    AlreadyExists(String),

    #[error("access denied: {app} requires elevated privileges")]
    PermissionDenied { app: String },

    #[error("resource limit reached: at most {limit} windows can be open")]
    ResourceExhausted { limit: usize },

    #[error("command error: {0}")]
    Command(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("external service error: {0}")]
    External(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, HexError>;
