//! Player list error types.

use std::path::PathBuf;

/// Errors that can occur while editing the whitelist or ban list.
#[derive(thiserror::Error, Debug)]
pub enum PlayerError {
    /// The username could not be resolved to a UUID.
    #[error("Could not resolve UUID for {0}")]
    UnresolvedName(String),

    /// The player is already on the list.
    #[error("{name} is already on the {list}")]
    AlreadyListed { name: String, list: &'static str },

    /// The player is not on the list.
    #[error("{name} is not on the {list}")]
    NotFound { name: String, list: &'static str },

    /// I/O error writing a list file.
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
