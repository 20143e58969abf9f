//! Typed errors for the response store and the media library.

use thiserror::Error;

/// Errors surfaced by the response store and the media library.
///
/// Every operation fails synchronously with one of these kinds; there is no
/// retry and no local recovery. User-facing presentation is the caller's
/// concern.
#[derive(Debug, Error)]
pub enum Error {
    /// A keyword, backing file, or media file does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An add-mode upsert collided with an existing keyword.
    #[error("keyword already exists: {0}")]
    DuplicateKey(String),

    /// The persisted document is not valid JSON, or not the expected shape.
    #[error("malformed response store: {0}")]
    Format(#[from] serde_json::Error),

    /// Filesystem failure on read, write, copy, or delete.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Rejected input, e.g. an empty keyword or an empty text variant list.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
