//! Error types for playback

use rewind_commands::ParseError;
use thiserror::Error;

pub type PlaybackResult<T> = Result<T, PlaybackError>;

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Invalid playback speed {0}: must be a finite number greater than zero")]
    InvalidSpeed(f64),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Revision source error: {0}")]
    Source(#[from] SourceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures reported by revision and metadata collaborators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Not authorized to read document {0}")]
    Unauthorized(String),

    #[error("Invalid revision range {start}..{end}")]
    InvalidRange { start: u64, end: u64 },

    #[error("Transport error: {0}")]
    Transport(String),
}
