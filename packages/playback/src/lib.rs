//! # Rewind Playback
//!
//! Step, jump and play through a document's revision history.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ source: fetch raw payloads (collaborators)  │
//! └─────────────────────────────────────────────┘
//!                     ↓  rewind_commands::parse_revision
//! ┌─────────────────────────────────────────────┐
//! │ timeline: cursor + replay of 0..=cursor     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ engine: IDLE / PLAYING / PAUSED + timer     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rewind_playback::PlaybackEngine;
//!
//! let mut engine = PlaybackEngine::new(revisions);
//!
//! engine.step_forward();
//! println!("{}", engine.content());
//!
//! // Inside a Tokio runtime
//! engine.play();
//! ```

mod engine;
mod error;
mod options;
mod source;
mod timeline;

pub use engine::{PlaybackEngine, PlaybackSnapshot};
pub use error::{PlaybackError, PlaybackResult, SourceError};
pub use options::{PlaybackOptions, PlaybackOptionsPatch, BASE_INTERVAL_MS};
pub use source::{
    load_engine, AuthContext, DocumentInfo, MemoryRevisionSource, MetadataSource,
    RevisionInfo, RevisionRange, RevisionSource, UserInfo,
};
pub use timeline::{replay, PlaybackState, ReplayStrategy, Timeline, DEFAULT_CACHE_LIMIT};

// Re-export the command language for convenience
pub use rewind_commands::{Command, Revision};
