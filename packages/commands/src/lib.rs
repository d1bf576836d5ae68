//! # Rewind Commands
//!
//! Command language for document revision logs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: raw JSON payload → Revision         │
//! │  - "is" / "ds" / "st" / "mlti" changes      │
//! │  - unknown changes dropped with a warning   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ apply: (buffer, commands) → buffer          │
//! │  - pure, deterministic, total               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ detailed: per-char timestamps and styles    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use rewind_commands::{apply_commands_to_document, parse_revision_str};
//!
//! let revision = parse_revision_str(r#"{
//!     "revisionId": "r1",
//!     "timestamp": 0,
//!     "changes": [{ "ty": "is", "ibi": 0, "s": "Hello" }]
//! }"#).unwrap();
//!
//! assert_eq!(apply_commands_to_document("", &revision.commands), "Hello");
//! ```

pub mod apply;
pub mod command;
pub mod detailed;
pub mod error;
pub mod parser;

pub use apply::{
    apply_command, apply_command_in_place, apply_commands_in_place, apply_commands_to_document,
    apply_delete, apply_insert, apply_multi, apply_style,
};
pub use command::{
    Command, CommandKind, DeleteCommand, InsertCommand, MultiCommand, Revision, SimpleCommand,
    StyleCommand, StyleProperties,
};
pub use detailed::{CharRecord, DetailedDocument};
pub use error::{ParseError, ParseResult};
pub use parser::{parse_revision, parse_revision_str, parse_revisions, parse_revisions_str};
