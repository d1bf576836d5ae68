//! # Revision Commands
//!
//! Strongly-shaped edit commands recovered from a document's revision log.
//!
//! ## Command Kinds
//!
//! | Kind     | Code   | Effect on text                         |
//! |----------|--------|----------------------------------------|
//! | Insert   | `is`   | Inserts `text` at `begin_index`        |
//! | Delete   | `ds`   | Removes `[start_index, end_index)`     |
//! | Style    | `st`   | None (formatting metadata only)        |
//! | Multi    | `mlti` | Applies its subcommands in order       |
//!
//! All indices count `char`s, not bytes.
//!
//! A `Multi` holds [`SimpleCommand`]s only, so multis cannot nest.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Style properties attached to a range (`"bold": true`, `"fg": "#ff0000"`, ...)
pub type StyleProperties = Map<String, Value>;

/// Insert `text` at `begin_index`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertCommand {
    pub begin_index: usize,
    pub text: String,
    pub timestamp: i64,
}

/// Remove the half-open range `[start_index, end_index)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommand {
    pub start_index: usize,
    pub end_index: usize,
    pub timestamp: i64,
}

/// Attach formatting metadata to `[start_index, end_index)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleCommand {
    pub start_index: usize,
    pub end_index: usize,
    #[serde(default)]
    pub properties: StyleProperties,
    pub timestamp: i64,
}

/// Atomic group of simple commands, applied in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiCommand {
    pub subcommands: Vec<SimpleCommand>,
    pub timestamp: i64,
}

/// A command that may appear inside a [`MultiCommand`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SimpleCommand {
    Insert(InsertCommand),
    Delete(DeleteCommand),
    Style(StyleCommand),
}

/// One edit operation carried by a revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    Insert(InsertCommand),
    Delete(DeleteCommand),
    Style(StyleCommand),
    Multi(MultiCommand),
}

/// Short type code used by the raw revision log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CommandKind {
    Insert,
    Delete,
    Style,
    Multi,
}

impl CommandKind {
    /// Raw code for this kind (`is`, `ds`, `st`, `mlti`)
    pub fn code(self) -> &'static str {
        match self {
            CommandKind::Insert => "is",
            CommandKind::Delete => "ds",
            CommandKind::Style => "st",
            CommandKind::Multi => "mlti",
        }
    }

    /// Look up a kind by its raw code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "is" => Some(CommandKind::Insert),
            "ds" => Some(CommandKind::Delete),
            "st" => Some(CommandKind::Style),
            "mlti" => Some(CommandKind::Multi),
            _ => None,
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl SimpleCommand {
    pub fn timestamp(&self) -> i64 {
        match self {
            SimpleCommand::Insert(cmd) => cmd.timestamp,
            SimpleCommand::Delete(cmd) => cmd.timestamp,
            SimpleCommand::Style(cmd) => cmd.timestamp,
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            SimpleCommand::Insert(_) => CommandKind::Insert,
            SimpleCommand::Delete(_) => CommandKind::Delete,
            SimpleCommand::Style(_) => CommandKind::Style,
        }
    }
}

impl Command {
    pub fn timestamp(&self) -> i64 {
        match self {
            Command::Insert(cmd) => cmd.timestamp,
            Command::Delete(cmd) => cmd.timestamp,
            Command::Style(cmd) => cmd.timestamp,
            Command::Multi(cmd) => cmd.timestamp,
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Insert(_) => CommandKind::Insert,
            Command::Delete(_) => CommandKind::Delete,
            Command::Style(_) => CommandKind::Style,
            Command::Multi(_) => CommandKind::Multi,
        }
    }

    /// Shorthand for an insert command
    pub fn insert(begin_index: usize, text: impl Into<String>, timestamp: i64) -> Self {
        Command::Insert(InsertCommand {
            begin_index,
            text: text.into(),
            timestamp,
        })
    }

    /// Shorthand for a delete command
    pub fn delete(start_index: usize, end_index: usize, timestamp: i64) -> Self {
        Command::Delete(DeleteCommand {
            start_index,
            end_index,
            timestamp,
        })
    }

    /// Shorthand for a style command
    pub fn style(
        start_index: usize,
        end_index: usize,
        properties: StyleProperties,
        timestamp: i64,
    ) -> Self {
        Command::Style(StyleCommand {
            start_index,
            end_index,
            properties,
            timestamp,
        })
    }

    /// Shorthand for a multi command
    pub fn multi(subcommands: Vec<SimpleCommand>, timestamp: i64) -> Self {
        Command::Multi(MultiCommand {
            subcommands,
            timestamp,
        })
    }
}

impl From<SimpleCommand> for Command {
    fn from(cmd: SimpleCommand) -> Self {
        match cmd {
            SimpleCommand::Insert(c) => Command::Insert(c),
            SimpleCommand::Delete(c) => Command::Delete(c),
            SimpleCommand::Style(c) => Command::Style(c),
        }
    }
}

/// One timestamped bundle of commands from the revision log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub revision_id: String,
    pub timestamp: i64,
    pub commands: Vec<Command>,
}

impl Revision {
    pub fn new(revision_id: impl Into<String>, timestamp: i64, commands: Vec<Command>) -> Self {
        Self {
            revision_id: revision_id.into(),
            timestamp,
            commands,
        }
    }

    /// Number of simple commands, counting each multi's subcommands
    pub fn command_count(&self) -> usize {
        self.commands
            .iter()
            .map(|cmd| match cmd {
                Command::Multi(multi) => multi.subcommands.len(),
                _ => 1,
            })
            .sum()
    }
}
