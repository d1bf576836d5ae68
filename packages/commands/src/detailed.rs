//! # Detailed Document
//!
//! Per-character view of a replayed document: each char remembers the
//! timestamp of the insert that produced it and the style properties
//! applied over it. Uses the same index policy as [`crate::apply`].

use crate::apply::clamp_index;
use crate::command::{Command, SimpleCommand, StyleProperties};
use serde::{Deserialize, Serialize};

/// One character and its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharRecord {
    pub ch: char,
    pub timestamp: i64,
    #[serde(default)]
    pub styles: StyleProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedDocument {
    pub chars: Vec<CharRecord>,
}

impl DetailedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay `commands` starting from an empty document
    pub fn from_commands(commands: &[Command]) -> Self {
        let mut doc = Self::new();
        doc.apply_all(commands);
        doc
    }

    /// Replay `commands` on top of existing `content`.
    ///
    /// Pre-existing chars carry timestamp 0 and no styles.
    pub fn from_content(content: &str, commands: &[Command]) -> Self {
        let mut doc = Self {
            chars: content
                .chars()
                .map(|ch| CharRecord {
                    ch,
                    timestamp: 0,
                    styles: StyleProperties::new(),
                })
                .collect(),
        };
        doc.apply_all(commands);
        doc
    }

    pub fn apply_all(&mut self, commands: &[Command]) {
        for cmd in commands {
            self.apply(cmd);
        }
    }

    pub fn apply(&mut self, cmd: &Command) {
        match cmd {
            Command::Insert(insert) => {
                self.insert(insert.begin_index, &insert.text, insert.timestamp)
            }
            Command::Delete(delete) => self.delete(delete.start_index, delete.end_index),
            Command::Style(style) => {
                self.style(style.start_index, style.end_index, &style.properties)
            }
            Command::Multi(multi) => {
                for sub in &multi.subcommands {
                    match sub {
                        SimpleCommand::Insert(insert) => {
                            self.insert(insert.begin_index, &insert.text, insert.timestamp)
                        }
                        SimpleCommand::Delete(delete) => {
                            self.delete(delete.start_index, delete.end_index)
                        }
                        SimpleCommand::Style(style) => {
                            self.style(style.start_index, style.end_index, &style.properties)
                        }
                    }
                }
            }
        }
    }

    /// Plain text of the document
    pub fn text(&self) -> String {
        self.chars.iter().map(|record| record.ch).collect()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    fn insert(&mut self, begin_index: usize, text: &str, timestamp: i64) {
        let at = clamp_index(begin_index, self.chars.len());
        let records = text.chars().map(|ch| CharRecord {
            ch,
            timestamp,
            styles: StyleProperties::new(),
        });
        self.chars.splice(at..at, records);
    }

    fn delete(&mut self, start_index: usize, end_index: usize) {
        let range = self.range(start_index, end_index);
        self.chars.drain(range);
    }

    fn style(&mut self, start_index: usize, end_index: usize, properties: &StyleProperties) {
        let range = self.range(start_index, end_index);
        for record in &mut self.chars[range] {
            for (key, value) in properties {
                record.styles.insert(key.clone(), value.clone());
            }
        }
    }

    fn range(&self, start_index: usize, end_index: usize) -> std::ops::Range<usize> {
        let len = self.chars.len();
        let start = clamp_index(start_index, len);
        let end = clamp_index(end_index, len).max(start);
        start..end
    }
}
