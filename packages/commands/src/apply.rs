//! # Command Interpreter
//!
//! Pure transition function from `(buffer, commands)` to a new buffer.
//!
//! ## Determinism Contract
//!
//! Applying the same ordered commands to the same starting buffer always
//! yields the same result. There is no hidden state, randomness or clock.
//!
//! ## Index Policy
//!
//! Indices count `char`s. Any index past the end of the buffer is clamped
//! to the buffer length, and a delete whose start lies after its end
//! removes nothing. Reconstruction is therefore total: it never fails.

use crate::command::{
    Command, DeleteCommand, InsertCommand, MultiCommand, SimpleCommand, StyleCommand,
};
use std::iter;
use tracing::debug;

/// `doc[..begin] + text + doc[begin..]`
pub fn apply_insert(doc: &str, cmd: &InsertCommand) -> String {
    let mut buffer = doc.to_string();
    insert_in_place(&mut buffer, cmd);
    buffer
}

/// `doc[..start] + doc[end..]`
pub fn apply_delete(doc: &str, cmd: &DeleteCommand) -> String {
    let mut buffer = doc.to_string();
    delete_in_place(&mut buffer, cmd);
    buffer
}

/// Style commands never change text
pub fn apply_style(doc: &str, _cmd: &StyleCommand) -> String {
    doc.to_string()
}

/// Fold the subcommands over `doc`, left to right
pub fn apply_multi(doc: &str, cmd: &MultiCommand) -> String {
    let mut buffer = doc.to_string();
    multi_in_place(&mut buffer, cmd);
    buffer
}

/// Apply any command to `doc`, dispatching on its kind
pub fn apply_command(doc: &str, cmd: &Command) -> String {
    let mut buffer = doc.to_string();
    apply_command_in_place(&mut buffer, cmd);
    buffer
}

/// Fold `commands` over `doc`, left to right.
///
/// This is the entry point used to replay one revision.
pub fn apply_commands_to_document(doc: &str, commands: &[Command]) -> String {
    let mut buffer = doc.to_string();
    apply_commands_in_place(&mut buffer, commands);
    buffer
}

/// Apply one command to `buffer` without reallocating the whole string
pub fn apply_command_in_place(buffer: &mut String, cmd: &Command) {
    match cmd {
        Command::Insert(insert) => insert_in_place(buffer, insert),
        Command::Delete(delete) => delete_in_place(buffer, delete),
        Command::Style(_) => {}
        Command::Multi(multi) => multi_in_place(buffer, multi),
    }
}

/// In-place counterpart of [`apply_commands_to_document`]
pub fn apply_commands_in_place(buffer: &mut String, commands: &[Command]) {
    for cmd in commands {
        apply_command_in_place(buffer, cmd);
    }
}

fn multi_in_place(buffer: &mut String, cmd: &MultiCommand) {
    for sub in &cmd.subcommands {
        match sub {
            SimpleCommand::Insert(insert) => insert_in_place(buffer, insert),
            SimpleCommand::Delete(delete) => delete_in_place(buffer, delete),
            SimpleCommand::Style(_) => {}
        }
    }
}

fn insert_in_place(buffer: &mut String, cmd: &InsertCommand) {
    let offset = byte_offset(buffer, cmd.begin_index);
    buffer.insert_str(offset, &cmd.text);
}

fn delete_in_place(buffer: &mut String, cmd: &DeleteCommand) {
    if cmd.start_index >= cmd.end_index {
        if cmd.start_index > cmd.end_index {
            debug!(
                "Ignoring inverted delete range {}..{}",
                cmd.start_index, cmd.end_index
            );
        }
        return;
    }

    let start = byte_offset(buffer, cmd.start_index);
    let end = byte_offset(buffer, cmd.end_index);
    buffer.replace_range(start..end, "");
}

/// Byte offset of the `char_index`-th char, clamped to the buffer end
pub(crate) fn byte_offset(buffer: &str, char_index: usize) -> usize {
    let offset = buffer
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(iter::once(buffer.len()))
        .nth(char_index);

    match offset {
        Some(offset) => offset,
        None => {
            debug!(
                "Clamping index {} to buffer length {}",
                char_index,
                buffer.chars().count()
            );
            buffer.len()
        }
    }
}

/// Clamp a char index into `[0, len]`
pub(crate) fn clamp_index(index: usize, len: usize) -> usize {
    if index > len {
        debug!("Clamping index {} to buffer length {}", index, len);
        len
    } else {
        index
    }
}
