//! # Revision Parser
//!
//! Converts loosely-typed revision payloads into [`Revision`]s.
//!
//! ## Payload Shape
//!
//! ```json
//! {
//!   "revisionId": "r42",
//!   "timestamp": 1700000000000,
//!   "changes": [
//!     { "ty": "is", "ibi": 0, "s": "Hello", "timestamp": 1700000000001 },
//!     { "ty": "ds", "si": 0, "ei": 1 },
//!     { "ty": "st", "si": 0, "ei": 4, "sm": { "bold": true } },
//!     { "ty": "mlti", "cmds": [ { "ty": "is", "ibi": 0, "s": "H" } ] }
//!   ]
//! }
//! ```
//!
//! ## Recovery Boundaries
//!
//! - The top-level payload is structural: a missing id, timestamp or
//!   change list fails the whole revision.
//! - Individual changes are leaves: an unknown code or a malformed field
//!   drops that change (with a warning) and parsing continues.
//! - A `mlti` nested inside a `mlti` is spliced into its parent.

use crate::command::{
    Command, CommandKind, DeleteCommand, InsertCommand, MultiCommand, Revision, SimpleCommand,
    StyleCommand, StyleProperties,
};
use crate::error::{ChangeError, ParseError, ParseResult};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

const REVISION_ID_FIELDS: &[&str] = &["revisionId", "id"];
const TIMESTAMP_FIELDS: &[&str] = &["timestamp", "t"];
const CHANGES_FIELDS: &[&str] = &["changes"];

const TYPE_FIELDS: &[&str] = &["ty", "type"];
const BEGIN_INDEX_FIELDS: &[&str] = &["ibi", "beginIndex"];
const TEXT_FIELDS: &[&str] = &["s", "text"];
const START_INDEX_FIELDS: &[&str] = &["si", "startIndex"];
const END_INDEX_FIELDS: &[&str] = &["ei", "endIndex"];
const PROPERTIES_FIELDS: &[&str] = &["sm", "properties"];
const SUBCOMMAND_FIELDS: &[&str] = &["cmds", "mts"];

/// Parse one raw revision payload
#[instrument(skip(payload))]
pub fn parse_revision(payload: &Value) -> ParseResult<Revision> {
    let obj = payload.as_object().ok_or(ParseError::NotAnObject)?;

    let revision_id = match lookup(obj, REVISION_ID_FIELDS) {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(n)) if n.is_u64() || n.is_i64() => n.to_string(),
        Some(_) => return Err(ParseError::invalid("revisionId", "string or integer")),
        None => return Err(ParseError::missing("revisionId")),
    };

    let timestamp = match lookup(obj, TIMESTAMP_FIELDS) {
        Some(value) => value
            .as_i64()
            .ok_or_else(|| ParseError::invalid("timestamp", "integer"))?,
        None => return Err(ParseError::missing("timestamp")),
    };

    let changes = match lookup(obj, CHANGES_FIELDS) {
        Some(Value::Array(changes)) => changes,
        Some(_) => return Err(ParseError::invalid("changes", "array")),
        None => return Err(ParseError::missing("changes")),
    };

    let mut commands = Vec::with_capacity(changes.len());
    for (index, change) in changes.iter().enumerate() {
        match parse_change(change, timestamp, &revision_id, &index.to_string()) {
            Ok(command) => commands.push(command),
            Err(e) => warn!(
                "Dropping change {} in revision {}: {}",
                index, revision_id, e
            ),
        }
    }

    debug!(
        "Parsed revision {} with {} of {} changes",
        revision_id,
        commands.len(),
        changes.len()
    );

    Ok(Revision {
        revision_id,
        timestamp,
        commands,
    })
}

/// Parse a revision payload from JSON text
pub fn parse_revision_str(source: &str) -> ParseResult<Revision> {
    let payload: Value = serde_json::from_str(source)?;
    parse_revision(&payload)
}

/// Parse a JSON array of revision payloads, keeping their order.
///
/// Fails on the first structurally unusable payload.
pub fn parse_revisions(payloads: &Value) -> ParseResult<Vec<Revision>> {
    let list = payloads
        .as_array()
        .ok_or_else(|| ParseError::invalid("revisions", "array"))?;

    list.iter()
        .enumerate()
        .map(|(index, payload)| {
            parse_revision(payload).map_err(|e| ParseError::at_index(index, e))
        })
        .collect()
}

/// Parse a JSON array of revision payloads from text
pub fn parse_revisions_str(source: &str) -> ParseResult<Vec<Revision>> {
    let payloads: Value = serde_json::from_str(source)?;
    parse_revisions(&payloads)
}

fn parse_change(
    change: &Value,
    fallback_timestamp: i64,
    revision_id: &str,
    position: &str,
) -> Result<Command, ChangeError> {
    let obj = change.as_object().ok_or(ChangeError::NotAnObject)?;

    let code = lookup(obj, TYPE_FIELDS)
        .and_then(Value::as_str)
        .ok_or(ChangeError::MissingType)?;
    let kind =
        CommandKind::from_code(code).ok_or_else(|| ChangeError::UnknownType(code.to_string()))?;

    let timestamp = lookup(obj, TIMESTAMP_FIELDS)
        .and_then(Value::as_i64)
        .unwrap_or(fallback_timestamp);

    let command = match kind {
        CommandKind::Insert => Command::Insert(InsertCommand {
            begin_index: index_field(obj, kind, "ibi", BEGIN_INDEX_FIELDS)?,
            text: string_field(obj, kind, "s", TEXT_FIELDS)?,
            timestamp,
        }),

        CommandKind::Delete => Command::Delete(DeleteCommand {
            start_index: index_field(obj, kind, "si", START_INDEX_FIELDS)?,
            end_index: index_field(obj, kind, "ei", END_INDEX_FIELDS)?,
            timestamp,
        }),

        CommandKind::Style => Command::Style(StyleCommand {
            start_index: index_field(obj, kind, "si", START_INDEX_FIELDS)?,
            end_index: index_field(obj, kind, "ei", END_INDEX_FIELDS)?,
            properties: properties_field(obj, kind)?,
            timestamp,
        }),

        CommandKind::Multi => {
            let nested = match lookup(obj, SUBCOMMAND_FIELDS) {
                Some(Value::Array(nested)) => nested,
                Some(_) => return Err(field_error(kind, "cmds", true)),
                None => return Err(field_error(kind, "cmds", false)),
            };

            let mut subcommands = Vec::with_capacity(nested.len());
            collect_subcommands(nested, timestamp, revision_id, position, &mut subcommands);

            Command::Multi(MultiCommand {
                subcommands,
                timestamp,
            })
        }
    };

    Ok(command)
}

/// Parse the nested list of a multi, splicing inner multis in place
fn collect_subcommands(
    nested: &[Value],
    fallback_timestamp: i64,
    revision_id: &str,
    position: &str,
    out: &mut Vec<SimpleCommand>,
) {
    for (index, change) in nested.iter().enumerate() {
        let nested_position = format!("{}.{}", position, index);

        match parse_change(change, fallback_timestamp, revision_id, &nested_position) {
            Ok(Command::Insert(cmd)) => out.push(SimpleCommand::Insert(cmd)),
            Ok(Command::Delete(cmd)) => out.push(SimpleCommand::Delete(cmd)),
            Ok(Command::Style(cmd)) => out.push(SimpleCommand::Style(cmd)),
            Ok(Command::Multi(inner)) => {
                debug!(
                    "Flattening nested multi {} in revision {}",
                    nested_position, revision_id
                );
                out.extend(inner.subcommands);
            }
            Err(e) => warn!(
                "Dropping change {} in revision {}: {}",
                nested_position, revision_id, e
            ),
        }
    }
}

fn lookup<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| obj.get(*name))
}

fn field_error(kind: CommandKind, field: &'static str, present: bool) -> ChangeError {
    if present {
        ChangeError::InvalidField {
            code: kind.code(),
            field,
        }
    } else {
        ChangeError::MissingField {
            code: kind.code(),
            field,
        }
    }
}

fn index_field(
    obj: &Map<String, Value>,
    kind: CommandKind,
    field: &'static str,
    names: &[&str],
) -> Result<usize, ChangeError> {
    let value = lookup(obj, names).ok_or_else(|| field_error(kind, field, false))?;

    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| field_error(kind, field, true))
}

fn string_field(
    obj: &Map<String, Value>,
    kind: CommandKind,
    field: &'static str,
    names: &[&str],
) -> Result<String, ChangeError> {
    match lookup(obj, names) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(field_error(kind, field, true)),
        None => Err(field_error(kind, field, false)),
    }
}

fn properties_field(
    obj: &Map<String, Value>,
    kind: CommandKind,
) -> Result<StyleProperties, ChangeError> {
    match lookup(obj, PROPERTIES_FIELDS) {
        Some(Value::Object(props)) => Ok(props.clone()),
        Some(Value::Null) | None => Ok(StyleProperties::new()),
        Some(_) => Err(field_error(kind, "sm", true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_insert_and_delete() {
        let payload = json!({
            "revisionId": "r1",
            "timestamp": 1000,
            "changes": [
                { "ty": "is", "ibi": 0, "s": "Hello", "timestamp": 1001 },
                { "ty": "ds", "si": 1, "ei": 3 }
            ]
        });

        let revision = parse_revision(&payload).unwrap();

        assert_eq!(revision.revision_id, "r1");
        assert_eq!(revision.timestamp, 1000);
        assert_eq!(
            revision.commands,
            vec![Command::insert(0, "Hello", 1001), Command::delete(1, 3, 1000)]
        );
    }

    #[test]
    fn test_parse_accepts_long_field_names() {
        let payload = json!({
            "id": 7,
            "timestamp": 5,
            "changes": [
                { "type": "is", "beginIndex": 2, "text": "x" },
                { "type": "st", "startIndex": 0, "endIndex": 1, "properties": { "bold": true } }
            ]
        });

        let revision = parse_revision(&payload).unwrap();

        assert_eq!(revision.revision_id, "7");
        assert_eq!(revision.commands[0], Command::insert(2, "x", 5));
        match &revision.commands[1] {
            Command::Style(style) => {
                assert_eq!(style.properties.get("bold"), Some(&json!(true)));
            }
            other => panic!("Expected style, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_is_skipped() {
        let payload = json!({
            "revisionId": "r1",
            "timestamp": 0,
            "changes": [
                { "ty": "is", "ibi": 0, "s": "a" },
                { "ty": "rplc", "snapshot": [] },
                { "ty": "is", "ibi": 1, "s": "b" }
            ]
        });

        let revision = parse_revision(&payload).unwrap();

        assert_eq!(
            revision.commands,
            vec![Command::insert(0, "a", 0), Command::insert(1, "b", 0)]
        );
    }

    #[test]
    fn test_malformed_change_is_skipped() {
        let payload = json!({
            "revisionId": "r1",
            "timestamp": 0,
            "changes": [
                { "ty": "is", "ibi": -1, "s": "a" },
                { "ty": "ds", "si": 0 },
                "not an object",
                { "ibi": 0, "s": "no type" },
                { "ty": "is", "ibi": 0, "s": "ok" }
            ]
        });

        let revision = parse_revision(&payload).unwrap();

        assert_eq!(revision.commands, vec![Command::insert(0, "ok", 0)]);
    }

    #[test]
    fn test_multi_keeps_order() {
        let payload = json!({
            "revisionId": "r1",
            "timestamp": 9,
            "changes": [
                { "ty": "mlti", "cmds": [
                    { "ty": "is", "ibi": 0, "s": "Hello" },
                    { "ty": "is", "ibi": 5, "s": " world" }
                ] }
            ]
        });

        let revision = parse_revision(&payload).unwrap();

        match &revision.commands[0] {
            Command::Multi(multi) => {
                assert_eq!(multi.timestamp, 9);
                assert_eq!(multi.subcommands.len(), 2);
                assert_eq!(multi.subcommands[0].kind(), CommandKind::Insert);
                assert_eq!(multi.subcommands[1].timestamp(), 9);
            }
            other => panic!("Expected multi, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_multi_is_flattened() {
        let payload = json!({
            "revisionId": "r1",
            "timestamp": 0,
            "changes": [
                { "ty": "mlti", "cmds": [
                    { "ty": "is", "ibi": 0, "s": "a" },
                    { "ty": "mlti", "cmds": [
                        { "ty": "is", "ibi": 1, "s": "b" },
                        { "ty": "ds", "si": 0, "ei": 1 }
                    ] },
                    { "ty": "is", "ibi": 1, "s": "c" }
                ] }
            ]
        });

        let revision = parse_revision(&payload).unwrap();

        let Command::Multi(multi) = &revision.commands[0] else {
            panic!("Expected multi");
        };
        let kinds: Vec<_> = multi.subcommands.iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                CommandKind::Insert,
                CommandKind::Insert,
                CommandKind::Delete,
                CommandKind::Insert
            ]
        );
    }

    #[test]
    fn test_missing_changes_fails() {
        let payload = json!({ "revisionId": "r1", "timestamp": 0 });

        let err = parse_revision(&payload).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field: "changes" }));
    }

    #[test]
    fn test_invalid_timestamp_fails() {
        let payload = json!({ "revisionId": "r1", "timestamp": "yesterday", "changes": [] });

        let err = parse_revision(&payload).unwrap_err();
        assert!(matches!(err, ParseError::InvalidField { field: "timestamp", .. }));
    }

    #[test]
    fn test_non_object_payload_fails() {
        assert!(matches!(
            parse_revision(&json!([1, 2, 3])),
            Err(ParseError::NotAnObject)
        ));
    }

    #[test]
    fn test_parse_revisions_reports_position() {
        let payloads = json!([
            { "revisionId": "r1", "timestamp": 0, "changes": [] },
            { "revisionId": "r2", "changes": [] }
        ]);

        let err = parse_revisions(&payloads).unwrap_err();
        assert!(matches!(err, ParseError::AtIndex { index: 1, .. }));
    }

    #[test]
    fn test_parse_revision_str_rejects_bad_json() {
        assert!(matches!(
            parse_revision_str("{ not json"),
            Err(ParseError::Json(_))
        ));
    }
}
