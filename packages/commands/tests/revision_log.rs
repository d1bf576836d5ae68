//! End-to-end tests: raw revision log → parsed revisions → replayed text
//!
//! This tests:
//! - Parsing a multi-revision log in order
//! - Replaying parsed commands across revisions
//! - Recovery from bad change entries mid-log

use rewind_commands::{
    apply_commands_to_document, parse_revisions, parse_revisions_str, Command, DetailedDocument,
};
use serde_json::json;

fn replay_all(source: &str) -> String {
    let revisions = parse_revisions_str(source).expect("Failed to parse");
    revisions.iter().fold(String::new(), |doc, revision| {
        apply_commands_to_document(&doc, &revision.commands)
    })
}

#[test]
fn test_replay_hello_world_log() {
    let log = r#"[
        { "revisionId": "1", "timestamp": 100, "changes": [ { "ty": "is", "ibi": 0, "s": "Hello" } ] },
        { "revisionId": "2", "timestamp": 200, "changes": [ { "ty": "is", "ibi": 5, "s": " world" } ] },
        { "revisionId": "3", "timestamp": 300, "changes": [ { "ty": "is", "ibi": 11, "s": "!" } ] }
    ]"#;

    assert_eq!(replay_all(log), "Hello world!");
}

#[test]
fn test_replay_with_multi_and_style() {
    let log = r#"[
        { "revisionId": "1", "timestamp": 1, "changes": [
            { "ty": "mlti", "cmds": [
                { "ty": "is", "ibi": 0, "s": "Hello" },
                { "ty": "is", "ibi": 5, "s": " there" }
            ] }
        ] },
        { "revisionId": "2", "timestamp": 2, "changes": [
            { "ty": "st", "si": 0, "ei": 5, "sm": { "ts_bd": true } },
            { "ty": "ds", "si": 5, "ei": 11 },
            { "ty": "is", "ibi": 5, "s": " world" }
        ] }
    ]"#;

    assert_eq!(replay_all(log), "Hello world");
}

#[test]
fn test_bad_changes_do_not_stop_replay() {
    let log = r#"[
        { "revisionId": "1", "timestamp": 1, "changes": [
            { "ty": "is", "ibi": 0, "s": "abc" },
            { "ty": "unknown" },
            { "ty": "ds", "si": "zero", "ei": 1 },
            { "ty": "is", "ibi": 3, "s": "d" }
        ] }
    ]"#;

    assert_eq!(replay_all(log), "abcd");
}

#[test]
fn test_revision_order_is_list_order() {
    // Timestamps are metadata, not a sort key
    let payloads = json!([
        { "revisionId": "late", "timestamp": 900, "changes": [ { "ty": "is", "ibi": 0, "s": "a" } ] },
        { "revisionId": "early", "timestamp": 100, "changes": [ { "ty": "is", "ibi": 0, "s": "b" } ] }
    ]);

    let revisions = parse_revisions(&payloads).unwrap();

    assert_eq!(revisions[0].revision_id, "late");
    assert_eq!(revisions[1].revision_id, "early");

    let text = revisions.iter().fold(String::new(), |doc, revision| {
        apply_commands_to_document(&doc, &revision.commands)
    });
    assert_eq!(text, "ba");
}

#[test]
fn test_detailed_document_follows_log() {
    let payloads = json!([
        { "revisionId": "1", "timestamp": 10, "changes": [ { "ty": "is", "ibi": 0, "s": "ab" } ] },
        { "revisionId": "2", "timestamp": 20, "changes": [ { "ty": "is", "ibi": 2, "s": "c" } ] }
    ]);

    let revisions = parse_revisions(&payloads).unwrap();
    let commands: Vec<Command> = revisions
        .iter()
        .flat_map(|revision| revision.commands.iter().cloned())
        .collect();

    let detailed = DetailedDocument::from_commands(&commands);

    assert_eq!(detailed.text(), "abc");
    assert_eq!(detailed.chars[2].timestamp, 20);
}
