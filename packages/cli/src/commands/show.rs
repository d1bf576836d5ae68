use super::load_revisions;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use rewind_commands::{Command, DetailedDocument, Revision};
use rewind_playback::{PlaybackEngine, PlaybackOptions};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// JSON file holding an array of raw revision payloads
    pub file: PathBuf,

    /// Revision index to reconstruct (-1 is the empty document; defaults to the last)
    #[arg(short, long, allow_hyphen_values = true)]
    pub revision: Option<i64>,

    /// Print a JSON snapshot instead of plain text
    #[arg(long)]
    pub json: bool,

    /// Print each character with the timestamp of the edit that wrote it
    #[arg(long, conflicts_with = "json")]
    pub detailed: bool,

    /// Config file (defaults to rewind.config.json in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn show(args: ShowArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd, args.config.as_deref())?;
    let revisions = load_revisions(&args.file)?;

    let output = render(revisions, &config, args.revision, args.json, args.detailed)?;
    println!("{}", output);
    Ok(())
}

/// Reconstruct the document at `revision` (clamped like a jump) and format it
fn render(
    revisions: Vec<Revision>,
    config: &Config,
    revision: Option<i64>,
    json: bool,
    detailed: bool,
) -> Result<String> {
    let target = revision.unwrap_or(revisions.len() as i64 - 1);

    // Showing never plays
    let options = PlaybackOptions {
        auto_play: false,
        ..config.playback
    };
    let engine = PlaybackEngine::with_strategy(revisions.clone(), options, config.replay)?;
    engine.jump_to_revision(target);

    if json {
        return Ok(serde_json::to_string_pretty(&engine.snapshot())?);
    }

    eprintln!(
        "{} revision {} of {}",
        "⏪".bright_blue(),
        engine.revision_index().to_string().bright_white().bold(),
        engine.revision_count()
    );

    if detailed {
        let detailed = DetailedDocument::from_commands(&commands_upto(
            &revisions,
            engine.revision_index(),
        ));
        let lines: Vec<String> = detailed
            .chars
            .iter()
            .map(|record| format!("{:>16}  {:?}", record.timestamp, record.ch))
            .collect();
        Ok(lines.join("\n"))
    } else {
        Ok(engine.content())
    }
}

/// Every command of revisions `0..=index`, in replay order
fn commands_upto(revisions: &[Revision], index: i64) -> Vec<Command> {
    let count = usize::try_from(index + 1).unwrap_or(0).min(revisions.len());

    revisions[..count]
        .iter()
        .flat_map(|revision| revision.commands.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const LOG: &str = r#"[
        { "revisionId": "1", "timestamp": 100, "changes": [ { "ty": "is", "ibi": 0, "s": "Hello" } ] },
        { "revisionId": "2", "timestamp": 200, "changes": [ { "ty": "is", "ibi": 5, "s": " world" } ] },
        { "revisionId": "3", "timestamp": 300, "changes": [ { "ty": "is", "ibi": 11, "s": "!" } ] }
    ]"#;

    fn revisions_from_temp_log() -> Vec<Revision> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, LOG).unwrap();

        load_revisions(&path).unwrap()
    }

    #[test]
    fn test_render_defaults_to_last_revision() {
        let output = render(revisions_from_temp_log(), &Config::default(), None, false, false);
        assert_eq!(output.unwrap(), "Hello world!");
    }

    #[test]
    fn test_render_clamps_revision() {
        let config = Config::default();

        let past_end = render(revisions_from_temp_log(), &config, Some(99), false, false);
        assert_eq!(past_end.unwrap(), "Hello world!");

        let before_start = render(revisions_from_temp_log(), &config, Some(-5), false, false);
        assert_eq!(before_start.unwrap(), "");
    }

    #[test]
    fn test_render_json_snapshot_reports_clamped_index() {
        let output = render(revisions_from_temp_log(), &Config::default(), Some(99), true, false);
        let snapshot: Value = serde_json::from_str(&output.unwrap()).unwrap();

        assert_eq!(snapshot["revisionIndex"], 2);
        assert_eq!(snapshot["revisionCount"], 3);
        assert_eq!(snapshot["state"], "IDLE");
        assert_eq!(snapshot["content"], "Hello world!");
    }

    #[test]
    fn test_render_detailed_lists_each_char() {
        let output = render(revisions_from_temp_log(), &Config::default(), Some(0), false, true);
        let lines: Vec<String> = output.unwrap().lines().map(str::to_string).collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].ends_with("'H'"));
        assert!(lines[0].trim_start().starts_with("100"));
    }

    #[test]
    fn test_commands_upto() {
        let revisions = vec![
            Revision::new("a", 0, vec![Command::insert(0, "a", 0)]),
            Revision::new("b", 1, vec![Command::insert(1, "b", 1), Command::delete(0, 1, 1)]),
        ];

        assert!(commands_upto(&revisions, -1).is_empty());
        assert_eq!(commands_upto(&revisions, 0).len(), 1);
        assert_eq!(commands_upto(&revisions, 1).len(), 3);
        assert_eq!(commands_upto(&revisions, 9).len(), 3);
    }
}
