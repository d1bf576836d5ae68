use super::load_revisions;
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use rewind_commands::{Command, CommandKind, Revision};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// JSON file holding an array of raw revision payloads
    pub file: PathBuf,
}

pub fn inspect(args: InspectArgs, _cwd: &str) -> Result<()> {
    let revisions = load_revisions(&args.file)?;

    println!(
        "{} {} revisions in {}",
        "🔎".bright_blue(),
        revisions.len().to_string().bright_white().bold(),
        args.file.display()
    );
    println!();

    for (index, revision) in revisions.iter().enumerate() {
        let counts = kind_counts(revision)
            .iter()
            .map(|(kind, count)| format!("{}×{}", kind, count))
            .collect::<Vec<_>>()
            .join(" ");

        println!(
            "  {:>5}  {:<12} {}  {}",
            index.to_string().dimmed(),
            revision.revision_id,
            format_timestamp(revision.timestamp),
            if counts.is_empty() {
                "(no commands)".dimmed().to_string()
            } else {
                counts
            }
        );
    }

    Ok(())
}

/// Simple-command counts by kind; a multi counts itself and its subcommands
fn kind_counts(revision: &Revision) -> BTreeMap<CommandKind, usize> {
    let mut counts = BTreeMap::new();

    for command in &revision.commands {
        *counts.entry(command.kind()).or_insert(0) += 1;
        if let Command::Multi(multi) = command {
            for sub in &multi.subcommands {
                *counts.entry(sub.kind()).or_insert(0) += 1;
            }
        }
    }

    counts
}

fn format_timestamp(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        None => format!("{}ms", millis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_commands::{InsertCommand, SimpleCommand};

    #[test]
    fn test_kind_counts_include_multi_contents() {
        let revision = Revision::new(
            "r",
            0,
            vec![
                Command::insert(0, "a", 0),
                Command::multi(
                    vec![SimpleCommand::Insert(InsertCommand {
                        begin_index: 0,
                        text: "b".to_string(),
                        timestamp: 0,
                    })],
                    0,
                ),
            ],
        );

        let counts = kind_counts(&revision);
        assert_eq!(counts.get(&CommandKind::Insert), Some(&2));
        assert_eq!(counts.get(&CommandKind::Multi), Some(&1));
        assert_eq!(counts.get(&CommandKind::Delete), None);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00.000");
        assert_eq!(format_timestamp(1_500), "1970-01-01 00:00:01.500");
    }
}
