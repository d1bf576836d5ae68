mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{inspect, play, show, InspectArgs, PlayArgs, ShowArgs};
use tracing_subscriber::EnvFilter;

/// Rewind - replay a document's revision history
#[derive(Parser, Debug)]
#[command(name = "rewind")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the document as it was at a revision
    Show(ShowArgs),

    /// Play the history back in the terminal
    Play(PlayArgs),

    /// List revisions and their commands
    Inspect(InspectArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Show(args) => show(args, &cwd),
        Command::Play(args) => play(args, &cwd),
        Command::Inspect(args) => inspect(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
