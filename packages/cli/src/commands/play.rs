use super::load_revisions;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use rewind_commands::Revision;
use rewind_playback::{
    PlaybackEngine, PlaybackOptions, PlaybackOptionsPatch, PlaybackSnapshot, PlaybackState,
    ReplayStrategy,
};
use std::path::PathBuf;
use tokio::time::sleep;
use tracing::info;

#[derive(Debug, Args)]
pub struct PlayArgs {
    /// JSON file holding an array of raw revision payloads
    pub file: PathBuf,

    /// Playback speed multiplier (overrides config)
    #[arg(short, long)]
    pub speed: Option<f64>,

    /// Revision index to start from (playback begins with the next one)
    #[arg(long, allow_hyphen_values = true)]
    pub from: Option<i64>,

    /// Clear the terminal before each frame
    #[arg(long)]
    pub clear: bool,

    /// Config file (defaults to rewind.config.json in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn play(args: PlayArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd, args.config.as_deref())?;
    let options = config.playback.merge(PlaybackOptionsPatch {
        speed: args.speed,
        auto_play: Some(false),
    })?;

    let revisions = load_revisions(&args.file)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    runtime.block_on(run_playback(
        revisions,
        options,
        config.replay,
        args.from,
        args.clear,
    ))
}

async fn run_playback(
    revisions: Vec<Revision>,
    options: PlaybackOptions,
    strategy: ReplayStrategy,
    from: Option<i64>,
    clear: bool,
) -> Result<()> {
    let mut engine = PlaybackEngine::with_strategy(revisions, options, strategy)?;
    if let Some(from) = from {
        engine.jump_to_revision(from);
    }

    println!(
        "{} {} revisions at {}x",
        "▶".bright_blue().bold(),
        engine.revision_count(),
        options.speed
    );

    if !engine.play() {
        return Err(anyhow!("Playback could not start"));
    }
    info!("Playing from revision {}", engine.revision_index());

    // The engine has no events; poll at twice the tick rate
    let poll = options.tick_interval() / 2;
    let mut last_index = engine.revision_index();

    loop {
        sleep(poll).await;

        let snapshot = engine.snapshot();
        if snapshot.revision_index != last_index {
            render_frame(&snapshot, clear);
            last_index = snapshot.revision_index;
        }

        if snapshot.state != PlaybackState::Playing {
            break;
        }
    }

    info!("Playback stopped at revision {}", last_index);
    println!();
    println!("{} Playback complete", "✅".green());
    Ok(())
}

fn render_frame(snapshot: &PlaybackSnapshot, clear: bool) {
    if clear {
        print!("\x1B[2J\x1B[H");
    }

    println!(
        "{}",
        format!(
            "── revision {}/{} ──",
            snapshot.revision_index + 1,
            snapshot.revision_count
        )
        .dimmed()
    );
    println!("{}", snapshot.content);
}
