pub mod inspect;
pub mod play;
pub mod show;

pub use inspect::{inspect, InspectArgs};
pub use play::{play, PlayArgs};
pub use show::{show, ShowArgs};

use anyhow::{Context, Result};
use rewind_commands::{parse_revisions_str, Revision};
use std::path::Path;

/// Read a JSON array of raw revision payloads
pub fn load_revisions(path: &Path) -> Result<Vec<Revision>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read revision log {}", path.display()))?;

    parse_revisions_str(&source)
        .with_context(|| format!("Invalid revision log {}", path.display()))
}
