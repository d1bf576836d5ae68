//! Playback configuration

use crate::error::{PlaybackError, PlaybackResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Interval between autoplay ticks at speed 1.0
pub const BASE_INTERVAL_MS: u64 = 100;

/// Playback engine options.
///
/// Unknown keys in a JSON options object are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaybackOptions {
    /// Playback speed multiplier (must be > 0)
    pub speed: f64,

    /// Start playing as soon as the engine is constructed
    pub auto_play: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            speed: 1.0,
            auto_play: false,
        }
    }
}

/// Partial options for [`PlaybackOptions::merge`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaybackOptionsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_play: Option<bool>,
}

impl PlaybackOptions {
    /// Load options from a JSON file, falling back to defaults if it doesn't exist
    pub fn load(path: impl AsRef<Path>) -> PlaybackResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let options: PlaybackOptions = serde_json::from_str(&content)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> PlaybackResult<()> {
        if self.speed.is_finite() && self.speed > 0.0 {
            Ok(())
        } else {
            Err(PlaybackError::InvalidSpeed(self.speed))
        }
    }

    /// Shallow-merge `patch` into a copy of these options
    pub fn merge(&self, patch: PlaybackOptionsPatch) -> PlaybackResult<Self> {
        let merged = Self {
            speed: patch.speed.unwrap_or(self.speed),
            auto_play: patch.auto_play.unwrap_or(self.auto_play),
        };
        merged.validate()?;
        Ok(merged)
    }

    /// Time between autoplay ticks: `BASE_INTERVAL_MS / speed`
    pub fn tick_interval(&self) -> Duration {
        let nanos = (BASE_INTERVAL_MS as f64 * 1_000_000.0 / self.speed).round();
        // `tokio::time::interval` panics on a zero period
        Duration::from_nanos((nanos as u64).max(1))
    }
}
