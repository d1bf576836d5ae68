use rewind_playback::{PlaybackOptions, ReplayStrategy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_NAME: &str = "rewind.config.json";

/// Rewind configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Engine options (speed, autoPlay)
    #[serde(default)]
    pub playback: PlaybackOptions,

    /// How content is rebuilt when the cursor moves
    #[serde(default)]
    pub replay: ReplayStrategy,
}

impl Config {
    /// Load config from `explicit`, or from the default file in `cwd`
    pub fn load(cwd: &str, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME),
        };

        if config_path.exists() {
            debug!("Loading config from {}", config_path.display());
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.playback.validate()?;
            Ok(config)
        } else if explicit.is_some() {
            Err(anyhow::anyhow!(
                "Config file does not exist: {}",
                config_path.display()
            ))
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }
}
