//! Mixtape configuration
//!
//! Loaded from an optional TOML file, then overridden by `BOOTH_`-prefixed
//! environment variables (`BOOTH_CAPACITY_MS`, `BOOTH_TURN_POLICY`, ...).

use crate::duration::{DEFAULT_CAPACITY_MS, DEFAULT_SIDE_THRESHOLD_MS};
use crate::error::{MixtapeError, Result};
use crate::turns::TurnPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Configuration for mixtape management
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixtapeConfig {
    /// Tape capacity in milliseconds (default: 90 minutes)
    #[serde(default = "default_capacity_ms")]
    pub capacity_ms: u64,

    /// Running time at which Side B starts (default: 45 minutes, must be non-zero)
    #[serde(default = "default_side_threshold_ms")]
    pub side_threshold_ms: u64,

    /// Treatment of out-of-turn contributions (default: Advisory)
    #[serde(default)]
    pub turn_policy: TurnPolicy,

    /// Pending commands per arbiter before senders wait (default: 64)
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,

    /// Events buffered per feed before slow subscribers lag (default: 256)
    #[serde(default = "default_feed_buffer")]
    pub feed_buffer: usize,
}

fn default_capacity_ms() -> u64 {
    DEFAULT_CAPACITY_MS
}

fn default_side_threshold_ms() -> u64 {
    DEFAULT_SIDE_THRESHOLD_MS
}

fn default_command_buffer() -> usize {
    64
}

fn default_feed_buffer() -> usize {
    256
}

impl Default for MixtapeConfig {
    fn default() -> Self {
        Self {
            capacity_ms: default_capacity_ms(),
            side_threshold_ms: default_side_threshold_ms(),
            turn_policy: TurnPolicy::default(),
            command_buffer: default_command_buffer(),
            feed_buffer: default_feed_buffer(),
        }
    }
}

impl MixtapeConfig {
    /// Load configuration from an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            debug!("Loading mixtape config from {}", path.display());
            settings = settings.add_source(config::File::from(path).required(true));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("BOOTH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .map_err(|e| MixtapeError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| MixtapeError::Config(e.to_string()))?;

        config.validate()?;
        debug!(?config, "Mixtape config loaded");
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.capacity_ms == 0 {
            return Err(MixtapeError::Config(
                "capacity_ms must be greater than zero".to_string(),
            ));
        }
        if self.side_threshold_ms == 0 {
            return Err(MixtapeError::Config(
                "side_threshold_ms must be greater than zero".to_string(),
            ));
        }
        if self.side_threshold_ms > self.capacity_ms {
            return Err(MixtapeError::Config(format!(
                "side_threshold_ms ({}) exceeds capacity_ms ({})",
                self.side_threshold_ms, self.capacity_ms
            )));
        }
        if self.command_buffer == 0 || self.feed_buffer == 0 {
            return Err(MixtapeError::Config(
                "command_buffer and feed_buffer must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
