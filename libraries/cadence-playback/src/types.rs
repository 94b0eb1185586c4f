//! Core types for playback control

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Catalog entry
///
/// Display metadata plus the reference handed to the media adapter.
/// Never mutated once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Catalog identifier
    pub id: u32,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Pre-formatted duration shown before metadata is loaded (e.g. "03:34")
    pub duration_label: String,

    /// Artwork reference (URL or path)
    #[serde(default)]
    pub artwork: String,

    /// Audio source reference passed to [`MediaSource::load`](crate::MediaSource::load)
    pub source: String,
}

/// Repeat mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop after the last track
    #[default]
    None,

    /// Loop the current track
    Single,

    /// Loop the whole catalog
    All,
}

impl RepeatMode {
    /// Next mode in the `None -> Single -> All -> None` cycle
    pub fn next(self) -> Self {
        match self {
            RepeatMode::None => RepeatMode::Single,
            RepeatMode::Single => RepeatMode::All,
            RepeatMode::All => RepeatMode::None,
        }
    }

    /// Short label for the presentation layer
    pub fn label(self) -> &'static str {
        match self {
            RepeatMode::None => "no repeat",
            RepeatMode::Single => "repeat one",
            RepeatMode::All => "repeat all",
        }
    }
}

/// Playback state owned by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Index of the loaded track, always inside the catalog
    pub current_index: usize,

    /// Mirrors the adapter's reported play/pause status
    pub is_playing: bool,

    pub repeat_mode: RepeatMode,
}

impl PlaybackState {
    pub(crate) fn new(repeat_mode: RepeatMode) -> Self {
        Self {
            current_index: 0,
            is_playing: false,
            repeat_mode,
        }
    }
}

/// Automatic retry for rejected play requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first failed attempt (default: 1)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay before each retry in milliseconds (default: 100)
    #[serde(default = "default_retry_delay_ms")]
    pub delay_ms: u64,
}

fn default_max_retries() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    100
}

impl RetryPolicy {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Initial volume (0.0-1.0, default: 0.8)
    #[serde(default = "default_volume")]
    pub initial_volume: f32,

    /// Initial repeat mode (default: None)
    #[serde(default)]
    pub initial_repeat: RepeatMode,

    /// Play retry policy
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_volume() -> f32 {
    0.8
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(PlaybackError::InvalidConfig(format!(
                "initial_volume must be within 0.0-1.0, got {}",
                self.initial_volume
            )));
        }
        Ok(())
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            initial_volume: default_volume(),
            initial_repeat: RepeatMode::None,
            retry: RetryPolicy::default(),
        }
    }
}
