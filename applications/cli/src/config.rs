/// CLI configuration
use crate::error::{CliError, Result};
use cadence_playback::{Catalog, PlaybackConfig, Track};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "cadence.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default = "default_tracks")]
    pub tracks: Vec<Track>,

    #[serde(default)]
    pub simulation: SimulationSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationSettings {
    /// Virtual clock step used by `tick`
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Sources whose play requests are always rejected
    #[serde(default)]
    pub failing_sources: Vec<String>,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist. Without one, `cadence.toml` in the
    /// working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (CADENCE_PLAYBACK__INITIAL_VOLUME=0.5)
        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.playback.validate()?;

        if self.tracks.is_empty() {
            return Err(CliError::Config(
                "at least one [[tracks]] entry is required".to_string(),
            ));
        }

        if self.simulation.tick_ms == 0 {
            return Err(CliError::Config(
                "simulation.tick_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the playback catalog from `tracks`
    pub fn catalog(&self) -> Result<Catalog> {
        Ok(Catalog::new(self.tracks.clone())?)
    }
}

// Default values
fn default_tick_ms() -> u64 {
    250
}

/// Built-in playlist used when no `[[tracks]]` are configured
pub fn default_tracks() -> Vec<Track> {
    vec![
        Track {
            id: 1,
            title: "How Are You".to_string(),
            artist: "梁老师Tsong".to_string(),
            duration_label: "02:58".to_string(),
            artwork: "https://picsum.photos/300/300?random=1".to_string(),
            source: "./M500003RFtUR0BOBnU.mp3".to_string(),
        },
        Track {
            id: 2,
            title: "70%".to_string(),
            artist: "GALI".to_string(),
            duration_label: "03:34".to_string(),
            artwork: "https://picsum.photos/300/300?random=2".to_string(),
            source: "./M800000nFHQO4XPMpX.mp3".to_string(),
        },
        Track {
            id: 3,
            title: "很高兴认识你".to_string(),
            artist: "C-BLOCK".to_string(),
            duration_label: "03:52".to_string(),
            artwork: "https://picsum.photos/300/300?random=4".to_string(),
            source: "./M500001FkHdq3lZBw1.mp3".to_string(),
        },
    ]
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            failing_sources: Vec::new(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            tracks: default_tracks(),
            simulation: SimulationSettings::default(),
        }
    }
}
