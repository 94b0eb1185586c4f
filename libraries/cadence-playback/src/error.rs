//! Error types for playback control

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Track index outside the catalog
    #[error("Track index {index} out of range (catalog has {len} tracks)")]
    InvalidIndex { index: usize, len: usize },

    /// Catalog must contain at least one track
    #[error("Catalog is empty")]
    EmptyCatalog,

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Media adapter error
    #[error("Media error: {0}")]
    Media(#[from] MediaError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Classification of a media adapter failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaErrorKind {
    /// Fetching the resource was aborted
    Aborted,

    /// Network failure while fetching
    Network,

    /// Resource could not be decoded
    Decode,

    /// Source missing or format not supported
    InvalidSource,

    /// Anything else (including rejected play requests)
    Unknown,
}

impl MediaErrorKind {
    /// Map an HTML media error code (`MediaError.code`)
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => MediaErrorKind::Aborted,
            2 => MediaErrorKind::Network,
            3 => MediaErrorKind::Decode,
            4 => MediaErrorKind::InvalidSource,
            _ => MediaErrorKind::Unknown,
        }
    }

    /// Human-readable classification for the presentation layer
    pub fn describe(self) -> &'static str {
        match self {
            MediaErrorKind::Aborted => "audio loading was aborted",
            MediaErrorKind::Network => "network error",
            MediaErrorKind::Decode => "decoding error",
            MediaErrorKind::InvalidSource => "invalid or unsupported audio source",
            MediaErrorKind::Unknown => "unknown error",
        }
    }
}

/// Error reported by a [`MediaSource`](crate::MediaSource)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{} (transient: {transient})", .kind.describe())]
pub struct MediaError {
    pub kind: MediaErrorKind,

    /// Hint that retrying may succeed (e.g. autoplay blocked, network blip)
    pub transient: bool,
}

impl MediaError {
    pub fn new(kind: MediaErrorKind, transient: bool) -> Self {
        Self { kind, transient }
    }

    /// Build from an HTML media error code
    ///
    /// Network failures are the only codes treated as transient.
    pub fn from_code(code: u16) -> Self {
        let kind = MediaErrorKind::from_code(code);
        Self::new(kind, kind == MediaErrorKind::Network)
    }
}
