//! Platform-agnostic media source trait
//!
//! Abstracts the single media element the controller drives (an HTML
//! `<audio>` element in the browser, a simulated element in the CLI).

use crate::error::MediaError;
use serde::{Deserialize, Serialize};

/// Identifies one `load` request
///
/// `generation` increases on every load, so reselecting the same index
/// still produces a fresh stamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadStamp {
    pub generation: u64,
    pub index: usize,
}

/// Notification produced by a [`MediaSource`]
///
/// Adapters tag each notification with the stamp of the load that produced
/// it; the controller drops notifications from superseded loads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaEvent {
    pub stamp: LoadStamp,
    pub kind: MediaEventKind,
}

impl MediaEvent {
    pub fn new(stamp: LoadStamp, kind: MediaEventKind) -> Self {
        Self { stamp, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MediaEventKind {
    /// Duration is now known
    MetadataLoaded,

    /// Playback actually started
    PlayStarted,

    /// Playback actually paused
    PauseStarted,

    /// Reached the end of the resource
    Ended,

    /// Current time advanced
    Progress,

    /// Resource-level failure
    Error(MediaError),

    /// A `play()` request was rejected asynchronously
    ///
    /// `request` is the id passed to [`MediaSource::play`].
    PlayRejected { request: u64, error: MediaError },
}

/// Platform-specific media element
///
/// Only the playback controller calls the mutating methods.
pub trait MediaSource {
    /// Replace the current source, reset position to zero and start buffering
    ///
    /// Notifications for this load must carry `stamp`.
    fn load(&mut self, source: &str, stamp: LoadStamp) -> Result<(), MediaError>;

    /// Request playback
    ///
    /// `Ok` only means the request was accepted; the outcome arrives later as
    /// [`MediaEventKind::PlayStarted`] or [`MediaEventKind::PlayRejected`]
    /// carrying `request`.
    fn play(&mut self, request: u64) -> Result<(), MediaError>;

    fn pause(&mut self) -> Result<(), MediaError>;

    /// Move the playback position (seconds from start)
    fn seek(&mut self, seconds: f64) -> Result<(), MediaError>;

    /// Set output volume (0.0-1.0)
    fn set_volume(&mut self, fraction: f32) -> Result<(), MediaError>;

    /// Total duration in seconds, `None` until metadata is loaded
    fn duration(&self) -> Option<f64>;

    /// Current position in seconds
    fn current_time(&self) -> f64;
}

/// Filter a raw duration down to a usable one (finite and positive)
pub fn known_duration(raw: f64) -> Option<f64> {
    (raw.is_finite() && raw > 0.0).then_some(raw)
}
