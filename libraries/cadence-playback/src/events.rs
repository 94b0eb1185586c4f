//! Player Events
//!
//! Notifications for the presentation layer. The controller queues them as
//! state changes happen; the host drains them with
//! [`PlaybackController::drain_events`](crate::PlaybackController::drain_events)
//! and renders.

use crate::error::MediaErrorKind;
use crate::seek::ProgressSnapshot;
use crate::types::{RepeatMode, Track};
use crate::volume::VolumeTier;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerEvent {
    /// A new track was loaded
    TrackChanged {
        index: usize,
        track: Track,
    },

    /// Adapter confirmed play or pause (or a failure forced pause)
    PlayStateChanged {
        is_playing: bool,
    },

    RepeatModeChanged {
        mode: RepeatMode,
    },

    VolumeChanged {
        fraction: f32,
        tier: VolumeTier,
    },

    /// Displayed position or time labels changed
    ProgressChanged {
        /// Displayed position (0.0-1.0)
        fraction: f64,
        /// Formatted current time ("MM:SS")
        current_label: String,
        /// Formatted total time ("MM:SS")
        total_label: String,
    },

    /// Media failure surfaced to the user
    Error {
        kind: MediaErrorKind,
        message: String,
    },
}

impl From<ProgressSnapshot> for PlayerEvent {
    fn from(snapshot: ProgressSnapshot) -> Self {
        PlayerEvent::ProgressChanged {
            fraction: snapshot.fraction,
            current_label: snapshot.current_label,
            total_label: snapshot.total_label,
        }
    }
}

impl PlayerEvent {
    /// Build an error event with a user-facing message
    pub fn error(kind: MediaErrorKind) -> Self {
        let message = match kind {
            MediaErrorKind::Network => {
                "Audio failed to load: network error. Check your connection.".to_string()
            }
            MediaErrorKind::InvalidSource => {
                "Audio file is unavailable, try another track.".to_string()
            }
            other => format!("Audio failed to load: {}", other.describe()),
        };
        PlayerEvent::Error { kind, message }
    }
}
