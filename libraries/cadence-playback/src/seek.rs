//! Progress and seek coordination
//!
//! Three inputs compete for the displayed position:
//! - live progress from the media element
//! - discrete scrubs (click on the progress track)
//! - continuous drags of the progress handle
//!
//! While a drag is in progress it owns the displayed position and live
//! progress is ignored. A drag performs a single seek when it ends.
//!
//! The coordinator never touches the media element; it returns the seek
//! target and the controller forwards it.

use serde::{Deserialize, Serialize};

/// Label shown when no time is known
const ZERO_LABEL: &str = "00:00";

/// Format seconds as `MM:SS`
///
/// Minutes are not capped at 59 (`3605` formats as `60:05`). NaN, negative
/// and infinite inputs format as `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return ZERO_LABEL.to_string();
    }
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{:02}:{:02}", minutes, secs)
}

/// Normalize a pointer offset against the progress track width
///
/// The offset is clamped to the track bounds first, so pointers outside the
/// track pin to 0 or 1. Degenerate widths yield 0.
pub fn pointer_fraction(offset_px: f64, width_px: f64) -> f64 {
    if width_px.is_nan() || width_px <= 0.0 || offset_px.is_nan() {
        return 0.0;
    }
    offset_px.clamp(0.0, width_px) / width_px
}

fn clamp_fraction(fraction: f64) -> f64 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

/// Seek state owned by the coordinator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeekState {
    /// A drag gesture currently owns the displayed position
    pub is_manually_positioning: bool,

    /// Displayed position (0.0-1.0)
    pub displayed_fraction: f64,
}

/// What the presentation layer should show
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub fraction: f64,
    pub current_label: String,
    pub total_label: String,
}

/// Result of a scrub: the optimistic display plus the seek to perform
#[derive(Debug, Clone, PartialEq)]
pub struct ScrubOutcome {
    pub snapshot: ProgressSnapshot,

    /// Target in seconds, `None` while the duration is unknown
    pub seek_to: Option<f64>,
}

/// Reconciles live progress, scrubs and drags
#[derive(Debug, Clone)]
pub struct SeekCoordinator {
    state: SeekState,
    current_label: String,
    total_label: String,
}

impl SeekCoordinator {
    /// Create a coordinator showing position zero and a placeholder total
    pub fn new(total_label: &str) -> Self {
        Self {
            state: SeekState::default(),
            current_label: ZERO_LABEL.to_string(),
            total_label: total_label.to_string(),
        }
    }

    pub fn state(&self) -> SeekState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_manually_positioning
    }

    pub fn displayed_fraction(&self) -> f64 {
        self.state.displayed_fraction
    }

    pub fn current_label(&self) -> &str {
        &self.current_label
    }

    pub fn total_label(&self) -> &str {
        &self.total_label
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            fraction: self.state.displayed_fraction,
            current_label: self.current_label.clone(),
            total_label: self.total_label.clone(),
        }
    }

    /// New track loaded: position zero, placeholder total until metadata
    ///
    /// An ongoing drag keeps ownership of the pointer.
    pub fn reset(&mut self, total_label: &str) -> ProgressSnapshot {
        self.total_label = total_label.to_string();
        self.rewind()
    }

    /// Position back to zero on the same track
    pub fn rewind(&mut self) -> ProgressSnapshot {
        self.state.displayed_fraction = 0.0;
        self.current_label = ZERO_LABEL.to_string();
        self.snapshot()
    }

    /// Live progress from the media element
    ///
    /// Skipped while dragging or while the duration is unknown.
    pub fn on_progress(
        &mut self,
        current_time: f64,
        duration: Option<f64>,
    ) -> Option<ProgressSnapshot> {
        if self.state.is_manually_positioning {
            return None;
        }
        let duration = duration?;

        self.state.displayed_fraction = clamp_fraction(current_time / duration);
        self.current_label = format_time(current_time);
        self.total_label = format_time(duration);
        Some(self.snapshot())
    }

    /// Metadata loaded: the real total replaces the placeholder
    pub fn on_metadata(&mut self, duration: Option<f64>) -> Option<ProgressSnapshot> {
        let duration = duration?;
        self.total_label = format_time(duration);
        Some(self.snapshot())
    }

    /// Click on the progress track
    ///
    /// Ignored while a drag is in progress. The display updates before the
    /// seek completes.
    pub fn scrub(&mut self, fraction: f64, duration: Option<f64>) -> Option<ScrubOutcome> {
        if self.state.is_manually_positioning {
            return None;
        }

        let fraction = clamp_fraction(fraction);
        self.state.displayed_fraction = fraction;
        let seek_to = duration.map(|d| fraction * d);
        self.current_label = position_label(seek_to);

        Some(ScrubOutcome {
            snapshot: self.snapshot(),
            seek_to,
        })
    }

    /// Pointer pressed on the handle; live progress is suppressed from now on
    pub fn begin_drag(&mut self) {
        self.state.is_manually_positioning = true;
    }

    /// Pointer moved during a drag; never seeks
    pub fn update_drag(&mut self, fraction: f64, duration: Option<f64>) -> Option<ProgressSnapshot> {
        if !self.state.is_manually_positioning {
            return None;
        }

        self.state.displayed_fraction = clamp_fraction(fraction);
        let position = duration.map(|d| self.state.displayed_fraction * d);
        self.current_label = position_label(position);
        Some(self.snapshot())
    }

    /// Pointer released
    ///
    /// Returns the single seek target, or `None` when no drag was in
    /// progress or the duration is unknown.
    pub fn end_drag(&mut self, duration: Option<f64>) -> Option<f64> {
        if !self.state.is_manually_positioning {
            return None;
        }
        self.state.is_manually_positioning = false;
        duration.map(|d| self.state.displayed_fraction * d)
    }
}

/// Label for a manually chosen position; "00:00" while the duration is unknown
fn position_label(seconds: Option<f64>) -> String {
    seconds.map_or_else(|| ZERO_LABEL.to_string(), format_time)
}
