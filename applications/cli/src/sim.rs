//! Simulated media element
//!
//! Behaves like a browser audio element on a virtual clock: notifications
//! are queued rather than delivered, and loading a new source discards
//! anything still queued for the previous one.

use cadence_playback::{
    LoadStamp, MediaError, MediaErrorKind, MediaEvent, MediaEventKind, MediaSource, Track,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;
use tracing::debug;

pub struct SimulatedSource {
    durations: HashMap<String, f64>,
    failing: HashSet<String>,

    current: Option<String>,
    stamp: LoadStamp,
    duration: Option<f64>,
    position: f64,
    playing: bool,
    volume: f32,

    queue: VecDeque<MediaEvent>,
}

impl SimulatedSource {
    /// Source that knows the lengths of `tracks` from their duration labels
    ///
    /// Play requests for any source listed in `failing` are rejected.
    pub fn new(tracks: &[Track], failing: &[String]) -> Self {
        let durations = tracks
            .iter()
            .filter_map(|t| parse_label(&t.duration_label).map(|d| (t.source.clone(), d)))
            .collect();

        Self {
            durations,
            failing: failing.iter().cloned().collect(),
            current: None,
            stamp: LoadStamp::default(),
            duration: None,
            position: 0.0,
            playing: false,
            volume: 1.0,
            queue: VecDeque::new(),
        }
    }

    /// Take the oldest queued notification
    ///
    /// Metadata becomes visible through [`MediaSource::duration`] when its
    /// notification is taken, as with a real element.
    pub fn next_event(&mut self) -> Option<MediaEvent> {
        let event = self.queue.pop_front()?;
        if event.kind == MediaEventKind::MetadataLoaded {
            self.duration = self
                .current
                .as_ref()
                .and_then(|source| self.durations.get(source))
                .copied();
        }
        Some(event)
    }

    pub fn has_events(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Move the playhead forward while playing
    pub fn advance(&mut self, by: Duration) {
        if !self.playing {
            return;
        }
        let Some(duration) = self.duration else {
            return;
        };

        self.position = (self.position + by.as_secs_f64()).min(duration);
        self.push(MediaEventKind::Progress);

        if self.position >= duration {
            debug!(source = ?self.current, "Simulated playback reached the end");
            self.playing = false;
            self.push(MediaEventKind::PauseStarted);
            self.push(MediaEventKind::Ended);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn push(&mut self, kind: MediaEventKind) {
        self.queue.push_back(MediaEvent::new(self.stamp, kind));
    }
}

impl MediaSource for SimulatedSource {
    fn load(&mut self, source: &str, stamp: LoadStamp) -> Result<(), MediaError> {
        self.queue.clear();
        self.current = Some(source.to_string());
        self.stamp = stamp;
        self.duration = None;
        self.position = 0.0;
        self.playing = false;

        if self.durations.contains_key(source) {
            self.push(MediaEventKind::MetadataLoaded);
        } else {
            self.push(MediaEventKind::Error(MediaError::new(
                MediaErrorKind::InvalidSource,
                false,
            )));
        }
        Ok(())
    }

    fn play(&mut self, request: u64) -> Result<(), MediaError> {
        let rejected = self
            .current
            .as_ref()
            .is_some_and(|source| self.failing.contains(source));

        if rejected {
            self.push(MediaEventKind::PlayRejected {
                request,
                error: MediaError::new(MediaErrorKind::Unknown, true),
            });
        } else if !self.playing {
            self.playing = true;
            self.push(MediaEventKind::PlayStarted);
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        if self.playing {
            self.playing = false;
            self.push(MediaEventKind::PauseStarted);
        }
        Ok(())
    }

    fn seek(&mut self, seconds: f64) -> Result<(), MediaError> {
        let end = self.duration.unwrap_or(0.0);
        self.position = seconds.clamp(0.0, end);
        Ok(())
    }

    fn set_volume(&mut self, fraction: f32) -> Result<(), MediaError> {
        self.volume = fraction;
        Ok(())
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn current_time(&self) -> f64 {
        self.position
    }
}

/// Parse an `MM:SS` label into seconds
pub fn parse_label(label: &str) -> Option<f64> {
    let (minutes, seconds) = label.trim().split_once(':')?;
    let minutes: u32 = minutes.parse().ok()?;
    let seconds: u32 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    Some(f64::from(minutes * 60 + seconds))
}
