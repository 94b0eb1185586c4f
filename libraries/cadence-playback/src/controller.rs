//! Playback controller - core orchestration
//!
//! Owns the media source, the playback state and the seek coordinator.
//! Every transport call and every media notification goes through here, one
//! at a time, so the states never see concurrent mutation.

use crate::{
    catalog::Catalog,
    error::{MediaError, Result},
    events::PlayerEvent,
    scheduler::{Scheduler, Timer},
    seek::{SeekCoordinator, SeekState},
    source::{known_duration, LoadStamp, MediaEvent, MediaEventKind, MediaSource},
    types::{PlaybackConfig, PlaybackState, RepeatMode, RetryPolicy, Track},
    volume::{Volume, VolumeTier},
};
use tracing::{debug, error, info, warn};

/// Central playback control
///
/// Drives a single [`MediaSource`] through a fixed [`Catalog`]:
/// - Track selection with load stamping (stale notifications are dropped)
/// - Play/pause with one delayed retry on rejected play requests
/// - Next/previous with wraparound
/// - Repeat modes (None, Single, All) and end-of-track policy
/// - Volume with display tiers
/// - Progress, scrub and drag via [`SeekCoordinator`]
pub struct PlaybackController<M: MediaSource, S: Scheduler> {
    catalog: Catalog,
    media: M,
    scheduler: S,

    // State
    state: PlaybackState,
    seek: SeekCoordinator,
    volume: Volume,

    // Load/play bookkeeping
    stamp: LoadStamp,
    play_pending: bool,
    play_request: u64,
    failed_attempts: u32,
    retry: RetryPolicy,

    // Event queue for the presentation layer
    pending_events: Vec<PlayerEvent>,
}

impl<M: MediaSource, S: Scheduler> PlaybackController<M, S> {
    /// Create a controller with the first track loaded and paused
    pub fn new(catalog: Catalog, media: M, scheduler: S, config: PlaybackConfig) -> Self {
        let seek = SeekCoordinator::new(&catalog.tracks()[0].duration_label);

        let mut controller = Self {
            catalog,
            media,
            scheduler,
            state: PlaybackState::new(config.initial_repeat),
            seek,
            volume: Volume::new(config.initial_volume),
            stamp: LoadStamp::default(),
            play_pending: false,
            play_request: 0,
            failed_attempts: 0,
            retry: config.retry,
            pending_events: Vec::new(),
        };

        controller.load_index(0, false);
        controller.apply_volume();
        controller
    }

    // ===== Track Selection =====

    /// Load the track at `index`
    ///
    /// Playback resumes on the new track if it was playing (or about to).
    /// Out-of-range indices are rejected without touching any state.
    pub fn select_track(&mut self, index: usize) -> Result<()> {
        self.catalog.check_index(index)?;
        let resume = self.wants_playback();
        self.load_index(index, resume);
        Ok(())
    }

    /// Playlist row activation
    ///
    /// Another row switches tracks like [`select_track`](Self::select_track);
    /// the current row starts playback if paused.
    pub fn activate_track(&mut self, index: usize) -> Result<()> {
        self.catalog.check_index(index)?;
        if index != self.state.current_index {
            self.select_track(index)
        } else {
            if !self.wants_playback() {
                self.request_play();
            }
            Ok(())
        }
    }

    /// Skip to the next track, wrapping to the first
    pub fn next(&mut self) {
        let index = self.catalog.next_index(self.state.current_index);
        let resume = self.wants_playback();
        self.load_index(index, resume);
    }

    /// Go back one track, wrapping to the last
    pub fn previous(&mut self) {
        let index = self.catalog.previous_index(self.state.current_index);
        let resume = self.wants_playback();
        self.load_index(index, resume);
    }

    // ===== Transport =====

    /// Pause if playing, otherwise request playback
    pub fn toggle_play_pause(&mut self) {
        if self.wants_playback() {
            self.pause();
        } else {
            self.request_play();
        }
    }

    /// Request playback (no-op if already playing or pending)
    pub fn play(&mut self) {
        if !self.wants_playback() {
            self.request_play();
        }
    }

    /// Pause playback and cancel any pending play retry
    pub fn pause(&mut self) {
        debug!(index = self.state.current_index, "Pausing");
        self.play_pending = false;
        self.failed_attempts = 0;
        if let Err(e) = self.media.pause() {
            self.fail(e);
        }
    }

    // ===== Repeat =====

    /// Advance `None -> Single -> All -> None`
    pub fn cycle_repeat_mode(&mut self) {
        self.state.repeat_mode = self.state.repeat_mode.next();
        debug!(mode = ?self.state.repeat_mode, "Repeat mode changed");
        self.emit(PlayerEvent::RepeatModeChanged {
            mode: self.state.repeat_mode,
        });
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        if self.state.repeat_mode != mode {
            self.state.repeat_mode = mode;
            self.emit(PlayerEvent::RepeatModeChanged { mode });
        }
    }

    // ===== Volume =====

    /// Set volume (0.0-1.0, clamped)
    pub fn set_volume(&mut self, fraction: f32) {
        self.volume.set(fraction);
        self.apply_volume();
    }

    // ===== Seek =====

    /// Click on the progress track at `fraction` of its width
    pub fn scrub(&mut self, fraction: f64) {
        let duration = self.duration();
        if let Some(outcome) = self.seek.scrub(fraction, duration) {
            self.emit(outcome.snapshot.into());
            if let Some(target) = outcome.seek_to {
                self.seek_media(target);
            }
        }
    }

    /// Progress handle grabbed
    pub fn begin_drag(&mut self) {
        self.seek.begin_drag();
    }

    /// Progress handle moved to `fraction` (no seek until release)
    pub fn update_drag(&mut self, fraction: f64) {
        let duration = self.duration();
        if let Some(snapshot) = self.seek.update_drag(fraction, duration) {
            self.emit(snapshot.into());
        }
    }

    /// Progress handle released; seeks once if the duration is known
    pub fn end_drag(&mut self) {
        let duration = self.duration();
        if let Some(target) = self.seek.end_drag(duration) {
            self.seek_media(target);
        }
    }

    // ===== Media Notifications =====

    /// Feed a notification from the media source
    ///
    /// Notifications stamped with a superseded load are dropped.
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if event.stamp != self.stamp {
            debug!(
                stale = ?event.stamp,
                current = ?self.stamp,
                kind = ?event.kind,
                "Dropping stale media notification"
            );
            return;
        }

        match event.kind {
            MediaEventKind::MetadataLoaded => {
                let duration = self.duration();
                debug!(?duration, "Metadata loaded");
                if let Some(snapshot) = self.seek.on_metadata(duration) {
                    self.emit(snapshot.into());
                }
            }
            MediaEventKind::PlayStarted => {
                self.play_pending = false;
                self.failed_attempts = 0;
                self.set_playing(true);
            }
            MediaEventKind::PauseStarted => self.set_playing(false),
            MediaEventKind::Ended => self.on_track_ended(),
            MediaEventKind::Progress => {
                let current_time = self.media.current_time();
                let duration = self.duration();
                if let Some(snapshot) = self.seek.on_progress(current_time, duration) {
                    self.emit(snapshot.into());
                }
            }
            MediaEventKind::Error(e) => self.fail(e),
            MediaEventKind::PlayRejected { request, error } => {
                if request == self.play_request {
                    self.on_play_failed(error);
                } else {
                    debug!(
                        request,
                        current = self.play_request,
                        "Dropping rejection for superseded play request"
                    );
                }
            }
        }
    }

    /// Run a timer previously handed to the scheduler
    pub fn on_timer(&mut self, timer: Timer) {
        match timer {
            Timer::RetryPlay { stamp, request } => {
                if stamp != self.stamp || request != self.play_request || !self.play_pending {
                    debug!(?stamp, request, "Dropping superseded play retry");
                    return;
                }
                info!(index = self.state.current_index, "Retrying play");
                self.attempt_play();
            }
        }
    }

    /// End-of-track policy
    ///
    /// Automatic advances keep playing regardless of the pause notification
    /// media elements send right before `ended`.
    pub fn on_track_ended(&mut self) {
        let index = self.state.current_index;
        info!(index, mode = ?self.state.repeat_mode, "Track ended");

        match self.state.repeat_mode {
            RepeatMode::None if !self.catalog.is_last(index) => {
                self.load_index(self.catalog.next_index(index), true);
            }
            RepeatMode::None => self.stop_at_start(),
            RepeatMode::Single => {
                if let Err(e) = self.media.seek(0.0) {
                    self.fail(e);
                    return;
                }
                let snapshot = self.seek.rewind();
                self.emit(snapshot.into());
                self.request_play();
            }
            RepeatMode::All => {
                self.load_index(self.catalog.next_index(index), true);
            }
        }
    }

    // ===== Getters =====

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn current_track(&self) -> &Track {
        &self.catalog.tracks()[self.state.current_index]
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    /// A play request has been issued but not confirmed yet
    pub fn is_play_pending(&self) -> bool {
        self.play_pending
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.state.repeat_mode
    }

    pub fn volume(&self) -> f32 {
        self.volume.fraction()
    }

    pub fn volume_tier(&self) -> VolumeTier {
        self.volume.tier()
    }

    pub fn seek_state(&self) -> SeekState {
        self.seek.state()
    }

    pub fn current_label(&self) -> &str {
        self.seek.current_label()
    }

    pub fn total_label(&self) -> &str {
        self.seek.total_label()
    }

    /// Stamp of the load notifications must carry to be accepted
    pub fn load_stamp(&self) -> LoadStamp {
        self.stamp
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    /// Mutable access for hosts that pump adapter-side queues
    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns every event emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    /// Playing, or a play request is still in flight
    fn wants_playback(&self) -> bool {
        self.state.is_playing || self.play_pending
    }

    fn duration(&self) -> Option<f64> {
        self.media.duration().and_then(known_duration)
    }

    fn load_index(&mut self, index: usize, resume: bool) {
        let track = self.catalog.tracks()[index].clone();

        self.play_pending = false;
        self.failed_attempts = 0;
        self.stamp = LoadStamp {
            generation: self.stamp.generation + 1,
            index,
        };
        self.state.current_index = index;
        info!(index, title = %track.title, source = %track.source, "Loading track");

        let loaded = self.media.load(&track.source, self.stamp);

        let snapshot = self.seek.reset(&track.duration_label);
        self.emit(PlayerEvent::TrackChanged { index, track });
        self.emit(snapshot.into());

        match loaded {
            Ok(()) if resume => self.request_play(),
            Ok(()) => {}
            Err(e) => self.fail(e),
        }
    }

    fn request_play(&mut self) {
        self.play_request += 1;
        self.play_pending = true;
        self.failed_attempts = 0;
        self.attempt_play();
    }

    fn attempt_play(&mut self) {
        debug!(
            index = self.state.current_index,
            attempt = self.failed_attempts + 1,
            "Requesting play"
        );
        if let Err(e) = self.media.play(self.play_request) {
            self.on_play_failed(e);
        }
    }

    fn on_play_failed(&mut self, e: MediaError) {
        if !self.play_pending {
            debug!(error = %e, "Ignoring play failure for cancelled request");
            return;
        }

        if self.failed_attempts < self.retry.max_retries {
            self.failed_attempts += 1;
            warn!(
                error = %e,
                retry = self.failed_attempts,
                delay_ms = self.retry.delay_ms,
                "Play rejected, retrying"
            );
            self.scheduler.schedule(
                self.retry.delay(),
                Timer::RetryPlay {
                    stamp: self.stamp,
                    request: self.play_request,
                },
            );
        } else {
            error!(error = %e, attempts = self.failed_attempts + 1, "Play failed, giving up");
            self.fail(e);
        }
    }

    /// Surface a media failure and force the paused state
    fn fail(&mut self, e: MediaError) {
        warn!(error = %e, index = self.state.current_index, "Media failure, pausing");
        self.play_pending = false;
        self.failed_attempts = 0;
        if let Err(pause_err) = self.media.pause() {
            debug!(error = %pause_err, "Pause after failure also failed");
        }
        self.emit(PlayerEvent::error(e.kind));
        self.set_playing(false);
    }

    /// Last track ended without repeat: stop and rewind
    fn stop_at_start(&mut self) {
        self.play_pending = false;
        self.failed_attempts = 0;
        if let Err(e) = self.media.pause() {
            self.fail(e);
            return;
        }
        if let Err(e) = self.media.seek(0.0) {
            self.fail(e);
            return;
        }
        self.set_playing(false);
        let snapshot = self.seek.rewind();
        self.emit(snapshot.into());
    }

    fn seek_media(&mut self, seconds: f64) {
        debug!(seconds, "Seeking");
        if let Err(e) = self.media.seek(seconds) {
            self.fail(e);
        }
    }

    fn apply_volume(&mut self) {
        let fraction = self.volume.fraction();
        if let Err(e) = self.media.set_volume(fraction) {
            self.fail(e);
        }
        self.emit(PlayerEvent::VolumeChanged {
            fraction,
            tier: self.volume.tier(),
        });
    }

    fn set_playing(&mut self, is_playing: bool) {
        if self.state.is_playing != is_playing {
            self.state.is_playing = is_playing;
            self.emit(PlayerEvent::PlayStateChanged { is_playing });
        }
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.pending_events.push(event);
    }
}
