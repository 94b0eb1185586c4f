//! Integration tests for the playback controller
//!
//! These tests drive the controller the way a host would: transport calls
//! for user gestures, media notifications fed back in order, timers fired
//! from a virtual clock.

use cadence_playback::{
    Catalog, LoadStamp, ManualScheduler, MediaError, MediaErrorKind, MediaEvent,
    MediaEventKind, MediaSource, PlaybackConfig, PlaybackController, PlaybackError, PlayerEvent,
    RepeatMode, Track, VolumeTier,
};
use std::collections::VecDeque;
use std::time::Duration;

// ===== Test Helpers =====

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f32),
}

/// Mock media source recording every call
#[derive(Default)]
struct MockMediaSource {
    calls: Vec<Call>,
    duration: Option<f64>,
    current_time: f64,
    play_rejections: VecDeque<MediaError>,
    load_error: Option<MediaError>,
    last_request: u64,
}

impl MockMediaSource {
    fn plays(&self) -> usize {
        self.calls.iter().filter(|c| **c == Call::Play).count()
    }

    fn seeks(&self) -> Vec<f64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Seek(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    fn last_call(&self) -> Option<&Call> {
        self.calls.last()
    }
}

impl MediaSource for MockMediaSource {
    fn load(&mut self, source: &str, _stamp: LoadStamp) -> Result<(), MediaError> {
        self.calls.push(Call::Load(source.to_string()));
        self.current_time = 0.0;
        self.duration = None;
        match self.load_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn play(&mut self, request: u64) -> Result<(), MediaError> {
        self.calls.push(Call::Play);
        self.last_request = request;
        match self.play_rejections.pop_front() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        self.calls.push(Call::Pause);
        Ok(())
    }

    fn seek(&mut self, seconds: f64) -> Result<(), MediaError> {
        self.calls.push(Call::Seek(seconds));
        self.current_time = seconds;
        Ok(())
    }

    fn set_volume(&mut self, fraction: f32) -> Result<(), MediaError> {
        self.calls.push(Call::SetVolume(fraction));
        Ok(())
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }
}

type TestController = PlaybackController<MockMediaSource, ManualScheduler>;

fn create_test_catalog() -> Catalog {
    let tracks = [
        (1, "How Are You", "Tsong", "02:58"),
        (2, "70%", "GALI", "03:34"),
        (3, "Nice To Meet You", "C-BLOCK", "03:52"),
    ]
    .into_iter()
    .map(|(id, title, artist, label)| Track {
        id,
        title: title.to_string(),
        artist: artist.to_string(),
        duration_label: label.to_string(),
        artwork: format!("https://picsum.photos/400/400?random={}", id),
        source: format!("./track{}.mp3", id),
    })
    .collect();
    Catalog::new(tracks).unwrap()
}

fn create_controller() -> TestController {
    let mut controller = PlaybackController::new(
        create_test_catalog(),
        MockMediaSource::default(),
        ManualScheduler::new(),
        PlaybackConfig::default(),
    );
    controller.drain_events();
    controller
}

/// Deliver a notification stamped with the current load
fn notify(controller: &mut TestController, kind: MediaEventKind) {
    let stamp = controller.load_stamp();
    controller.handle_media_event(MediaEvent::new(stamp, kind));
}

/// Toggle play and confirm it from the media side
fn start_playing(controller: &mut TestController) {
    controller.toggle_play_pause();
    notify(controller, MediaEventKind::PlayStarted);
    assert!(controller.is_playing());
    controller.drain_events();
}

/// Fire every timer due after `by`
fn advance(controller: &mut TestController, by: Duration) {
    let due = controller.scheduler_mut().advance(by);
    for timer in due {
        controller.on_timer(timer);
    }
}

fn rejection() -> MediaError {
    MediaError::new(MediaErrorKind::Unknown, true)
}

/// Asynchronous rejection of the most recent play request
fn reject_latest(controller: &mut TestController) {
    let request = controller.media().last_request;
    notify(
        controller,
        MediaEventKind::PlayRejected {
            request,
            error: rejection(),
        },
    );
}

// ===== Track Selection =====

#[test]
fn test_select_track_loads_each_index() {
    let mut controller = create_controller();
    let catalog = create_test_catalog();

    for index in 0..catalog.len() {
        controller.select_track(index).unwrap();

        assert_eq!(controller.current_index(), index);
        assert_eq!(controller.current_track(), catalog.get(index).unwrap());
        assert_eq!(
            controller.media().last_call(),
            Some(&Call::Load(catalog.get(index).unwrap().source.clone()))
        );
    }
}

#[test]
fn test_select_track_emits_track_and_progress_reset() {
    let mut controller = create_controller();
    controller.select_track(1).unwrap();

    let events = controller.drain_events();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        PlayerEvent::TrackChanged { index: 1, track } if track.title == "70%"
    ));
    assert_eq!(
        events[1],
        PlayerEvent::ProgressChanged {
            fraction: 0.0,
            current_label: "00:00".to_string(),
            total_label: "03:34".to_string(),
        }
    );
}

#[test]
fn test_select_track_out_of_range_has_no_side_effects() {
    let mut controller = create_controller();
    let calls_before = controller.media().calls.len();
    let state_before = controller.state();

    let result = controller.select_track(3);

    assert!(matches!(
        result,
        Err(PlaybackError::InvalidIndex { index: 3, len: 3 })
    ));
    assert_eq!(controller.media().calls.len(), calls_before);
    assert_eq!(controller.state(), state_before);
    assert!(!controller.has_pending_events());
}

#[test]
fn test_select_track_while_playing_resumes() {
    let mut controller = create_controller();
    start_playing(&mut controller);
    let plays_before = controller.media().plays();

    controller.select_track(2).unwrap();

    assert_eq!(controller.media().plays(), plays_before + 1);
    assert_eq!(controller.media().last_call(), Some(&Call::Play));
}

#[test]
fn test_select_track_while_paused_stays_paused() {
    let mut controller = create_controller();
    controller.select_track(2).unwrap();

    assert_eq!(controller.media().plays(), 0);
    assert!(!controller.is_playing());
}

#[test]
fn test_rapid_selection_supersedes_each_load() {
    let mut controller = create_controller();
    controller.select_track(1).unwrap();
    controller.select_track(2).unwrap();
    controller.select_track(0).unwrap();

    let loads: Vec<_> = controller
        .media()
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Load(_)))
        .collect();
    // Initial load plus three selections
    assert_eq!(loads.len(), 4);
    assert_eq!(controller.current_index(), 0);
}

#[test]
fn test_activate_current_track_starts_playback() {
    let mut controller = create_controller();

    controller.activate_track(0).unwrap();
    assert_eq!(controller.media().plays(), 1);

    // Already playing: activating the same row again does nothing
    notify(&mut controller, MediaEventKind::PlayStarted);
    controller.activate_track(0).unwrap();
    assert_eq!(controller.media().plays(), 1);

    // Another row switches and keeps playing
    controller.activate_track(1).unwrap();
    assert_eq!(controller.current_index(), 1);
    assert_eq!(controller.media().plays(), 2);

    assert!(controller.activate_track(9).is_err());
}

// ===== Navigation =====

#[test]
fn test_next_wraps_to_first() {
    let mut controller = create_controller();
    controller.select_track(2).unwrap();
    controller.next();
    assert_eq!(controller.current_index(), 0);
}

#[test]
fn test_previous_wraps_to_last() {
    let mut controller = create_controller();
    controller.previous();
    assert_eq!(controller.current_index(), 2);
    controller.previous();
    assert_eq!(controller.current_index(), 1);
}

#[test]
fn test_next_resumes_only_when_playing() {
    let mut controller = create_controller();
    controller.next();
    assert_eq!(controller.media().plays(), 0);

    start_playing(&mut controller);
    let plays_before = controller.media().plays();
    controller.next();
    assert_eq!(controller.media().plays(), plays_before + 1);
}

// ===== Play / Pause =====

#[test]
fn test_toggle_play_pause_follows_media_notifications() {
    let mut controller = create_controller();

    controller.toggle_play_pause();
    assert_eq!(controller.media().last_call(), Some(&Call::Play));
    // Not confirmed yet
    assert!(!controller.is_playing());

    notify(&mut controller, MediaEventKind::PlayStarted);
    assert!(controller.is_playing());
    assert_eq!(
        controller.drain_events(),
        vec![PlayerEvent::PlayStateChanged { is_playing: true }]
    );

    controller.toggle_play_pause();
    assert_eq!(controller.media().last_call(), Some(&Call::Pause));
    notify(&mut controller, MediaEventKind::PauseStarted);
    assert!(!controller.is_playing());
    assert_eq!(
        controller.drain_events(),
        vec![PlayerEvent::PlayStateChanged { is_playing: false }]
    );
}

#[test]
fn test_play_failure_retries_once_after_delay() {
    let mut controller = create_controller();
    controller.media_mut().play_rejections.push_back(rejection());

    controller.toggle_play_pause();
    assert_eq!(controller.media().plays(), 1);
    assert_eq!(controller.scheduler().pending_len(), 1);

    advance(&mut controller, Duration::from_millis(99));
    assert_eq!(controller.media().plays(), 1);

    advance(&mut controller, Duration::from_millis(1));
    assert_eq!(controller.media().plays(), 2);

    notify(&mut controller, MediaEventKind::PlayStarted);
    assert!(controller.is_playing());
    assert!(!controller
        .drain_events()
        .iter()
        .any(|e| matches!(e, PlayerEvent::Error { .. })));
}

#[test]
fn test_async_rejection_twice_surfaces_error_and_pauses() {
    let mut controller = create_controller();

    controller.toggle_play_pause();
    reject_latest(&mut controller);
    advance(&mut controller, Duration::from_millis(100));
    assert_eq!(controller.media().plays(), 2);

    reject_latest(&mut controller);

    // No third attempt
    advance(&mut controller, Duration::from_secs(1));
    assert_eq!(controller.media().plays(), 2);

    assert!(!controller.is_playing());
    assert!(!controller.is_play_pending());
    assert_eq!(controller.media().last_call(), Some(&Call::Pause));

    let events = controller.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        PlayerEvent::Error {
            kind: MediaErrorKind::Unknown,
            ..
        }
    )));
}

#[test]
fn test_late_rejection_of_cancelled_request_keeps_retry() {
    let mut controller = create_controller();

    controller.toggle_play_pause();
    let cancelled = controller.media().last_request;
    controller.toggle_play_pause();
    controller.toggle_play_pause();
    assert_ne!(controller.media().last_request, cancelled);

    // The first request's promise settles after the second request started
    notify(
        &mut controller,
        MediaEventKind::PlayRejected {
            request: cancelled,
            error: rejection(),
        },
    );
    assert!(controller.is_play_pending());
    assert_eq!(controller.scheduler().pending_len(), 0);
    assert!(!controller.has_pending_events());

    // The current request still gets its one retry
    reject_latest(&mut controller);
    assert!(controller.is_play_pending());
    assert_eq!(controller.scheduler().pending_len(), 1);

    advance(&mut controller, Duration::from_millis(100));
    assert_eq!(controller.media().plays(), 3);

    notify(&mut controller, MediaEventKind::PlayStarted);
    assert!(controller.is_playing());
    assert!(!controller
        .drain_events()
        .iter()
        .any(|e| matches!(e, PlayerEvent::Error { .. })));
}

#[test]
fn test_pause_cancels_pending_retry() {
    let mut controller = create_controller();
    controller.media_mut().play_rejections.push_back(rejection());

    controller.toggle_play_pause();
    controller.toggle_play_pause();
    advance(&mut controller, Duration::from_millis(100));

    assert_eq!(controller.media().plays(), 1);
}

#[test]
fn test_retry_for_superseded_track_is_dropped() {
    let mut controller = create_controller();
    controller.media_mut().play_rejections.push_back(rejection());

    controller.toggle_play_pause();
    // Still pending, so the new track resumes with a fresh request
    controller.next();
    assert_eq!(controller.media().plays(), 2);

    advance(&mut controller, Duration::from_millis(100));
    assert_eq!(controller.media().plays(), 2);
}

#[test]
fn test_custom_retry_policy() {
    let mut config = PlaybackConfig::default();
    config.retry.max_retries = 0;
    let mut controller = PlaybackController::new(
        create_test_catalog(),
        MockMediaSource::default(),
        ManualScheduler::new(),
        config,
    );
    controller.media_mut().play_rejections.push_back(rejection());

    controller.toggle_play_pause();

    assert_eq!(controller.scheduler().pending_len(), 0);
    assert!(controller
        .drain_events()
        .iter()
        .any(|e| matches!(e, PlayerEvent::Error { .. })));
}

// ===== Repeat & Volume =====

#[test]
fn test_cycle_repeat_mode() {
    let mut controller = create_controller();
    assert_eq!(controller.repeat_mode(), RepeatMode::None);

    controller.cycle_repeat_mode();
    assert_eq!(controller.repeat_mode(), RepeatMode::Single);
    controller.cycle_repeat_mode();
    assert_eq!(controller.repeat_mode(), RepeatMode::All);
    controller.cycle_repeat_mode();
    assert_eq!(controller.repeat_mode(), RepeatMode::None);

    let modes: Vec<_> = controller
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            PlayerEvent::RepeatModeChanged { mode } => Some(mode),
            _ => None,
        })
        .collect();
    assert_eq!(
        modes,
        vec![RepeatMode::Single, RepeatMode::All, RepeatMode::None]
    );
}

#[test]
fn test_set_volume_forwards_and_reports_tier() {
    let mut controller = create_controller();

    for (fraction, tier) in [
        (0.0, VolumeTier::Muted),
        (0.7, VolumeTier::Low),
        (0.71, VolumeTier::High),
    ] {
        controller.set_volume(fraction);
        assert_eq!(controller.media().last_call(), Some(&Call::SetVolume(fraction)));
        assert_eq!(
            controller.drain_events(),
            vec![PlayerEvent::VolumeChanged { fraction, tier }]
        );
    }
}

// ===== End of Track =====

#[test]
fn test_ended_without_repeat_advances_and_keeps_playing() {
    let mut controller = create_controller();
    start_playing(&mut controller);
    let plays_before = controller.media().plays();

    // Media elements report a pause right before `ended`
    notify(&mut controller, MediaEventKind::PauseStarted);
    notify(&mut controller, MediaEventKind::Ended);

    assert_eq!(controller.current_index(), 1);
    assert_eq!(controller.media().plays(), plays_before + 1);
}

#[test]
fn test_ended_without_repeat_on_last_track_stops_and_rewinds() {
    let mut controller = create_controller();
    controller.select_track(2).unwrap();
    start_playing(&mut controller);
    controller.media_mut().duration = Some(232.0);
    controller.media_mut().current_time = 232.0;
    notify(&mut controller, MediaEventKind::Progress);
    controller.drain_events();

    notify(&mut controller, MediaEventKind::Ended);

    assert_eq!(controller.current_index(), 2);
    assert!(!controller.is_playing());
    assert_eq!(controller.media().seeks(), vec![0.0]);
    assert!(controller.media().calls.contains(&Call::Pause));
    assert_eq!(controller.seek_state().displayed_fraction, 0.0);
    assert_eq!(controller.current_label(), "00:00");

    let events = controller.drain_events();
    assert!(events.contains(&PlayerEvent::PlayStateChanged { is_playing: false }));
}

#[test]
fn test_ended_with_repeat_all_on_last_track_wraps() {
    let mut controller = create_controller();
    controller.set_repeat_mode(RepeatMode::All);
    controller.select_track(2).unwrap();
    start_playing(&mut controller);

    notify(&mut controller, MediaEventKind::Ended);

    assert_eq!(controller.current_index(), 0);
    assert_eq!(controller.media().last_call(), Some(&Call::Play));
}

#[test]
fn test_ended_with_repeat_single_replays_same_track() {
    let mut controller = create_controller();
    controller.set_repeat_mode(RepeatMode::Single);
    controller.select_track(1).unwrap();
    start_playing(&mut controller);
    let plays_before = controller.media().plays();

    notify(&mut controller, MediaEventKind::Ended);

    assert_eq!(controller.current_index(), 1);
    assert_eq!(controller.media().seeks(), vec![0.0]);
    assert_eq!(controller.media().plays(), plays_before + 1);
}

#[test]
fn test_ended_with_repeat_single_failure_keeps_track() {
    let mut controller = create_controller();
    controller.set_repeat_mode(RepeatMode::Single);
    start_playing(&mut controller);
    controller.media_mut().play_rejections.push_back(rejection());
    controller.media_mut().play_rejections.push_back(rejection());

    notify(&mut controller, MediaEventKind::Ended);
    advance(&mut controller, Duration::from_millis(100));

    assert_eq!(controller.current_index(), 0);
    assert!(!controller.is_playing());
    assert!(controller
        .drain_events()
        .iter()
        .any(|e| matches!(e, PlayerEvent::Error { .. })));
}

// ===== Progress & Seek =====

#[test]
fn test_live_progress_updates_display() {
    let mut controller = create_controller();
    controller.media_mut().duration = Some(178.0);
    controller.media_mut().current_time = 44.5;

    notify(&mut controller, MediaEventKind::Progress);

    assert_eq!(controller.seek_state().displayed_fraction, 0.25);
    assert_eq!(
        controller.drain_events(),
        vec![PlayerEvent::ProgressChanged {
            fraction: 0.25,
            current_label: "00:44".to_string(),
            total_label: "02:58".to_string(),
        }]
    );
}

#[test]
fn test_live_progress_skipped_while_duration_unknown() {
    let mut controller = create_controller();
    controller.media_mut().current_time = 10.0;
    controller.media_mut().duration = Some(f64::NAN);

    notify(&mut controller, MediaEventKind::Progress);

    assert_eq!(controller.seek_state().displayed_fraction, 0.0);
    assert!(!controller.has_pending_events());
}

#[test]
fn test_drag_suppresses_progress_and_seeks_once() {
    let mut controller = create_controller();
    controller.media_mut().duration = Some(200.0);

    controller.begin_drag();
    controller.update_drag(0.3);
    controller.update_drag(0.75);

    for t in [10.0, 11.0, 12.0] {
        controller.media_mut().current_time = t;
        notify(&mut controller, MediaEventKind::Progress);
        assert_eq!(controller.seek_state().displayed_fraction, 0.75);
    }
    assert!(controller.media().seeks().is_empty());

    controller.end_drag();
    assert_eq!(controller.media().seeks(), vec![150.0]);
    assert!(!controller.seek_state().is_manually_positioning);

    // A stray release does not seek again
    controller.end_drag();
    assert_eq!(controller.media().seeks().len(), 1);
}

#[test]
fn test_drag_end_without_duration_skips_seek() {
    let mut controller = create_controller();

    controller.begin_drag();
    controller.update_drag(0.5);
    controller.end_drag();

    assert!(controller.media().seeks().is_empty());
    assert!(!controller.seek_state().is_manually_positioning);
}

#[test]
fn test_scrub_updates_display_then_seeks() {
    let mut controller = create_controller();
    controller.media_mut().duration = Some(180.0);

    controller.scrub(0.5);

    assert_eq!(controller.media().seeks(), vec![90.0]);
    assert_eq!(
        controller.drain_events(),
        vec![PlayerEvent::ProgressChanged {
            fraction: 0.5,
            current_label: "01:30".to_string(),
            total_label: "02:58".to_string(),
        }]
    );
}

#[test]
fn test_scrub_ignored_while_dragging() {
    let mut controller = create_controller();
    controller.media_mut().duration = Some(180.0);

    controller.begin_drag();
    controller.scrub(0.9);

    assert!(controller.media().seeks().is_empty());
    assert_eq!(controller.seek_state().displayed_fraction, 0.0);
}

// ===== Stale Notifications =====

#[test]
fn test_stale_metadata_does_not_change_total_label() {
    let mut controller = create_controller();
    let stale = controller.load_stamp();

    controller.select_track(1).unwrap();
    controller.drain_events();

    // Metadata for track 0 arrives late
    controller.media_mut().duration = Some(178.0);
    controller.handle_media_event(MediaEvent::new(stale, MediaEventKind::MetadataLoaded));

    assert_eq!(controller.total_label(), "03:34");
    assert!(!controller.has_pending_events());

    // Metadata for the current load is accepted
    controller.media_mut().duration = Some(215.0);
    notify(&mut controller, MediaEventKind::MetadataLoaded);
    assert_eq!(controller.total_label(), "03:35");
}

#[test]
fn test_stale_ended_is_ignored() {
    let mut controller = create_controller();
    let stale = controller.load_stamp();
    controller.select_track(1).unwrap();

    controller.handle_media_event(MediaEvent::new(stale, MediaEventKind::Ended));

    assert_eq!(controller.current_index(), 1);
}

#[test]
fn test_reselecting_same_index_supersedes_previous_load() {
    let mut controller = create_controller();
    let stale = controller.load_stamp();
    controller.select_track(0).unwrap();
    controller.drain_events();

    controller.media_mut().duration = Some(178.0);
    controller.handle_media_event(MediaEvent::new(stale, MediaEventKind::MetadataLoaded));

    assert!(!controller.has_pending_events());
}

// ===== Media Errors =====

#[test]
fn test_media_error_notification_pauses_and_surfaces() {
    let mut controller = create_controller();
    start_playing(&mut controller);

    notify(
        &mut controller,
        MediaEventKind::Error(MediaError::from_code(2)),
    );

    assert!(!controller.is_playing());
    assert_eq!(controller.media().last_call(), Some(&Call::Pause));

    let events = controller.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        PlayerEvent::Error {
            kind: MediaErrorKind::Network,
            ..
        }
    )));
    assert!(events.contains(&PlayerEvent::PlayStateChanged { is_playing: false }));
}

#[test]
fn test_load_failure_is_surfaced_and_does_not_resume() {
    let mut controller = create_controller();
    start_playing(&mut controller);
    controller.media_mut().load_error = Some(MediaError::from_code(4));
    let plays_before = controller.media().plays();

    controller.next();

    assert_eq!(controller.current_index(), 1);
    assert_eq!(controller.media().plays(), plays_before);
    assert!(!controller.is_playing());

    // The track change comes first so the error belongs to the new track
    let events = controller.drain_events();
    assert_eq!(events.len(), 4);
    assert!(matches!(events[0], PlayerEvent::TrackChanged { index: 1, .. }));
    assert!(matches!(events[1], PlayerEvent::ProgressChanged { .. }));
    assert!(matches!(
        events[2],
        PlayerEvent::Error {
            kind: MediaErrorKind::InvalidSource,
            ..
        }
    ));
    assert_eq!(events[3], PlayerEvent::PlayStateChanged { is_playing: false });
}
