//! Interactive session over the simulated source

use crate::commands::Command;
use crate::config::AppConfig;
use crate::error::Result;
use crate::sim::SimulatedSource;
use cadence_playback::{
    ManualScheduler, PlaybackController, PlayerEvent, RepeatMode, SeekState, VolumeTier,
};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

pub type Controller = PlaybackController<SimulatedSource, ManualScheduler>;

/// Upper bound on clock steps per `tick`; longer ticks use wider steps
const MAX_CLOCK_STEPS: u32 = 10_000;

/// Snapshot printed by the `state` command
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateReport {
    pub index: usize,
    pub title: String,
    pub is_playing: bool,
    pub play_pending: bool,
    pub repeat_mode: RepeatMode,
    pub volume: f32,
    pub volume_tier: VolumeTier,
    pub current_label: String,
    pub total_label: String,
    pub seek: SeekState,
    /// Virtual clock, in seconds
    pub clock: f64,
}

pub struct Session {
    controller: Controller,
    tick: Duration,
}

impl Session {
    pub fn new(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let catalog = config.catalog()?;
        let source = SimulatedSource::new(catalog.tracks(), &config.simulation.failing_sources);
        let controller = PlaybackController::new(
            catalog,
            source,
            ManualScheduler::new(),
            config.playback.clone(),
        );

        let mut session = Self {
            controller,
            tick: Duration::from_millis(config.simulation.tick_ms),
        };
        session.settle();
        Ok(session)
    }

    /// Apply `command` and return the events it produced
    ///
    /// `State` and `Quit` are handled by the caller and produce nothing.
    pub fn execute(&mut self, command: Command) -> Result<Vec<PlayerEvent>> {
        debug!(?command, "Executing command");

        match command {
            Command::Play => self.controller.play(),
            Command::Pause => self.controller.pause(),
            Command::Toggle => self.controller.toggle_play_pause(),
            Command::Next => self.controller.next(),
            Command::Previous => self.controller.previous(),
            Command::Select(index) => self.controller.activate_track(index)?,
            Command::Repeat => self.controller.cycle_repeat_mode(),
            Command::Volume(fraction) => self.controller.set_volume(fraction),
            Command::Scrub(fraction) => self.controller.scrub(fraction),
            Command::DragStart => self.controller.begin_drag(),
            Command::Drag(fraction) => self.controller.update_drag(fraction),
            Command::DragEnd => self.controller.end_drag(),
            Command::Tick(duration) => self.run_clock(duration),
            Command::State | Command::Quit => {}
        }

        self.settle();
        Ok(self.controller.drain_events())
    }

    /// Events queued before any command ran (initial load)
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        self.controller.drain_events()
    }

    pub fn report(&self) -> StateReport {
        let controller = &self.controller;
        StateReport {
            index: controller.current_index(),
            title: controller.current_track().title.clone(),
            is_playing: controller.is_playing(),
            play_pending: controller.is_play_pending(),
            repeat_mode: controller.repeat_mode(),
            volume: controller.volume(),
            volume_tier: controller.volume_tier(),
            current_label: controller.current_label().to_string(),
            total_label: controller.total_label().to_string(),
            seek: controller.seek_state(),
            clock: controller.scheduler().now().as_secs_f64(),
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Advance the virtual clock in `tick`-sized steps
    fn run_clock(&mut self, total: Duration) {
        let step_size = self.tick.max(total / MAX_CLOCK_STEPS);
        let mut remaining = total;
        while !remaining.is_zero() {
            let step = remaining.min(step_size);
            remaining -= step;

            self.controller.media_mut().advance(step);
            self.settle();

            for timer in self.controller.scheduler_mut().advance(step) {
                self.controller.on_timer(timer);
                self.settle();
            }
        }
    }

    /// Deliver queued media notifications until the source is quiet
    fn settle(&mut self) {
        while let Some(event) = self.controller.media_mut().next_event() {
            self.controller.handle_media_event(event);
        }
    }
}
