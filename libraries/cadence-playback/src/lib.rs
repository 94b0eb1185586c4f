//! Cadence - Playlist Playback Control
//!
//! Platform-agnostic playback control for a single media element driven
//! through a fixed playlist.
//!
//! This crate provides:
//! - Immutable track catalog
//! - Transport control (play/pause, next/previous with wraparound)
//! - Repeat modes (None, Single, All) and end-of-track policy
//! - Volume with mute/low/high display tiers
//! - Progress, click-to-scrub and drag-to-seek coordination
//! - One delayed retry for rejected play requests
//! - Stale notification guarding across rapid track switches
//!
//! # Architecture
//!
//! `cadence-playback` never touches a real media element or timer:
//! - The media element is provided through the [`MediaSource`] trait
//! - Deferred work goes through the [`Scheduler`] trait
//! - State changes are queued as [`PlayerEvent`]s for the presentation layer
//!
//! Everything runs on one thread of control: the host calls transport
//! methods for user gestures and [`PlaybackController::handle_media_event`]
//! for media notifications.
//!
//! # Example
//!
//! ```rust
//! use cadence_playback::{
//!     Catalog, LoadStamp, ManualScheduler, MediaError, MediaSource, PlaybackConfig,
//!     PlaybackController, Track,
//! };
//!
//! # #[derive(Default)]
//! # struct NullSource;
//! # impl MediaSource for NullSource {
//! #     fn load(&mut self, _: &str, _: LoadStamp) -> Result<(), MediaError> { Ok(()) }
//! #     fn play(&mut self, _: u64) -> Result<(), MediaError> { Ok(()) }
//! #     fn pause(&mut self) -> Result<(), MediaError> { Ok(()) }
//! #     fn seek(&mut self, _: f64) -> Result<(), MediaError> { Ok(()) }
//! #     fn set_volume(&mut self, _: f32) -> Result<(), MediaError> { Ok(()) }
//! #     fn duration(&self) -> Option<f64> { None }
//! #     fn current_time(&self) -> f64 { 0.0 }
//! # }
//! let catalog = Catalog::new(vec![Track {
//!     id: 1,
//!     title: "How Are You".to_string(),
//!     artist: "Tsong".to_string(),
//!     duration_label: "02:58".to_string(),
//!     artwork: String::new(),
//!     source: "./how-are-you.mp3".to_string(),
//! }])
//! .unwrap();
//!
//! let mut controller = PlaybackController::new(
//!     catalog,
//!     NullSource,
//!     ManualScheduler::new(),
//!     PlaybackConfig::default(),
//! );
//!
//! controller.toggle_play_pause();
//! controller.cycle_repeat_mode();
//! controller.set_volume(0.5);
//!
//! for event in controller.drain_events() {
//!     println!("{:?}", event);
//! }
//! ```

mod catalog;
mod controller;
mod error;
mod events;
mod scheduler;
pub mod seek;
mod source;
pub mod types;
mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use catalog::Catalog;
pub use controller::PlaybackController;
pub use error::{MediaError, MediaErrorKind, PlaybackError, Result};
pub use events::PlayerEvent;
pub use scheduler::{ManualScheduler, Scheduler, Timer};
pub use seek::{format_time, pointer_fraction, SeekCoordinator, SeekState};
pub use source::{known_duration, LoadStamp, MediaEvent, MediaEventKind, MediaSource};
pub use types::{PlaybackConfig, PlaybackState, RepeatMode, RetryPolicy, Track};
pub use volume::{Volume, VolumeTier};
