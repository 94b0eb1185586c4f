//! WASM bindings for cadence-playback
//!
//! Drives an `HTMLAudioElement` from the browser: [`HtmlAudioSource`] adapts
//! the element to [`MediaSource`](crate::MediaSource), [`TimeoutScheduler`]
//! runs retries through `setTimeout`, and [`WasmPlayer`] exposes the
//! controller to JavaScript.

pub mod player;
pub mod source;

pub use player::WasmPlayer;
pub use source::{HtmlAudioSource, TimeoutScheduler};
