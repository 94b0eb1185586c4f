//! WASM-compatible PlaybackController wrapper

use super::source::{HtmlAudioSource, TimeoutScheduler};
use crate::{
    pointer_fraction, Catalog, PlaybackConfig, PlaybackController, PlaybackError, RepeatMode,
    Track,
};
use js_sys::Function;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::HtmlAudioElement;

type Controller = PlaybackController<HtmlAudioSource, TimeoutScheduler>;

/// Playlist player bound to an `<audio>` element
///
/// Element notifications and retry timers arrive asynchronously, so the
/// controller lives behind `Rc<RefCell<_>>` shared with those callbacks.
/// Queued [`PlayerEvent`](crate::PlayerEvent)s are delivered to the
/// `onEvent` callback after every call, with no borrow held.
#[wasm_bindgen]
pub struct WasmPlayer {
    inner: Rc<RefCell<Controller>>,
    on_event: Rc<RefCell<Option<Function>>>,
}

#[wasm_bindgen]
impl WasmPlayer {
    /// Create a player for `tracks`, optionally with a playback config
    #[wasm_bindgen(constructor)]
    pub fn new(
        element: HtmlAudioElement,
        tracks: JsValue,
        config: JsValue,
    ) -> Result<WasmPlayer, JsValue> {
        console_error_panic_hook::set_once();

        let tracks: Vec<Track> = serde_wasm_bindgen::from_value(tracks)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse tracks: {}", e)))?;
        let config: PlaybackConfig = if config.is_undefined() || config.is_null() {
            PlaybackConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?
        };
        config.validate().map_err(to_js)?;

        let catalog = Catalog::new(tracks).map_err(to_js)?;
        let source = HtmlAudioSource::new(element)?;
        let controller = PlaybackController::new(catalog, source, TimeoutScheduler::new(), config);

        let player = Self {
            inner: Rc::new(RefCell::new(controller)),
            on_event: Rc::new(RefCell::new(None)),
        };
        player.wire_callbacks();
        Ok(player)
    }

    // ===== Transport =====

    /// Make `index` current, keeping playback going if it was
    #[wasm_bindgen(js_name = selectTrack)]
    pub fn select_track(&self, index: usize) -> Result<(), JsValue> {
        let result = self.inner.borrow_mut().select_track(index);
        self.flush();
        result.map_err(to_js)
    }

    /// Playlist item activation: select `index` and start playing
    #[wasm_bindgen(js_name = activateTrack)]
    pub fn activate_track(&self, index: usize) -> Result<(), JsValue> {
        let result = self.inner.borrow_mut().activate_track(index);
        self.flush();
        result.map_err(to_js)
    }

    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&self) {
        self.inner.borrow_mut().toggle_play_pause();
        self.flush();
    }

    pub fn play(&self) {
        self.inner.borrow_mut().play();
        self.flush();
    }

    pub fn pause(&self) {
        self.inner.borrow_mut().pause();
        self.flush();
    }

    pub fn next(&self) {
        self.inner.borrow_mut().next();
        self.flush();
    }

    pub fn previous(&self) {
        self.inner.borrow_mut().previous();
        self.flush();
    }

    // ===== Repeat & Volume =====

    #[wasm_bindgen(js_name = cycleRepeatMode)]
    pub fn cycle_repeat_mode(&self) {
        self.inner.borrow_mut().cycle_repeat_mode();
        self.flush();
    }

    /// Set repeat mode ("none" | "single" | "all")
    #[wasm_bindgen(js_name = setRepeatMode)]
    pub fn set_repeat_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode = match mode {
            "none" => RepeatMode::None,
            "single" => RepeatMode::Single,
            "all" => RepeatMode::All,
            _ => {
                return Err(JsValue::from_str(
                    "Invalid repeat mode. Use 'none', 'single', or 'all'",
                ))
            }
        };
        self.inner.borrow_mut().set_repeat_mode(mode);
        self.flush();
        Ok(())
    }

    #[wasm_bindgen(js_name = getRepeatMode)]
    pub fn get_repeat_mode(&self) -> String {
        match self.inner.borrow().repeat_mode() {
            RepeatMode::None => "none".to_string(),
            RepeatMode::Single => "single".to_string(),
            RepeatMode::All => "all".to_string(),
        }
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, fraction: f32) {
        self.inner.borrow_mut().set_volume(fraction);
        self.flush();
    }

    #[wasm_bindgen(js_name = getVolume)]
    pub fn get_volume(&self) -> f32 {
        self.inner.borrow().volume()
    }

    // ===== Seeking =====

    /// Click on the progress bar at `offset_px` of a `width_px` wide bar
    #[wasm_bindgen(js_name = scrubAt)]
    pub fn scrub_at(&self, offset_px: f64, width_px: f64) {
        self.scrub(pointer_fraction(offset_px, width_px));
    }

    pub fn scrub(&self, fraction: f64) {
        self.inner.borrow_mut().scrub(fraction);
        self.flush();
    }

    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&self) {
        self.inner.borrow_mut().begin_drag();
        self.flush();
    }

    #[wasm_bindgen(js_name = updateDrag)]
    pub fn update_drag(&self, fraction: f64) {
        self.inner.borrow_mut().update_drag(fraction);
        self.flush();
    }

    #[wasm_bindgen(js_name = updateDragAt)]
    pub fn update_drag_at(&self, offset_px: f64, width_px: f64) {
        self.update_drag(pointer_fraction(offset_px, width_px));
    }

    #[wasm_bindgen(js_name = endDrag)]
    pub fn end_drag(&self) {
        self.inner.borrow_mut().end_drag();
        self.flush();
    }

    // ===== Queries =====

    #[wasm_bindgen(js_name = currentIndex)]
    pub fn current_index(&self) -> usize {
        self.inner.borrow().current_index()
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.inner.borrow().is_playing()
    }

    #[wasm_bindgen(js_name = displayedFraction)]
    pub fn displayed_fraction(&self) -> f64 {
        self.inner.borrow().seek_state().displayed_fraction
    }

    #[wasm_bindgen(js_name = currentLabel)]
    pub fn current_label(&self) -> String {
        self.inner.borrow().current_label().to_string()
    }

    #[wasm_bindgen(js_name = totalLabel)]
    pub fn total_label(&self) -> String {
        self.inner.borrow().total_label().to_string()
    }

    /// Get the playlist as plain objects
    pub fn tracks(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.borrow().catalog().tracks())
            .unwrap_or(JsValue::NULL)
    }

    // ===== Event Listeners =====

    /// Register the event callback, called with one event object per change
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&self, callback: Function) {
        *self.on_event.borrow_mut() = Some(callback);
    }

    // ===== Internal =====

    fn wire_callbacks(&self) {
        let controller = self.inner.borrow();

        let weak = Rc::downgrade(&self.inner);
        let on_event = Rc::clone(&self.on_event);
        controller.media().set_dispatch(Box::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().handle_media_event(event);
                deliver(&inner, &on_event);
            }
        }));

        let weak = Rc::downgrade(&self.inner);
        let on_event = Rc::clone(&self.on_event);
        controller.scheduler().set_dispatch(Box::new(move |timer| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().on_timer(timer);
                deliver(&inner, &on_event);
            }
        }));
    }

    fn flush(&self) {
        deliver(&self.inner, &self.on_event);
    }
}

/// Hand queued events to the JS callback
///
/// The controller borrow is released before any callback runs, so callbacks
/// may call back into the player.
fn deliver(inner: &RefCell<Controller>, on_event: &RefCell<Option<Function>>) {
    let events = inner.borrow_mut().drain_events();
    if events.is_empty() {
        return;
    }

    let Some(callback) = on_event.borrow().clone() else {
        return;
    };
    for event in events {
        match serde_wasm_bindgen::to_value(&event) {
            Ok(value) => {
                callback.call1(&JsValue::NULL, &value).ok();
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize player event"),
        }
    }
}

fn to_js(error: PlaybackError) -> JsValue {
    JsValue::from_str(&error.to_string())
}
