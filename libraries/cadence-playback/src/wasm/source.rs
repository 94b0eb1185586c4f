//! Browser-backed media source and scheduler

use crate::{
    known_duration, LoadStamp, MediaError, MediaErrorKind, MediaEvent, MediaEventKind,
    MediaSource, Scheduler, Timer,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlAudioElement};

/// Handler slot filled once the owning player exists
type Dispatch<T> = Rc<RefCell<Option<Box<dyn Fn(T)>>>>;

/// [`MediaSource`] over an `HTMLAudioElement`
///
/// Element events are stamped with the stamp of the most recent `load`.
/// Loading a new source discards the element's queued events, so events
/// that reach the listeners always belong to the current load.
pub struct HtmlAudioSource {
    element: HtmlAudioElement,
    stamp: Rc<Cell<LoadStamp>>,
    dispatch: Dispatch<MediaEvent>,
    _listeners: Vec<Closure<dyn FnMut(Event)>>,
}

impl HtmlAudioSource {
    /// Attach listeners to `element`
    pub fn new(element: HtmlAudioElement) -> Result<Self, JsValue> {
        let stamp = Rc::new(Cell::new(LoadStamp::default()));
        let dispatch: Dispatch<MediaEvent> = Rc::new(RefCell::new(None));

        let mut listeners = Vec::new();
        for (name, kind) in [
            ("loadedmetadata", MediaEventKind::MetadataLoaded),
            ("play", MediaEventKind::PlayStarted),
            ("pause", MediaEventKind::PauseStarted),
            ("ended", MediaEventKind::Ended),
            ("timeupdate", MediaEventKind::Progress),
        ] {
            listeners.push(listen(&element, name, &stamp, &dispatch, move || kind)?);
        }

        let failed = element.clone();
        listeners.push(listen(&element, "error", &stamp, &dispatch, move || {
            let code = failed.error().map_or(0, |e| e.code());
            MediaEventKind::Error(MediaError::from_code(code))
        })?);

        Ok(Self {
            element,
            stamp,
            dispatch,
            _listeners: listeners,
        })
    }

    /// Route element notifications to `handler`
    pub fn set_dispatch(&self, handler: Box<dyn Fn(MediaEvent)>) {
        *self.dispatch.borrow_mut() = Some(handler);
    }
}

fn listen(
    element: &HtmlAudioElement,
    name: &str,
    stamp: &Rc<Cell<LoadStamp>>,
    dispatch: &Dispatch<MediaEvent>,
    to_kind: impl Fn() -> MediaEventKind + 'static,
) -> Result<Closure<dyn FnMut(Event)>, JsValue> {
    let stamp = Rc::clone(stamp);
    let dispatch = Rc::clone(dispatch);
    let closure = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        let event = MediaEvent::new(stamp.get(), to_kind());
        if let Some(handler) = dispatch.borrow().as_ref() {
            handler(event);
        }
    });
    element.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
    Ok(closure)
}

impl MediaSource for HtmlAudioSource {
    fn load(&mut self, source: &str, stamp: LoadStamp) -> Result<(), MediaError> {
        self.stamp.set(stamp);
        // Ignore: pausing an element with no source is harmless
        let _ = self.element.pause();
        self.element.set_src(source);
        self.element.load();
        Ok(())
    }

    fn play(&mut self, request: u64) -> Result<(), MediaError> {
        let promise = self
            .element
            .play()
            .map_err(|_| MediaError::new(MediaErrorKind::Unknown, true))?;

        let stamp = self.stamp.get();
        let dispatch = Rc::clone(&self.dispatch);
        let on_reject = Closure::<dyn FnMut(JsValue)>::new(move |_reason: JsValue| {
            let event = MediaEvent::new(
                stamp,
                MediaEventKind::PlayRejected {
                    request,
                    error: MediaError::new(MediaErrorKind::Unknown, true),
                },
            );
            if let Some(handler) = dispatch.borrow().as_ref() {
                handler(event);
            }
        });
        let _ = promise.catch(&on_reject);
        // The promise may settle long after this source moved on
        on_reject.forget();
        Ok(())
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        self.element
            .pause()
            .map_err(|_| MediaError::new(MediaErrorKind::Unknown, false))
    }

    fn seek(&mut self, seconds: f64) -> Result<(), MediaError> {
        self.element.set_current_time(seconds);
        Ok(())
    }

    fn set_volume(&mut self, fraction: f32) -> Result<(), MediaError> {
        self.element.set_volume(f64::from(fraction));
        Ok(())
    }

    fn duration(&self) -> Option<f64> {
        known_duration(self.element.duration())
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }
}

/// [`Scheduler`] backed by `window.setTimeout`
pub struct TimeoutScheduler {
    dispatch: Dispatch<Timer>,
}

impl TimeoutScheduler {
    pub fn new() -> Self {
        Self {
            dispatch: Rc::new(RefCell::new(None)),
        }
    }

    /// Route fired timers to `handler`
    pub fn set_dispatch(&self, handler: Box<dyn Fn(Timer)>) {
        *self.dispatch.borrow_mut() = Some(handler);
    }
}

impl Default for TimeoutScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TimeoutScheduler {
    fn schedule(&mut self, delay: Duration, timer: Timer) {
        let Some(window) = web_sys::window() else {
            tracing::warn!(?timer, "No window available, dropping timer");
            return;
        };

        let dispatch = Rc::clone(&self.dispatch);
        let callback = Closure::once_into_js(move || {
            if let Some(handler) = dispatch.borrow().as_ref() {
                handler(timer);
            }
        });

        let delay_ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(e) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms)
        {
            tracing::warn!(?e, "setTimeout failed, dropping timer");
        }
    }
}
