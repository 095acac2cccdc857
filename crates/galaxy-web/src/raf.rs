//! `requestAnimationFrame` as a frame clock

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use galaxy_render::{FrameClock, FrameHandle, GalaxyError};

use crate::dom::js_message;

/// Frame clock backed by the window's animation-frame callbacks
///
/// Every request reuses the same callback, which receives the
/// high-resolution frame timestamp in milliseconds.
pub struct AnimationFrameClock {
    window: Window,
    callback: Closure<dyn FnMut(f64)>,
}

impl AnimationFrameClock {
    pub fn new<F>(window: Window, on_frame: F) -> Self
    where
        F: FnMut(f64) + 'static,
    {
        Self {
            window,
            callback: Closure::wrap(Box::new(on_frame) as Box<dyn FnMut(f64)>),
        }
    }
}

impl FrameClock for AnimationFrameClock {
    fn request_frame(&mut self) -> Result<FrameHandle, GalaxyError> {
        self.window
            .request_animation_frame(self.callback.as_ref().unchecked_ref())
            .map(FrameHandle)
            .map_err(|e| GalaxyError::Scheduler(js_message(&e)))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let _ = self.window.cancel_animation_frame(handle.0);
    }
}
