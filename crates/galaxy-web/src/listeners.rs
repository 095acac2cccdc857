//! DOM event listeners that detach themselves

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget};

use galaxy_render::GalaxyError;

use crate::dom::js_message;

/// A registered listener; dropping it removes it from its target
pub struct EventListener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    pub fn new<F>(target: &EventTarget, event: &'static str, handler: F) -> Result<Self, GalaxyError>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(|e| GalaxyError::UnsupportedSurface(format!("cannot listen for {}: {}", event, js_message(&e))))?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}
