//! The background canvas element

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlCanvasElement, Window};

use galaxy_render::{GalaxyError, SurfaceSize};

/// Inline style making the canvas a fixed, input-transparent backdrop
const CANVAS_STYLE: [(&str, &str); 7] = [
    ("position", "fixed"),
    ("top", "0"),
    ("left", "0"),
    ("width", "100%"),
    ("height", "100%"),
    ("pointer-events", "none"),
    ("z-index", "-1"),
];

/// Full-viewport canvas appended to `<body>`; removed again on drop
pub struct BackgroundCanvas {
    window: Window,
    canvas: HtmlCanvasElement,
}

impl BackgroundCanvas {
    /// Create, style and attach the canvas
    pub fn attach() -> Result<Self, GalaxyError> {
        let window = web_sys::window().ok_or_else(|| unsupported("no window"))?;
        let document = window.document().ok_or_else(|| unsupported("no document"))?;
        let body = document.body().ok_or_else(|| unsupported("document has no body"))?;

        let canvas = document
            .create_element("canvas")
            .map_err(|e| unsupported(&js_message(&e)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| unsupported("created element is not a canvas"))?;

        let style = canvas.style();
        for (property, value) in CANVAS_STYLE {
            style.set_property(property, value).map_err(|e| unsupported(&js_message(&e)))?;
        }
        canvas
            .set_attribute("aria-hidden", "true")
            .map_err(|e| unsupported(&js_message(&e)))?;
        body.append_child(&canvas).map_err(|e| unsupported(&js_message(&e)))?;

        Ok(Self { window, canvas })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn element(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Current viewport size with the device pixel ratio capped at `max_ratio`
    pub fn measure(&self, max_ratio: f32) -> SurfaceSize {
        let dimension = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
        SurfaceSize::from_viewport(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
            self.window.device_pixel_ratio() as f32,
            max_ratio,
        )
    }

    /// Resize the backing store
    pub fn apply(&self, size: &SurfaceSize) {
        self.canvas.set_width(size.width());
        self.canvas.set_height(size.height());
    }
}

impl Drop for BackgroundCanvas {
    fn drop(&mut self) {
        self.canvas.remove();
    }
}

fn unsupported(reason: &str) -> GalaxyError {
    GalaxyError::UnsupportedSurface(reason.to_string())
}

pub fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
