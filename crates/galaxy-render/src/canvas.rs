//! 2D canvas implementation of the particle strategy

use std::f64::consts::TAU;

use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::config::GalaxyConfig;
use crate::engine::{FrameContext, RenderStrategy};
use crate::error::GalaxyError;
use crate::math::{SurfaceSize, Vec2};
use crate::particles::ParticleField;

/// Backdrop gradient stops, center to edge. Partially transparent, so
/// earlier frames leave faint trails.
const BACKDROP: [(f32, &str); 3] = [
    (0.0, "rgba(26, 26, 46, 0.8)"),
    (0.5, "rgba(22, 33, 62, 0.6)"),
    (1.0, "rgba(10, 10, 10, 0.9)"),
];

/// Particle strategy: drifting stars drawn with `CanvasRenderingContext2d`
pub struct CanvasParticles {
    context: Option<CanvasRenderingContext2d>,
    field: ParticleField,
}

impl CanvasParticles {
    pub fn new(canvas: &HtmlCanvasElement, config: &GalaxyConfig, size: SurfaceSize) -> Result<Self, GalaxyError> {
        let context = canvas
            .get_context("2d")
            .map_err(|e| GalaxyError::UnsupportedSurface(js_message(&e)))?
            .ok_or_else(|| GalaxyError::UnsupportedSurface("2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| GalaxyError::UnsupportedSurface("2d context has unexpected type".to_string()))?;

        let field = ParticleField::new(config, &size);
        debug!(stars = field.len(), "canvas particles ready");
        Ok(Self {
            context: Some(context),
            field,
        })
    }

    fn paint(&self, ctx: &CanvasRenderingContext2d, glow: f32, saturation: f32) -> Result<(), JsValue> {
        let (w, h) = self.field.bounds();
        let (w, h) = (f64::from(w), f64::from(h));
        let (cx, cy) = (w / 2.0, h / 2.0);

        let backdrop = ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, w.max(h) / 2.0)?;
        for (offset, color) in BACKDROP {
            backdrop.add_color_stop(offset, color)?;
        }
        ctx.set_fill_style_canvas_gradient(&backdrop);
        ctx.fill_rect(0.0, 0.0, w, h);

        for star in self.field.particles() {
            let twinkle = star.twinkle();
            let [r, g, b] = star.color(saturation).map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
            let (x, y) = (f64::from(star.position.x), f64::from(star.position.y));

            ctx.save();
            ctx.set_global_composite_operation("screen")?;

            let glow_size = f64::from(star.size * 3.0 * glow);
            let halo = ctx.create_radial_gradient(x, y, 0.0, x, y, glow_size)?;
            halo.add_color_stop(0.0, &format!("rgba({}, {}, {}, {})", r, g, b, 0.3 * twinkle))?;
            halo.add_color_stop(1.0, "rgba(0, 0, 0, 0)")?;
            ctx.set_fill_style_canvas_gradient(&halo);
            ctx.fill_rect(x - glow_size, y - glow_size, glow_size * 2.0, glow_size * 2.0);

            ctx.set_fill_style_str(&format!("rgba({}, {}, {}, {})", r, g, b, twinkle));
            ctx.begin_path();
            ctx.arc(x, y, f64::from(star.size), 0.0, TAU)?;
            ctx.fill();

            ctx.restore();
        }
        Ok(())
    }
}

impl RenderStrategy for CanvasParticles {
    fn resize(&mut self, surface: &SurfaceSize) {
        self.field.reseed(surface);
    }

    fn draw(&mut self, frame: &FrameContext<'_>) -> Result<bool, GalaxyError> {
        let Some(ctx) = self.context.clone() else {
            return Ok(false);
        };

        let (w, h) = self.field.bounds();
        let motion = frame.motion;
        let pointer = (frame.config.mouse_repulsion && motion.smoothed_active > 0.0)
            .then(|| Vec2::new(motion.smoothed_pointer.x * w, (1.0 - motion.smoothed_pointer.y) * h));
        self.field.step(frame.tick.delta, pointer, motion.smoothed_active);

        self.paint(&ctx, frame.config.glow_intensity, frame.config.saturation)
            .map_err(|e| GalaxyError::ContextLost(js_message(&e)))?;
        Ok(true)
    }

    fn dispose(&mut self) {
        if self.context.take().is_some() {
            debug!("canvas particles released");
        }
    }
}

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
