//! The exported background lifecycle object
//!
//! State lives in an `Rc<RefCell<Phase>>`. The animation-frame callback and
//! every DOM listener hold only a `Weak` to it, so tearing down the
//! [`Runtime`] (or dropping the [`GalaxyBackground`]) releases everything
//! without reference cycles.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, error, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;
use web_sys::MouseEvent;

use galaxy_render::canvas::CanvasParticles;
use galaxy_render::gpu::GpuStarfield;
use galaxy_render::shaders::{STARFIELD_FRAGMENT, STARFIELD_VERTEX};
use galaxy_render::{compile, GalaxyConfig, GalaxyEngine, GalaxyError, RenderStrategy, StrategyKind, UniformBridge};

use crate::dom::BackgroundCanvas;
use crate::listeners::EventListener;
use crate::logging;
use crate::options::HostOptions;
use crate::raf::AnimationFrameClock;
use crate::util::log;

type Engine = GalaxyEngine<Box<dyn RenderStrategy>, AnimationFrameClock>;

/// Everything a running background owns
///
/// Field order is teardown order: the engine cancels its frame and releases
/// the strategy, then listeners detach, then the canvas leaves the page.
struct Runtime {
    engine: Engine,
    listeners: Vec<EventListener>,
    canvas: BackgroundCanvas,
}

enum Phase {
    Idle,
    Initializing,
    Running(Runtime),
    Failed,
    Disposed,
}

/// Animated star-field background for a page
#[wasm_bindgen]
pub struct GalaxyBackground {
    config: GalaxyConfig,
    shared: Rc<RefCell<Phase>>,
}

#[wasm_bindgen]
impl GalaxyBackground {
    /// Create a background from an optional JSON options object
    ///
    /// Fails on malformed JSON or an unknown `logLevel`.
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<String>) -> Result<GalaxyBackground, JsValue> {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        let json = options.unwrap_or_else(|| "{}".to_string());
        let host = HostOptions::from_json(&json).map_err(to_js)?;
        logging::init(host.log_level);
        let config = GalaxyConfig::from_json(&json).map_err(to_js)?;

        Ok(Self {
            config,
            shared: Rc::new(RefCell::new(Phase::Idle)),
        })
    }

    /// Acquire the surface, build the renderer and start the loop
    ///
    /// Resolves `true` once running. Resolves `false` (after logging why)
    /// when no background can be shown; the page works without it.
    pub fn start(&self) -> js_sys::Promise {
        let shared = Rc::clone(&self.shared);
        let config = self.config.clone();
        future_to_promise(async move { Ok(JsValue::from_bool(launch(shared, config).await)) })
    }

    /// Stop the loop, detach listeners, release GPU resources and remove the canvas
    ///
    /// Idempotent. An initialization still in flight observes this and
    /// releases what it built.
    pub fn destroy(&self) {
        let previous = self.shared.replace(Phase::Disposed);
        if let Phase::Running(runtime) = previous {
            let frames = runtime.engine.frames_rendered();
            drop(runtime);
            info!(frames, "galaxy background destroyed");
        }
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        match &*self.shared.borrow() {
            Phase::Running(runtime) => runtime.engine.is_running(),
            _ => false,
        }
    }

    #[wasm_bindgen(js_name = framesRendered)]
    pub fn frames_rendered(&self) -> f64 {
        match &*self.shared.borrow() {
            Phase::Running(runtime) => runtime.engine.frames_rendered() as f64,
            _ => 0.0,
        }
    }

    /// Number of DOM listeners currently installed
    #[wasm_bindgen(js_name = listenerCount)]
    pub fn listener_count(&self) -> u32 {
        match &*self.shared.borrow() {
            Phase::Running(runtime) => runtime.listeners.len() as u32,
            _ => 0,
        }
    }
}

impl Drop for GalaxyBackground {
    fn drop(&mut self) {
        self.destroy();
    }
}

async fn launch(shared: Rc<RefCell<Phase>>, config: GalaxyConfig) -> bool {
    {
        let mut phase = shared.borrow_mut();
        match *phase {
            Phase::Idle | Phase::Failed => *phase = Phase::Initializing,
            Phase::Running(_) => return true,
            Phase::Initializing => {
                debug!("start ignored, initialization already in progress");
                return false;
            }
            Phase::Disposed => {
                debug!("start ignored on destroyed background");
                return false;
            }
        }
    }

    let built = build_runtime(Rc::downgrade(&shared), &config).await;

    let mut runtime = match built {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("galaxy background unavailable: {}", e);
            log(&format!("[galaxy] Background disabled: {}", e));
            let mut phase = shared.borrow_mut();
            if !matches!(*phase, Phase::Disposed) {
                *phase = Phase::Failed;
            }
            return false;
        }
    };

    if matches!(*shared.borrow(), Phase::Disposed) {
        drop(runtime);
        info!("destroyed during initialization, resources released");
        return false;
    }

    if let Err(e) = runtime.engine.start() {
        error!("galaxy background could not start: {}", e);
        drop(runtime);
        *shared.borrow_mut() = Phase::Failed;
        return false;
    }

    info!(
        strategy = config.strategy.id(),
        listeners = runtime.listeners.len(),
        "galaxy background running"
    );
    *shared.borrow_mut() = Phase::Running(runtime);
    true
}

async fn build_runtime(weak: Weak<RefCell<Phase>>, config: &GalaxyConfig) -> Result<Runtime, GalaxyError> {
    let canvas = BackgroundCanvas::attach()?;
    let size = canvas.measure(config.max_pixel_ratio);
    canvas.apply(&size);

    let (strategy, bridge): (Box<dyn RenderStrategy>, Option<UniformBridge>) = match config.strategy {
        StrategyKind::Shader => {
            let program = compile(STARFIELD_VERTEX, STARFIELD_FRAGMENT)?;
            let gpu = GpuStarfield::new(canvas.element().clone(), &program, size, config.transparent).await?;
            (Box::new(gpu) as Box<dyn RenderStrategy>, Some(UniformBridge::new(&program)))
        }
        StrategyKind::Particles => {
            let particles = CanvasParticles::new(canvas.element(), config, size)?;
            (Box::new(particles) as Box<dyn RenderStrategy>, None)
        }
    };

    let frame_weak = weak.clone();
    let clock = AnimationFrameClock::new(canvas.window().clone(), move |timestamp| {
        with_runtime(&frame_weak, |runtime| {
            // Fatal errors are logged and stop the loop inside the engine
            let _ = runtime.engine.on_frame(timestamp);
        });
    });
    let engine = GalaxyEngine::new(config.clone(), size, bridge, strategy, clock);
    canvas.apply(&engine.surface());

    let listeners = install_listeners(&weak, &canvas, config)?;

    Ok(Runtime {
        engine,
        listeners,
        canvas,
    })
}

fn install_listeners(
    weak: &Weak<RefCell<Phase>>,
    canvas: &BackgroundCanvas,
    config: &GalaxyConfig,
) -> Result<Vec<EventListener>, GalaxyError> {
    let window = canvas.window();
    let mut listeners = Vec::new();

    let w = weak.clone();
    listeners.push(EventListener::new(window, "resize", move |_| {
        with_runtime(&w, |runtime| {
            let size = runtime.canvas.measure(runtime.engine.config().max_pixel_ratio);
            runtime.engine.resize(size);
            runtime.canvas.apply(&runtime.engine.surface());
        });
    })?);

    if !config.mouse_interaction {
        return Ok(listeners);
    }

    let w = weak.clone();
    listeners.push(EventListener::new(window, "mousemove", move |event| {
        let Ok(event) = event.dyn_into::<MouseEvent>() else {
            return;
        };
        with_runtime(&w, |runtime| {
            let surface = runtime.engine.surface();
            if surface.css_width <= 0.0 || surface.css_height <= 0.0 {
                return;
            }
            let x = event.client_x() as f32 / surface.css_width;
            let y = 1.0 - event.client_y() as f32 / surface.css_height;
            runtime.engine.pointer_move(x, y);
        });
    })?);

    if let Some(document) = window.document() {
        let w = weak.clone();
        listeners.push(EventListener::new(&document, "mouseleave", move |_| {
            with_runtime(&w, |runtime| runtime.engine.pointer_leave());
        })?);
    }

    let w = weak.clone();
    listeners.push(EventListener::new(window, "blur", move |_| {
        with_runtime(&w, |runtime| runtime.engine.pointer_leave());
    })?);

    Ok(listeners)
}

/// Run `f` on the live runtime, if there is one and it is not already borrowed
fn with_runtime(weak: &Weak<RefCell<Phase>>, f: impl FnOnce(&mut Runtime)) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let Ok(mut phase) = shared.try_borrow_mut() else {
        return;
    };
    if let Phase::Running(runtime) = &mut *phase {
        f(runtime);
    }
}

fn to_js(e: GalaxyError) -> JsValue {
    JsValue::from_str(&e.to_string())
}
