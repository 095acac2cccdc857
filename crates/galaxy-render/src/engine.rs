//! Renderer composition and lifecycle
//!
//! [`GalaxyEngine`] wires configuration, motion, the uniform bridge and a
//! [`RenderStrategy`] to a [`FrameScheduler`]. Hosts forward refresh
//! callbacks, resize and pointer events to it and never touch the parts
//! directly.

use tracing::{debug, error};

use crate::bridge::UniformBridge;
use crate::config::GalaxyConfig;
use crate::error::GalaxyError;
use crate::math::SurfaceSize;
use crate::motion::MotionState;
use crate::program::UniformBlock;
use crate::scheduler::{FrameClock, FrameScheduler, FrameTick};

/// Everything a strategy may read while drawing one frame
#[derive(Clone, Copy, Debug)]
pub struct FrameContext<'a> {
    pub config: &'a GalaxyConfig,
    pub motion: &'a MotionState,
    pub surface: SurfaceSize,
    /// Staged uniforms, for strategies built on a shader program
    pub uniforms: Option<&'a UniformBlock>,
    pub tick: FrameTick,
}

/// One fidelity tier of the background
///
/// Construction is initialization; a strategy that exists is ready to draw.
pub trait RenderStrategy {
    /// The surface changed size
    fn resize(&mut self, surface: &SurfaceSize);

    /// Draw one frame
    ///
    /// `Ok(false)` means the frame was skipped (e.g. the surface was being
    /// reconfigured). An error is fatal and stops the loop.
    fn draw(&mut self, frame: &FrameContext<'_>) -> Result<bool, GalaxyError>;

    /// Release every resource. Called at most once.
    fn dispose(&mut self);

    /// Largest backing-store side the strategy can present, if bounded
    fn max_dimension(&self) -> Option<u32> {
        None
    }
}

impl<S: RenderStrategy + ?Sized> RenderStrategy for Box<S> {
    fn resize(&mut self, surface: &SurfaceSize) {
        (**self).resize(surface)
    }

    fn draw(&mut self, frame: &FrameContext<'_>) -> Result<bool, GalaxyError> {
        (**self).draw(frame)
    }

    fn dispose(&mut self) {
        (**self).dispose()
    }

    fn max_dimension(&self) -> Option<u32> {
        (**self).max_dimension()
    }
}

/// A running background instance
pub struct GalaxyEngine<S: RenderStrategy, C: FrameClock> {
    config: GalaxyConfig,
    surface: SurfaceSize,
    motion: MotionState,
    bridge: Option<UniformBridge>,
    strategy: S,
    scheduler: FrameScheduler<C>,
    frames_rendered: u64,
    disposed: bool,
}

impl<S: RenderStrategy, C: FrameClock> GalaxyEngine<S, C> {
    /// Assemble an engine; the initial uniforms are staged immediately
    ///
    /// `surface` is limited to what the strategy can present, see
    /// [`GalaxyEngine::surface`].
    pub fn new(
        config: GalaxyConfig,
        surface: SurfaceSize,
        bridge: Option<UniformBridge>,
        strategy: S,
        clock: C,
    ) -> Self {
        let surface = fit_surface(&strategy, surface);
        let motion = MotionState::new();
        let mut bridge = bridge;
        if let Some(bridge) = bridge.as_mut() {
            bridge.push_uniforms(&motion, &config, &surface);
        }
        debug!(
            strategy = config.strategy.id(),
            width = surface.width(),
            height = surface.height(),
            "galaxy engine created"
        );
        Self {
            config,
            surface,
            motion,
            bridge,
            strategy,
            scheduler: FrameScheduler::new(clock),
            frames_rendered: 0,
            disposed: false,
        }
    }

    /// Start the frame loop. No-op while running or after disposal.
    pub fn start(&mut self) -> Result<(), GalaxyError> {
        if self.disposed {
            debug!("start ignored on disposed engine");
            return Ok(());
        }
        self.scheduler.start()
    }

    /// Stop the frame loop. Safe in any state.
    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    /// Handle one refresh callback
    ///
    /// Returns `Ok(true)` when a frame was presented. A fatal draw error
    /// stops the scheduler before it is returned.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> Result<bool, GalaxyError> {
        let tick = match self.scheduler.on_frame(timestamp_ms) {
            Ok(Some(tick)) => tick,
            Ok(None) => return Ok(false),
            Err(e) => {
                error!("frame loop stopped: {}", e);
                return Err(e);
            }
        };

        self.motion.tick(tick.delta, &self.config);
        if let Some(bridge) = self.bridge.as_mut() {
            bridge.push_uniforms(&self.motion, &self.config, &self.surface);
        }

        let frame = FrameContext {
            config: &self.config,
            motion: &self.motion,
            surface: self.surface,
            uniforms: self.bridge.as_ref().map(UniformBridge::block),
            tick,
        };
        match self.strategy.draw(&frame) {
            Ok(true) => {
                self.frames_rendered += 1;
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(e) => {
                error!("fatal frame error, stopping: {}", e);
                self.scheduler.stop();
                Err(e)
            }
        }
    }

    /// Adopt a new surface size before the next frame
    ///
    /// The size is limited to the strategy's maximum first; hosts size their
    /// backing store from [`GalaxyEngine::surface`] afterwards.
    pub fn resize(&mut self, surface: SurfaceSize) {
        if self.disposed {
            return;
        }
        let surface = fit_surface(&self.strategy, surface);
        self.surface = surface;
        if let Some(bridge) = self.bridge.as_mut() {
            bridge.push_resolution(&surface);
        }
        self.strategy.resize(&surface);
    }

    /// Pointer moved, in normalized coordinates with y up
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.disposed || !self.config.mouse_interaction {
            return;
        }
        self.motion.on_pointer_move(x, y);
    }

    pub fn pointer_leave(&mut self) {
        if self.disposed || !self.config.mouse_interaction {
            return;
        }
        self.motion.on_pointer_leave();
    }

    /// Stop the loop and release the strategy. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.scheduler.stop();
        self.strategy.dispose();
        self.disposed = true;
        debug!(frames = self.frames_rendered, "galaxy engine disposed");
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn config(&self) -> &GalaxyConfig {
        &self.config
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    pub fn uniforms(&self) -> Option<&UniformBlock> {
        self.bridge.as_ref().map(UniformBridge::block)
    }

    pub fn scheduler(&self) -> &FrameScheduler<C> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut FrameScheduler<C> {
        &mut self.scheduler
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }
}

impl<S: RenderStrategy, C: FrameClock> Drop for GalaxyEngine<S, C> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn fit_surface<S: RenderStrategy>(strategy: &S, surface: SurfaceSize) -> SurfaceSize {
    match strategy.max_dimension() {
        Some(max) => {
            let fitted = surface.limit_to(max);
            if fitted != surface {
                debug!(max, width = fitted.width(), height = fitted.height(), "surface limited to device maximum");
            }
            fitted
        }
        None => surface,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualClock;

    #[derive(Default)]
    struct CountingStrategy {
        draws: u32,
        disposals: u32,
    }

    impl RenderStrategy for CountingStrategy {
        fn resize(&mut self, _surface: &SurfaceSize) {}

        fn draw(&mut self, _frame: &FrameContext<'_>) -> Result<bool, GalaxyError> {
            self.draws += 1;
            Ok(true)
        }

        fn dispose(&mut self) {
            self.disposals += 1;
        }
    }

    fn engine() -> GalaxyEngine<CountingStrategy, ManualClock> {
        GalaxyEngine::new(
            GalaxyConfig::default(),
            SurfaceSize::default(),
            None,
            CountingStrategy::default(),
            ManualClock::new(),
        )
    }

    #[test]
    fn test_frame_draws_once() {
        let mut e = engine();
        e.start().unwrap();
        assert!(e.on_frame(0.0).unwrap());
        assert_eq!(e.strategy().draws, 1);
        assert_eq!(e.frames_rendered(), 1);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut e = engine();
        e.start().unwrap();
        e.dispose();
        e.dispose();
        assert_eq!(e.strategy().disposals, 1);
        assert!(!e.is_running());
    }

    #[test]
    fn test_start_after_dispose_is_noop() {
        let mut e = engine();
        e.dispose();
        e.start().unwrap();
        assert!(!e.is_running());
        assert_eq!(e.scheduler().pending_frames(), 0);
    }

    #[test]
    fn test_boxed_strategy() {
        let mut e: GalaxyEngine<Box<dyn RenderStrategy>, ManualClock> = GalaxyEngine::new(
            GalaxyConfig::default(),
            SurfaceSize::default(),
            None,
            Box::new(CountingStrategy::default()),
            ManualClock::new(),
        );
        e.start().unwrap();
        assert!(e.on_frame(16.0).unwrap());
    }
}
