//! Procedural Galaxy Background Renderer
//!
//! This crate provides the animated star-field that sits behind a static page:
//! - Render configuration with documented defaults
//! - Pointer/time motion state with frame-rate independent smoothing
//! - WGSL program building, validation and uniform reflection
//! - A refresh-synchronized frame scheduler with an injectable clock
//! - A CPU reference of the layered star-field algorithm
//! - A lower-fidelity particle simulation tier
//!
//! ## Architecture
//!
//! - [`math`]: Core geometry types (`Vec2`, `SurfaceSize`)
//! - [`config`]: `GalaxyConfig` and renderer strategy selection
//! - [`motion`]: Elapsed time, star-speed phase and smoothed pointer state
//! - [`program`]: Shader compilation, reflection, quad geometry and uniforms
//! - [`bridge`]: Pushes motion and configuration into the uniform block
//! - [`scheduler`]: `Stopped`/`Running` frame loop over a `FrameClock`
//! - [`engine`]: Composition of all of the above behind one lifecycle
//! - [`starfield`]: CPU evaluation of the fragment algorithm
//! - [`particles`]: 2D particle simulation for the canvas strategy
//!
//! ## Example
//!
//! ```rust
//! use galaxy_render::{compile, GalaxyConfig, ShaderProgram, UniformBridge};
//! use galaxy_render::shaders::{STARFIELD_FRAGMENT, STARFIELD_VERTEX};
//!
//! let program: ShaderProgram = compile(STARFIELD_VERTEX, STARFIELD_FRAGMENT).unwrap();
//! let bridge = UniformBridge::new(&program);
//! assert!(bridge.block().has_uniform("time"));
//! let _config = GalaxyConfig::default();
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure Rust Core**: All state management is pure Rust, testable without browser
//! 2. **Time Abstraction**: Frames come from an injectable clock for deterministic testing
//! 3. **Browser Code Behind A Feature**: GPU and canvas strategies compile only with `wasm`

pub mod math;
pub mod config;
pub mod error;
pub mod motion;
pub mod program;
pub mod shaders;
pub mod bridge;
pub mod scheduler;
pub mod engine;
pub mod starfield;
pub mod particles;

// Browser render strategies (only available with "wasm" feature)
#[cfg(feature = "wasm")]
pub mod gpu;
#[cfg(feature = "wasm")]
pub mod canvas;

// Re-export core types for convenience
pub use math::{SurfaceSize, Vec2};
pub use config::{GalaxyConfig, StrategyKind};
pub use error::{GalaxyError, ShaderStage};
pub use motion::MotionState;
pub use program::{
    bind_geometry, compile, AttributeBinding, ShaderProgram, UniformBlock, UniformKind,
    UniformValue,
};
pub use bridge::UniformBridge;
pub use scheduler::{FrameClock, FrameHandle, FrameScheduler, FrameTick, ManualClock, SchedulerState};
pub use engine::{FrameContext, GalaxyEngine, RenderStrategy};
pub use particles::ParticleField;

/// Nominal display refresh interval in seconds
pub const NOMINAL_FRAME_SECONDS: f32 = 1.0 / 60.0;
