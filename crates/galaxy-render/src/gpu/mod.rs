//! wgpu implementation of the shader strategy
//!
//! Runs the linked star-field program over a full-screen quad on a canvas
//! surface. WebGPU is preferred; WebGL2 is the fallback backend.

mod device;
mod pipeline;
mod renderer;

pub use renderer::GpuStarfield;
