//! Core geometry types for the star field
//!
//! These types provide the small amount of 2D math the renderer needs:
//! pointer coordinates, sampling-plane rotation and surface sizing.

mod vec2;
mod surface;

pub use vec2::Vec2;
pub use surface::SurfaceSize;
