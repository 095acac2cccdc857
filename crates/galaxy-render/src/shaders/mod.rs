//! WGSL sources for the procedural star field
//!
//! The vertex and fragment stages are separate modules so the program
//! builder can validate each stage and check their interface on link.

mod starfield;
mod vertex;

pub use starfield::STARFIELD_FRAGMENT;
pub use vertex::STARFIELD_VERTEX;

/// Vertex stage entry point name
pub const VERTEX_ENTRY: &str = "vs_main";

/// Fragment stage entry point name
pub const FRAGMENT_ENTRY: &str = "fs_main";
