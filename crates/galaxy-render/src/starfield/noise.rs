//! Hash and periodic wave helpers shared by every star
//!
//! These follow WGSL built-in semantics, not Rust's: `fract` is
//! `x - floor(x)` and stays in [0, 1) for negative inputs.

use crate::math::Vec2;

/// WGSL `fract`
#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Component-wise [`fract`]
#[inline]
pub fn fract2(v: Vec2) -> Vec2 {
    Vec2::new(fract(v.x), fract(v.y))
}

/// WGSL `smoothstep` for `edge0 < edge1`
#[inline]
pub fn smooth_step(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// WGSL `mix`
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Pseudo-random value in [0, 1) for a lattice cell
///
/// Pure: identical inputs give bit-identical outputs.
pub fn hash21(cell: Vec2) -> f32 {
    let p = fract2(cell * Vec2::new(123.34, 456.21));
    let d = p.dot(p + Vec2::new(45.32, 45.32));
    let p = Vec2::new(p.x + d, p.y + d);
    fract(p.x * p.y)
}

/// Triangle wave in [0, 1], 1 at integers
#[inline]
pub fn tri(x: f32) -> f32 {
    (fract(x) * 2.0 - 1.0).abs()
}

/// Smoothed triangle wave in [0, 1], 1 at half-integers
#[inline]
pub fn tris(x: f32) -> f32 {
    let t = fract(x);
    1.0 - smooth_step(0.0, 1.0, (2.0 * t - 1.0).abs())
}

/// [`tris`] remapped to [-1, 1]
#[inline]
pub fn trisn(x: f32) -> f32 {
    2.0 * tris(x) - 1.0
}
