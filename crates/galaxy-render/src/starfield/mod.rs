//! CPU reference of the layered star-field algorithm
//!
//! Mirrors the fragment shader in [`crate::shaders`] step for step so the
//! algorithm's properties can be tested without a GPU.

mod color;
mod noise;

pub use color::{hsv_to_rgb, recolor};
pub use noise::{fract, hash21, mix, smooth_step, tri, tris, trisn};

use crate::config::GalaxyConfig;
use crate::math::{SurfaceSize, Vec2};
use crate::motion::MotionState;

/// Depth layers summed per pixel
pub const LAYER_COUNT: usize = 4;

/// Hashed red/blue channels below this are suppressed
const STAR_COLOR_CUTOFF: f32 = 0.2;

/// Flare period scale
const PERIOD: f32 = 3.0;

/// Per-layer lattice offset
const LAYER_OFFSET: f32 = 453.32;

/// Inputs of one frame, as the shader sees them in its uniform block
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarfieldParams {
    pub resolution: [f32; 3],
    pub time: f32,
    pub star_speed: f32,
    pub speed: f32,
    pub mouse: Vec2,
    pub mouse_active: f32,
    pub density: f32,
    /// In turns
    pub hue_shift: f32,
    pub saturation: f32,
    pub glow_intensity: f32,
    pub twinkle_intensity: f32,
    pub rotation_speed: f32,
    pub repulsion_strength: f32,
    pub auto_center_repulsion: f32,
    pub focal: Vec2,
    /// `[cos, sin]` of the static rotation
    pub rotation: [f32; 2],
    pub mouse_repulsion: bool,
    pub transparent: bool,
}

impl StarfieldParams {
    pub fn from_frame(config: &GalaxyConfig, motion: &MotionState, surface: &SurfaceSize) -> Self {
        Self {
            resolution: surface.resolution(),
            time: motion.elapsed,
            star_speed: motion.star_speed_phase,
            speed: config.speed,
            mouse: motion.smoothed_pointer,
            mouse_active: motion.smoothed_active,
            density: config.density,
            hue_shift: config.hue_shift_turns(),
            saturation: config.saturation,
            glow_intensity: config.glow_intensity,
            twinkle_intensity: config.twinkle_intensity,
            rotation_speed: config.rotation_speed,
            repulsion_strength: config.repulsion_strength,
            auto_center_repulsion: config.auto_center_repulsion,
            focal: config.focal.into(),
            rotation: config.rotation_vector(),
            mouse_repulsion: config.mouse_repulsion,
            transparent: config.transparent,
        }
    }
}

/// Brightness of one star at offset `uv` from its center
///
/// Core glow falls off as `1/d`; ray flares follow the axes and diagonals.
/// Zero at and beyond distance 1.
pub fn star_intensity(uv: Vec2, flare: f32, glow: f32) -> f32 {
    let d = uv.length().max(1e-4);
    let mut m = 0.05 * glow / d;

    let rays = |v: Vec2| smooth_step(0.0, 1.0, 1.0 - (v.x * v.y * 1000.0).abs());
    m += rays(uv) * flare * glow;
    m += rays(rotate45(uv)) * 0.3 * flare * glow;

    m * (1.0 - smooth_step(0.2, 1.0, d))
}

/// Fade of a depth layer; zero where the layer wraps
#[inline]
pub fn layer_fade(depth: f32) -> f32 {
    depth * (1.0 - smooth_step(0.9, 1.0, depth))
}

fn rotate45(v: Vec2) -> Vec2 {
    Vec2::new(0.7071 * (v.x - v.y), 0.7071 * (v.x + v.y))
}

/// Color contributed by the 3x3 cells around `uv` in one layer
pub fn star_layer(p: &StarfieldParams, uv: Vec2) -> [f32; 3] {
    let mut col = [0.0f32; 3];
    let gv = Vec2::new(fract(uv.x) - 0.5, fract(uv.y) - 0.5);
    let id = uv.floor();

    for y in -1..=1 {
        for x in -1..=1 {
            let offset = Vec2::new(x as f32, y as f32);
            let si = id + offset;
            let seed = hash21(si);
            let size = fract(seed * 345.32);
            let gloss = tri(p.star_speed / (PERIOD * seed + 1.0));
            let flare = smooth_step(0.9, 1.0, size) * gloss;

            let red = smooth_step(STAR_COLOR_CUTOFF, 1.0, hash21(si + Vec2::new(1.0, 1.0))) + STAR_COLOR_CUTOFF;
            let blu = smooth_step(STAR_COLOR_CUTOFF, 1.0, hash21(si + Vec2::new(3.0, 3.0))) + STAR_COLOR_CUTOFF;
            let grn = red.min(blu) * seed;
            let tint = recolor([red, grn, blu], p.hue_shift, p.saturation);

            let pad = Vec2::new(
                tris(seed * 34.0 + p.time * p.speed / 10.0),
                tris(seed * 38.0 + p.time * p.speed / 30.0),
            ) - 0.5;

            let twinkle = trisn(p.time * p.speed + seed * 6.2831) * 0.5 + 1.0;
            let twinkle = mix(1.0, twinkle, p.twinkle_intensity);
            let intensity = star_intensity(gv - offset - pad, flare, p.glow_intensity) * twinkle;

            for (c, t) in col.iter_mut().zip(tint) {
                *c += intensity * size * t;
            }
        }
    }
    col
}

/// Map a surface coordinate into the rotated, distorted sampling plane
pub fn sampling_coordinate(p: &StarfieldParams, frag_uv: Vec2) -> Vec2 {
    let res = Vec2::new(p.resolution[0], p.resolution[1]);
    let focal_px = p.focal * res;
    let mut uv = (frag_uv * res - focal_px) / res.y;

    if p.auto_center_repulsion > 0.0 {
        let dist = uv.length();
        uv += uv.normalize() * (p.auto_center_repulsion / (dist + 0.1)) * 0.05;
    } else if p.mouse_repulsion {
        let mouse_uv = (p.mouse * res - focal_px) / res.y;
        let away = uv - mouse_uv;
        let dist = away.length();
        uv += away.normalize() * (p.repulsion_strength / (dist + 0.1)) * 0.05 * p.mouse_active;
    } else {
        uv += (p.mouse - 0.5) * 0.1 * p.mouse_active;
    }

    let angle = p.time * p.rotation_speed;
    let (sa, ca) = angle.sin_cos();
    uv = uv.transform(Vec2::new(ca, -sa), Vec2::new(sa, ca));
    let [rc, rs] = p.rotation;
    uv.transform(Vec2::new(rc, -rs), Vec2::new(rs, rc))
}

/// Evaluate one pixel, returning straight (non-premultiplied) RGBA
pub fn sample(p: &StarfieldParams, frag_uv: Vec2) -> [f32; 4] {
    let uv = sampling_coordinate(p, frag_uv);

    let mut col = [0.0f32; 3];
    for layer in 0..LAYER_COUNT {
        let i = layer as f32 / LAYER_COUNT as f32;
        let depth = fract(i + p.star_speed * p.speed);
        let scale = mix(20.0 * p.density, 0.5 * p.density, depth);
        let fade = layer_fade(depth);
        let offset = Vec2::new(i * LAYER_OFFSET, i * LAYER_OFFSET);
        let layer_col = star_layer(p, uv * scale + offset);
        for (c, l) in col.iter_mut().zip(layer_col) {
            *c += l * fade;
        }
    }

    let alpha = if p.transparent {
        let len = (col[0] * col[0] + col[1] * col[1] + col[2] * col[2]).sqrt();
        smooth_step(0.0, 0.3, len).min(1.0)
    } else {
        1.0
    };
    [col[0], col[1], col[2], alpha]
}

/// Rasterize a whole frame into 8-bit RGBA rows, top row first
pub fn render_rgba(p: &StarfieldParams, width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(width as usize * height as usize * 4);
    for row in 0..height {
        // uv origin is bottom-left
        let v = 1.0 - (row as f32 + 0.5) / height as f32;
        for column in 0..width {
            let u = (column as f32 + 0.5) / width as f32;
            let px = sample(p, Vec2::new(u, v));
            out.extend(px.iter().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(config: &GalaxyConfig) -> StarfieldParams {
        let mut motion = MotionState::new();
        motion.tick(1.25, config);
        StarfieldParams::from_frame(config, &motion, &SurfaceSize::new(320.0, 180.0, 1.0))
    }

    #[test]
    fn test_layer_fade_zero_at_boundaries() {
        assert_eq!(layer_fade(0.0), 0.0);
        assert_eq!(layer_fade(1.0), 0.0);
        assert!(layer_fade(0.5) > 0.4);
    }

    #[test]
    fn test_star_intensity_radial_cut() {
        assert_eq!(star_intensity(Vec2::new(1.0, 0.0), 1.0, 1.0), 0.0);
        assert_eq!(star_intensity(Vec2::new(0.8, 0.9), 1.0, 1.0), 0.0);
        let near = star_intensity(Vec2::new(0.05, 0.07), 0.0, 0.5);
        let far = star_intensity(Vec2::new(0.3, 0.4), 0.0, 0.5);
        assert!(near > far);
    }

    #[test]
    fn test_star_intensity_center_finite() {
        let m = star_intensity(Vec2::ZERO, 1.0, 0.5);
        assert!(m.is_finite());
    }

    #[test]
    fn test_no_glow_is_transparent_black() {
        let config = GalaxyConfig { glow_intensity: 0.0, ..Default::default() };
        let px = sample(&params(&config), Vec2::new(0.3, 0.6));
        assert_eq!(px, [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_opaque_alpha() {
        let config = GalaxyConfig { transparent: false, ..Default::default() };
        let p = params(&config);
        for uv in [Vec2::new(0.1, 0.1), Vec2::new(0.5, 0.5), Vec2::new(0.9, 0.2)] {
            assert_eq!(sample(&p, uv)[3], 1.0);
        }
    }

    #[test]
    fn test_hue_shift_full_turn_identical() {
        let a = params(&GalaxyConfig { hue_shift: 0.0, ..Default::default() });
        let b = params(&GalaxyConfig { hue_shift: 360.0, ..Default::default() });
        for uv in [Vec2::new(0.2, 0.7), Vec2::new(0.55, 0.45)] {
            let pa = sample(&a, uv);
            let pb = sample(&b, uv);
            for (x, y) in pa.iter().zip(pb.iter()) {
                assert_eq!(x.to_bits(), y.to_bits());
            }
        }
    }

    #[test]
    fn test_auto_center_repulsion_overrides_pointer() {
        let config = GalaxyConfig { auto_center_repulsion: 1.0, ..Default::default() };
        let mut still = params(&config);
        let mut pointed = still;
        still.mouse_active = 0.0;
        pointed.mouse_active = 1.0;
        pointed.mouse = Vec2::new(0.9, 0.1);
        let uv = Vec2::new(0.3, 0.6);
        assert_eq!(sampling_coordinate(&still, uv), sampling_coordinate(&pointed, uv));
    }

    #[test]
    fn test_passive_pointer_offset() {
        let config = GalaxyConfig { mouse_repulsion: false, rotation_speed: 0.0, ..Default::default() };
        let mut p = params(&config);
        let center = Vec2::new(0.5, 0.5);
        let base = sampling_coordinate(&p, center);
        p.mouse = Vec2::new(1.0, 0.5);
        p.mouse_active = 1.0;
        let moved = sampling_coordinate(&p, center);
        assert!((moved.x - base.x - 0.05).abs() < 0.001);
        assert!((moved.y - base.y).abs() < 0.001);
    }

    #[test]
    fn test_pointer_repulsion_pushes_away() {
        let config = GalaxyConfig { rotation_speed: 0.0, ..Default::default() };
        let mut p = params(&config);
        let center = Vec2::new(0.5, 0.5);
        p.mouse_active = 0.0;
        let base = sampling_coordinate(&p, center);

        // Pointer a quarter width to the right of the sample
        p.mouse = Vec2::new(0.75, 0.5);
        p.mouse_active = 1.0;
        let full = sampling_coordinate(&p, center) - base;

        let d = 0.25 * p.resolution[0] / p.resolution[1];
        let expected = p.repulsion_strength / (d + 0.1) * 0.05;
        assert!(full.x < 0.0, "displacement should point away from the pointer");
        assert!((full.x + expected).abs() < 0.001);
        assert!(full.y.abs() < 0.001);

        p.mouse_active = 0.5;
        let half = sampling_coordinate(&p, center) - base;
        assert!((half.x - full.x * 0.5).abs() < 0.001);
        assert!(half.y.abs() < 0.001);
    }

    #[test]
    fn test_inactive_pointer_has_no_effect() {
        let config = GalaxyConfig::default();
        let mut p = params(&config);
        p.mouse_active = 0.0;
        let uv = Vec2::new(0.25, 0.75);
        let before = sampling_coordinate(&p, uv);
        p.mouse = Vec2::new(0.1, 0.9);
        assert_eq!(before, sampling_coordinate(&p, uv));
    }

    #[test]
    fn test_render_rgba_size() {
        let p = params(&GalaxyConfig::default());
        let pixels = render_rgba(&p, 8, 4);
        assert_eq!(pixels.len(), 8 * 4 * 4);
    }
}
