//! Particle simulation for the 2D canvas tier
//!
//! A cheaper stand-in for the shader field: a few hundred drifting points
//! with a glow halo, wrapped at the surface edges. Positions are in device
//! pixels so the canvas can draw them directly.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::config::GalaxyConfig;
use crate::math::{SurfaceSize, Vec2};
use crate::starfield::hsv_to_rgb;
use crate::NOMINAL_FRAME_SECONDS;

/// Stars per unit of density
pub const STARS_PER_DENSITY: f32 = 200.0;

/// Upper bound on the population, whatever the density
pub const MAX_PARTICLES: usize = 10_000;

/// Pointer repulsion radius in CSS pixels
pub const REPULSION_RADIUS: f32 = 100.0;

/// Twinkle phase advance per nominal frame
const TWINKLE_STEP: f32 = 0.05;

/// One simulated star
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    /// Pixels per nominal frame
    pub velocity: Vec2,
    pub size: f32,
    pub brightness: f32,
    /// Hue in turns
    pub hue: f32,
    pub twinkle_phase: f32,
}

impl Particle {
    /// Current twinkle multiplier in [0.4, 1]
    pub fn twinkle(&self) -> f32 {
        self.twinkle_phase.sin() * 0.3 + 0.7
    }

    /// RGB in [0, 1] at the current twinkle
    pub fn color(&self, saturation: f32) -> [f32; 3] {
        hsv_to_rgb(self.hue, saturation, self.brightness * self.twinkle())
    }
}

/// Population for `density`, capped at [`MAX_PARTICLES`]
pub fn particle_count(density: f32) -> usize {
    let wanted = (STARS_PER_DENSITY * density).floor();
    if !wanted.is_finite() || wanted > MAX_PARTICLES as f32 {
        warn!(density, max = MAX_PARTICLES, "particle count capped");
        return MAX_PARTICLES;
    }
    wanted.max(0.0) as usize
}

/// Seeded field of particles sized to a surface
#[derive(Clone, Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f32,
    height: f32,
    pixel_ratio: f32,
    rng: SmallRng,
    density: f32,
    hue_shift: f32,
}

impl ParticleField {
    pub fn new(config: &GalaxyConfig, surface: &SurfaceSize) -> Self {
        let mut field = Self {
            particles: Vec::new(),
            width: 1.0,
            height: 1.0,
            pixel_ratio: 1.0,
            rng: SmallRng::seed_from_u64(config.seed),
            density: config.density,
            hue_shift: config.hue_shift,
        };
        field.reseed(surface);
        field
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Surface size in device pixels
    pub fn bounds(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Scatter a fresh population over `surface`
    pub fn reseed(&mut self, surface: &SurfaceSize) {
        self.width = surface.width() as f32;
        self.height = surface.height() as f32;
        self.pixel_ratio = surface.pixel_ratio;

        let count = particle_count(self.density);
        let (width, height, hue_shift) = (self.width, self.height, self.hue_shift);
        let rng = &mut self.rng;
        self.particles = (0..count)
            .map(|_| Particle {
                position: Vec2::new(rng.gen::<f32>() * width, rng.gen::<f32>() * height),
                velocity: Vec2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5) * 0.5,
                size: rng.gen::<f32>() * 2.0 + 0.5,
                brightness: rng.gen::<f32>() * 0.5 + 0.5,
                hue: (rng.gen::<f32>() * 60.0 + hue_shift) / 360.0,
                twinkle_phase: rng.gen::<f32>() * std::f32::consts::TAU,
            })
            .collect();
        debug!(count, width, height, "particle field seeded");
    }

    /// Advance by `delta` seconds
    ///
    /// `pointer` is in device pixels; `push` scales the repulsion (the
    /// smoothed pointer-active factor, or 0 to disable).
    pub fn step(&mut self, delta: f32, pointer: Option<Vec2>, push: f32) {
        let frames = if delta.is_finite() { delta.max(0.0) / NOMINAL_FRAME_SECONDS } else { 0.0 };
        let radius = REPULSION_RADIUS * self.pixel_ratio;
        let (width, height) = (self.width, self.height);

        for p in &mut self.particles {
            p.position += p.velocity * frames;
            p.twinkle_phase = (p.twinkle_phase + TWINKLE_STEP * frames) % std::f32::consts::TAU;

            if let Some(pointer) = pointer {
                let away = p.position - pointer;
                let distance = away.length();
                if distance < radius && push > 0.0 {
                    let force = (radius - distance) / radius;
                    p.position += away.normalize() * force * 2.0 * push * frames;
                }
            }

            p.position = Vec2::new(wrap(p.position.x, width), wrap(p.position.y, height));
        }
    }
}

/// Wrap a coordinate onto `[0, extent)`
fn wrap(v: f32, extent: f32) -> f32 {
    if extent <= 0.0 || !v.is_finite() {
        return 0.0;
    }
    let w = v.rem_euclid(extent);
    if w >= extent {
        0.0
    } else {
        w
    }
}
