//! Render configuration supplied by the page at construction

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::GalaxyError;

/// Available renderer fidelity tiers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Layered procedural star field evaluated per pixel on the GPU
    #[default]
    Shader,
    /// Simulated particle stars drawn with a 2D canvas
    Particles,
}

impl StrategyKind {
    /// Get all available strategies
    pub fn all() -> &'static [StrategyKind] {
        &[StrategyKind::Shader, StrategyKind::Particles]
    }

    /// Get the display name for this strategy
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Shader => "Procedural Shader",
            StrategyKind::Particles => "Canvas Particles",
        }
    }

    /// Parse from string ID (e.g., "shader", "particles")
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "shader" => Some(StrategyKind::Shader),
            "particles" => Some(StrategyKind::Particles),
            _ => None,
        }
    }

    /// Get the string ID for this strategy
    pub fn id(&self) -> &'static str {
        match self {
            StrategyKind::Shader => "shader",
            StrategyKind::Particles => "particles",
        }
    }
}

/// Immutable per-instance render configuration
///
/// Every field is optional in JSON; missing fields take the defaults below.
/// An explicit zero is honoured, it does not fall back to the default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalaxyConfig {
    /// Pointer repels the sampling coordinate instead of a passive parallax offset
    pub mouse_repulsion: bool,
    /// Install pointer listeners at all
    pub mouse_interaction: bool,
    /// Lattice scale multiplier; higher means more, smaller stars
    pub density: f32,
    pub glow_intensity: f32,
    pub saturation: f32,
    /// Base hue rotation in degrees
    pub hue_shift: f32,
    pub twinkle_intensity: f32,
    /// Whole-field auto-rotation in radians per second
    pub rotation_speed: f32,
    /// Time dilation for drift, twinkle and depth cycling
    pub speed: f32,
    pub repulsion_strength: f32,
    /// Alpha follows star brightness instead of an opaque surface
    pub transparent: bool,
    /// Rate of the star-speed phase
    pub star_speed: f32,
    /// Focal point in normalized surface coordinates
    pub focal: [f32; 2],
    /// Static field rotation in degrees
    pub rotation: f32,
    /// Repulsion away from the field center; overrides pointer distortion when > 0
    pub auto_center_repulsion: f32,
    /// Upper bound on the device pixel ratio used for the backing store
    pub max_pixel_ratio: f32,
    pub strategy: StrategyKind,
    /// Seed for the particle strategy's star placement
    pub seed: u64,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            mouse_repulsion: true,
            mouse_interaction: true,
            density: 1.5,
            glow_intensity: 0.5,
            saturation: 0.8,
            hue_shift: 240.0,
            twinkle_intensity: 0.5,
            rotation_speed: 0.2,
            speed: 1.0,
            repulsion_strength: 2.0,
            transparent: true,
            star_speed: 0.5,
            focal: [0.5, 0.5],
            rotation: 0.0,
            auto_center_repulsion: 0.0,
            max_pixel_ratio: 1.0,
            strategy: StrategyKind::Shader,
            seed: 0x5EED,
        }
    }
}

impl GalaxyConfig {
    /// Parse a JSON options object and sanitize it
    pub fn from_json(json: &str) -> Result<Self, GalaxyError> {
        let config: GalaxyConfig =
            serde_json::from_str(json).map_err(|e| GalaxyError::InvalidConfig(e.to_string()))?;
        Ok(config.sanitized())
    }

    /// Clamp every numeric field into its documented range
    ///
    /// Non-finite values are replaced with the default. Each adjustment is
    /// logged once at warn level.
    pub fn sanitized(mut self) -> Self {
        let d = GalaxyConfig::default();

        self.density = fix("density", self.density, d.density, |v| v > 0.0, |_| d.density);
        self.glow_intensity = fix("glowIntensity", self.glow_intensity, d.glow_intensity, |v| v >= 0.0, |_| 0.0);
        self.saturation = fix("saturation", self.saturation, d.saturation, |v| (0.0..=1.0).contains(&v), |v| v.clamp(0.0, 1.0));
        self.hue_shift = fix("hueShift", self.hue_shift, d.hue_shift, |_| true, |v| v);
        self.twinkle_intensity = fix(
            "twinkleIntensity",
            self.twinkle_intensity,
            d.twinkle_intensity,
            |v| (0.0..=1.0).contains(&v),
            |v| v.clamp(0.0, 1.0),
        );
        self.rotation_speed = fix("rotationSpeed", self.rotation_speed, d.rotation_speed, |_| true, |v| v);
        self.speed = fix("speed", self.speed, d.speed, |_| true, |v| v);
        self.repulsion_strength = fix("repulsionStrength", self.repulsion_strength, d.repulsion_strength, |v| v >= 0.0, |_| 0.0);
        self.star_speed = fix("starSpeed", self.star_speed, d.star_speed, |_| true, |v| v);
        self.rotation = fix("rotation", self.rotation, d.rotation, |_| true, |v| v);
        self.auto_center_repulsion = fix(
            "autoCenterRepulsion",
            self.auto_center_repulsion,
            d.auto_center_repulsion,
            |v| v >= 0.0,
            |_| 0.0,
        );
        self.max_pixel_ratio = fix("maxPixelRatio", self.max_pixel_ratio, d.max_pixel_ratio, |v| v >= 1.0, |_| 1.0);
        self.focal = [
            fix("focal.x", self.focal[0], d.focal[0], |_| true, |v| v),
            fix("focal.y", self.focal[1], d.focal[1], |_| true, |v| v),
        ];
        self
    }

    /// Hue shift as a fraction of a full turn in [0, 1)
    ///
    /// 0 and 360 degrees map to the same bit pattern.
    pub fn hue_shift_turns(&self) -> f32 {
        let turns = self.hue_shift.rem_euclid(360.0) / 360.0;
        if turns >= 1.0 {
            0.0
        } else {
            turns
        }
    }

    /// Static rotation as `[cos, sin]`
    pub fn rotation_vector(&self) -> [f32; 2] {
        let radians = self.rotation.to_radians();
        [radians.cos(), radians.sin()]
    }
}

fn fix(
    name: &str,
    value: f32,
    default: f32,
    valid: impl Fn(f32) -> bool,
    clamp: impl Fn(f32) -> f32,
) -> f32 {
    if !value.is_finite() {
        warn!(option = name, "non-finite value replaced with default {}", default);
        return default;
    }
    if valid(value) {
        return value;
    }
    let fixed = clamp(value);
    warn!(option = name, "value {} out of range, using {}", value, fixed);
    fixed
}
