//! Time and pointer motion state
//!
//! Raw pointer samples arrive from event handlers; the smoothed values only
//! move on [`MotionState::tick`], so distortion ramps in and out instead of
//! jump-cutting when the pointer enters or leaves the surface.

use crate::config::GalaxyConfig;
use crate::math::Vec2;
use crate::NOMINAL_FRAME_SECONDS;

/// Fraction of the remaining distance covered per nominal (1/60 s) frame
pub const POINTER_SMOOTHING: f32 = 0.05;

/// Frame-rate independent smoothing factor for a frame of `delta` seconds
///
/// Equivalent to applying [`POINTER_SMOOTHING`] once per nominal frame.
/// Always within [0, 1).
pub fn smoothing_factor(delta: f32) -> f32 {
    if delta.is_nan() || delta <= 0.0 {
        return 0.0;
    }
    let frames = delta / NOMINAL_FRAME_SECONDS;
    (1.0 - (1.0 - POINTER_SMOOTHING).powf(frames)).clamp(0.0, 1.0)
}

/// Move `current` toward `target` by `factor`, never leaving the interval between them
#[inline]
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    let next = current + (target - current) * factor;
    next.clamp(current.min(target), current.max(target))
}

/// Mutable per-frame simulation state owned by the engine
#[derive(Clone, Debug, PartialEq)]
pub struct MotionState {
    /// Seconds since the first rendered frame
    pub elapsed: f32,
    /// Time-driven phase feeding depth cycling and flares
    pub star_speed_phase: f32,
    /// Latest raw pointer sample, normalized with y up
    pub pointer: Vec2,
    /// Raw pointer activity target (0 outside the surface, 1 inside)
    pub pointer_active: f32,
    pub smoothed_pointer: Vec2,
    pub smoothed_active: f32,
}

impl Default for MotionState {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionState {
    /// Create motion state with the pointer parked at the center and inactive
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            star_speed_phase: 0.0,
            pointer: Vec2::CENTER,
            pointer_active: 0.0,
            smoothed_pointer: Vec2::CENTER,
            smoothed_active: 0.0,
        }
    }

    /// Record a pointer sample in normalized surface coordinates
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.pointer = Vec2::new(x, y).saturate();
        self.pointer_active = 1.0;
    }

    /// The pointer left the surface
    pub fn on_pointer_leave(&mut self) {
        self.pointer_active = 0.0;
    }

    /// Advance time by `delta` seconds and smooth toward the latest sample
    pub fn tick(&mut self, delta: f32, config: &GalaxyConfig) {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.elapsed += delta;
        self.star_speed_phase = self.elapsed * config.star_speed / 10.0;
        self.smooth(smoothing_factor(delta));
    }

    /// Apply one smoothing step with an explicit factor in [0, 1]
    pub fn smooth(&mut self, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        self.smoothed_pointer = Vec2::new(
            approach(self.smoothed_pointer.x, self.pointer.x, factor),
            approach(self.smoothed_pointer.y, self.pointer.y, factor),
        );
        self.smoothed_active = approach(self.smoothed_active, self.pointer_active, factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothing_factor_nominal_frame() {
        let f = smoothing_factor(NOMINAL_FRAME_SECONDS);
        assert!((f - POINTER_SMOOTHING).abs() < 1e-4);
    }

    #[test]
    fn test_smoothing_factor_frame_rate_independent() {
        // Two half frames cover the same distance as one full frame
        let mut a = MotionState::new();
        let mut b = MotionState::new();
        a.on_pointer_move(1.0, 1.0);
        b.on_pointer_move(1.0, 1.0);
        let config = GalaxyConfig::default();

        a.tick(NOMINAL_FRAME_SECONDS, &config);
        b.tick(NOMINAL_FRAME_SECONDS / 2.0, &config);
        b.tick(NOMINAL_FRAME_SECONDS / 2.0, &config);

        assert!((a.smoothed_pointer.x - b.smoothed_pointer.x).abs() < 1e-4);
        assert!((a.smoothed_active - b.smoothed_active).abs() < 1e-4);
    }

    #[test]
    fn test_smoothing_factor_degenerate_delta() {
        assert_eq!(smoothing_factor(0.0), 0.0);
        assert_eq!(smoothing_factor(-1.0), 0.0);
        assert_eq!(smoothing_factor(f32::NAN), 0.0);
        assert!(smoothing_factor(1000.0) <= 1.0);
    }

    #[test]
    fn test_tick_advances_time_and_phase() {
        let config = GalaxyConfig::default();
        let mut m = MotionState::new();
        m.tick(2.0, &config);
        assert!((m.elapsed - 2.0).abs() < 0.001);
        // elapsed * starSpeed / 10
        assert!((m.star_speed_phase - 0.1).abs() < 0.001);
    }

    #[test]
    fn test_active_factor_stays_zero_without_pointer() {
        let config = GalaxyConfig::default();
        let mut m = MotionState::new();
        m.tick(NOMINAL_FRAME_SECONDS, &config);
        assert_eq!(m.smoothed_active, 0.0);
    }

    #[test]
    fn test_pointer_converges_to_center() {
        let config = GalaxyConfig::default();
        let mut m = MotionState::new();
        m.on_pointer_move(0.5, 0.5);
        for _ in 0..50 {
            m.tick(NOMINAL_FRAME_SECONDS, &config);
        }
        assert!(m.smoothed_pointer.distance(Vec2::new(0.5, 0.5)) < 1e-3);
    }

    #[test]
    fn test_pointer_converges_from_far_sample() {
        let config = GalaxyConfig::default();
        let mut m = MotionState::new();
        m.on_pointer_move(0.9, 0.1);
        for _ in 0..300 {
            m.tick(NOMINAL_FRAME_SECONDS, &config);
        }
        assert!(m.smoothed_pointer.distance(Vec2::new(0.9, 0.1)) < 1e-3);
        assert!((m.smoothed_active - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_active_factor_fades_out_after_leave() {
        let config = GalaxyConfig::default();
        let mut m = MotionState::new();
        m.on_pointer_move(0.2, 0.8);
        for _ in 0..120 {
            m.tick(NOMINAL_FRAME_SECONDS, &config);
        }
        let engaged = m.smoothed_active;
        m.on_pointer_leave();
        m.tick(NOMINAL_FRAME_SECONDS, &config);
        // Ramps down rather than snapping to zero
        assert!(m.smoothed_active < engaged);
        assert!(m.smoothed_active > 0.5);
    }

    #[test]
    fn test_pointer_sample_clamped() {
        let mut m = MotionState::new();
        m.on_pointer_move(1.5, -0.2);
        assert_eq!(m.pointer, Vec2::new(1.0, 0.0));
        m.on_pointer_move(f32::NAN, 0.3);
        assert_eq!(m.pointer, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_approach_never_overshoots() {
        let up = approach(0.1, 0.3, 1.0);
        assert!(up >= 0.1 && up <= 0.3);
        let down = approach(0.3, 0.1, 1.0);
        assert!(down >= 0.1 && down <= 0.3);
        assert_eq!(approach(0.2, 0.2, 0.5), 0.2);
    }
}
