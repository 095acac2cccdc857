//! Pushes simulation state into the program's uniform block
//!
//! Names are the members of the fragment shader's uniform struct. A program
//! that omits one of them simply never receives it.

use crate::config::GalaxyConfig;
use crate::math::SurfaceSize;
use crate::motion::MotionState;
use crate::program::{ShaderProgram, UniformBlock, UniformValue};

/// Staging uniform block bound to one program
#[derive(Clone, Debug)]
pub struct UniformBridge {
    block: UniformBlock,
}

impl UniformBridge {
    /// Create a zeroed block from the program's reflected layout
    pub fn new(program: &ShaderProgram) -> Self {
        Self {
            block: UniformBlock::new(program.uniform_layout().clone()),
        }
    }

    pub fn block(&self) -> &UniformBlock {
        &self.block
    }

    pub fn block_mut(&mut self) -> &mut UniformBlock {
        &mut self.block
    }

    /// Write every per-frame uniform
    pub fn push_uniforms(&mut self, motion: &MotionState, config: &GalaxyConfig, surface: &SurfaceSize) {
        let b = &mut self.block;

        b.set_uniform("time", UniformValue::F32(motion.elapsed));
        b.set_uniform("star_speed", UniformValue::F32(motion.star_speed_phase));
        b.set_uniform("speed", UniformValue::F32(config.speed));
        b.set_uniform("mouse", UniformValue::Vec2(motion.smoothed_pointer.into()));
        b.set_uniform("mouse_active_factor", UniformValue::F32(motion.smoothed_active));

        b.set_uniform("density", UniformValue::F32(config.density));
        b.set_uniform("hue_shift", UniformValue::F32(config.hue_shift_turns()));
        b.set_uniform("saturation", UniformValue::F32(config.saturation));
        b.set_uniform("glow_intensity", UniformValue::F32(config.glow_intensity));
        b.set_uniform("twinkle_intensity", UniformValue::F32(config.twinkle_intensity));
        b.set_uniform("rotation_speed", UniformValue::F32(config.rotation_speed));
        b.set_uniform("repulsion_strength", UniformValue::F32(config.repulsion_strength));
        b.set_uniform("auto_center_repulsion", UniformValue::F32(config.auto_center_repulsion));
        b.set_uniform("focal", UniformValue::Vec2(config.focal));
        b.set_uniform("rotation", UniformValue::Vec2(config.rotation_vector()));
        b.set_uniform("mouse_repulsion", UniformValue::Bool(config.mouse_repulsion));
        b.set_uniform("transparent", UniformValue::Bool(config.transparent));

        self.push_resolution(surface);
    }

    /// Write only the resolution, used right after a resize
    pub fn push_resolution(&mut self, surface: &SurfaceSize) {
        self.block.set_uniform("resolution", UniformValue::Vec3(surface.resolution()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::compile;
    use crate::shaders::{STARFIELD_FRAGMENT, STARFIELD_VERTEX};

    fn bridge() -> UniformBridge {
        UniformBridge::new(&compile(STARFIELD_VERTEX, STARFIELD_FRAGMENT).unwrap())
    }

    #[test]
    fn test_push_uniforms_writes_config() {
        let mut bridge = bridge();
        let config = GalaxyConfig::default();
        bridge.push_uniforms(&MotionState::new(), &config, &SurfaceSize::new(800.0, 400.0, 1.0));

        let block = bridge.block();
        assert_eq!(block.get("density"), Some(UniformValue::F32(1.5)));
        assert_eq!(block.get("mouse"), Some(UniformValue::Vec2([0.5, 0.5])));
        assert_eq!(block.get("mouse_active_factor"), Some(UniformValue::F32(0.0)));
        assert_eq!(block.get("mouse_repulsion"), Some(UniformValue::U32(1)));
        assert_eq!(block.get("transparent"), Some(UniformValue::U32(1)));
        assert_eq!(block.get("resolution"), Some(UniformValue::Vec3([800.0, 400.0, 2.0])));
        assert_eq!(block.get("rotation"), Some(UniformValue::Vec2([1.0, 0.0])));
    }

    #[test]
    fn test_hue_shift_pushed_in_turns() {
        let mut bridge = bridge();
        let config = GalaxyConfig { hue_shift: 360.0, ..Default::default() };
        bridge.push_uniforms(&MotionState::new(), &config, &SurfaceSize::default());
        assert_eq!(bridge.block().get("hue_shift"), Some(UniformValue::F32(0.0)));
    }

    #[test]
    fn test_push_resolution_after_resize() {
        let mut bridge = bridge();
        bridge.push_resolution(&SurfaceSize::new(100.0, 50.0, 2.0));
        assert_eq!(bridge.block().get("resolution"), Some(UniformValue::Vec3([200.0, 100.0, 2.0])));
    }

    #[test]
    fn test_motion_flows_into_time() {
        let mut bridge = bridge();
        let config = GalaxyConfig::default();
        let mut motion = MotionState::new();
        motion.tick(1.0, &config);
        bridge.push_uniforms(&motion, &config, &SurfaceSize::default());
        assert_eq!(bridge.block().get("time"), Some(UniformValue::F32(1.0)));
    }
}
