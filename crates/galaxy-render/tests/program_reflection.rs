//! Integration tests for the built-in star-field program
//!
//! These tests verify that the shader, the uniform bridge and the CPU
//! reference agree with each other:
//! - Every uniform the bridge pushes is declared by the shader
//! - The staged block decodes back to the inputs of the CPU reference
//! - The quad binds to the program's attribute slots

use galaxy_render::program::{QUAD_POSITIONS, QUAD_UVS};
use galaxy_render::shaders::{STARFIELD_FRAGMENT, STARFIELD_VERTEX};
use galaxy_render::starfield::{sample, StarfieldParams};
use galaxy_render::{
    bind_geometry, compile, GalaxyConfig, MotionState, SurfaceSize, UniformBridge, UniformValue, Vec2,
};

const PUSHED: [&str; 18] = [
    "time",
    "star_speed",
    "speed",
    "mouse",
    "mouse_active_factor",
    "density",
    "hue_shift",
    "saturation",
    "glow_intensity",
    "twinkle_intensity",
    "rotation_speed",
    "repulsion_strength",
    "auto_center_repulsion",
    "focal",
    "rotation",
    "mouse_repulsion",
    "transparent",
    "resolution",
];

fn f32_of(value: Option<UniformValue>) -> f32 {
    match value {
        Some(UniformValue::F32(v)) => v,
        other => panic!("expected f32 uniform, got {other:?}"),
    }
}

fn vec2_of(value: Option<UniformValue>) -> Vec2 {
    match value {
        Some(UniformValue::Vec2(v)) => v.into(),
        other => panic!("expected vec2 uniform, got {other:?}"),
    }
}

/// Rebuild the CPU reference inputs from the staged bytes alone
fn params_from_block(bridge: &UniformBridge) -> StarfieldParams {
    let b = bridge.block();
    let resolution = match b.get("resolution") {
        Some(UniformValue::Vec3(v)) => v,
        other => panic!("expected vec3 resolution, got {other:?}"),
    };
    let flag = |name: &str| matches!(b.get(name), Some(UniformValue::U32(v)) if v != 0);
    let rotation = vec2_of(b.get("rotation"));
    StarfieldParams {
        resolution,
        time: f32_of(b.get("time")),
        star_speed: f32_of(b.get("star_speed")),
        speed: f32_of(b.get("speed")),
        mouse: vec2_of(b.get("mouse")),
        mouse_active: f32_of(b.get("mouse_active_factor")),
        density: f32_of(b.get("density")),
        hue_shift: f32_of(b.get("hue_shift")),
        saturation: f32_of(b.get("saturation")),
        glow_intensity: f32_of(b.get("glow_intensity")),
        twinkle_intensity: f32_of(b.get("twinkle_intensity")),
        rotation_speed: f32_of(b.get("rotation_speed")),
        repulsion_strength: f32_of(b.get("repulsion_strength")),
        auto_center_repulsion: f32_of(b.get("auto_center_repulsion")),
        focal: vec2_of(b.get("focal")),
        rotation: [rotation.x, rotation.y],
        mouse_repulsion: flag("mouse_repulsion"),
        transparent: flag("transparent"),
    }
}

// =============================================================================
// Uniform Agreement Tests
// =============================================================================

#[test]
fn test_every_pushed_uniform_is_declared() {
    let program = compile(STARFIELD_VERTEX, STARFIELD_FRAGMENT).unwrap();
    let bridge = UniformBridge::new(&program);
    for name in PUSHED {
        assert!(bridge.block().has_uniform(name), "shader does not declare '{name}'");
    }
    assert_eq!(program.uniform_layout().slots.len(), PUSHED.len());
}

#[test]
fn test_staged_block_matches_cpu_reference() {
    let program = compile(STARFIELD_VERTEX, STARFIELD_FRAGMENT).unwrap();
    let mut bridge = UniformBridge::new(&program);
    let config = GalaxyConfig {
        hue_shift: 140.0,
        rotation: 30.0,
        mouse_repulsion: false,
        ..Default::default()
    };
    let surface = SurfaceSize::new(640.0, 360.0, 1.5);
    let mut motion = MotionState::new();
    motion.on_pointer_move(0.7, 0.3);
    for _ in 0..20 {
        motion.tick(1.0 / 60.0, &config);
    }

    bridge.push_uniforms(&motion, &config, &surface);

    let direct = StarfieldParams::from_frame(&config, &motion, &surface);
    let staged = params_from_block(&bridge);
    assert_eq!(direct, staged);

    for uv in [Vec2::new(0.1, 0.9), Vec2::new(0.5, 0.5), Vec2::new(0.83, 0.27)] {
        assert_eq!(sample(&direct, uv), sample(&staged, uv));
    }
}

// =============================================================================
// Geometry Tests
// =============================================================================

#[test]
fn test_quad_binds_to_program() {
    let program = compile(STARFIELD_VERTEX, STARFIELD_FRAGMENT).unwrap();
    let bindings = bind_geometry(&program).unwrap();
    let position = bindings.iter().find(|b| b.name == "position").unwrap();
    let uv = bindings.iter().find(|b| b.name == "uv").unwrap();
    assert_eq!(*position.data, QUAD_POSITIONS);
    assert_eq!(*uv.data, QUAD_UVS);
    assert_ne!(position.location, uv.location);
}

// =============================================================================
// Rendering Tests
// =============================================================================

#[test]
fn test_reference_frame_has_visible_stars() {
    let config = GalaxyConfig::default();
    let mut motion = MotionState::new();
    motion.tick(2.0, &config);
    let params = StarfieldParams::from_frame(&config, &motion, &SurfaceSize::new(96.0, 54.0, 1.0));

    let pixels = galaxy_render::starfield::render_rgba(&params, 96, 54);
    assert_eq!(pixels.len(), 96 * 54 * 4);
    let alphas: Vec<u8> = pixels.chunks(4).map(|px| px[3]).collect();
    let brightest = alphas.iter().copied().max().unwrap_or(0);
    let dimmest = alphas.iter().copied().min().unwrap_or(0);
    assert!(brightest > 0, "expected some visible stars");
    assert!(brightest > dimmest, "expected a non-uniform frame");
}
