/// Pass-through vertex shader for the full-screen quad
///
/// Consumes the `position` (clip space) and `uv` attributes by name.
pub const STARFIELD_VERTEX: &str = r#"
struct VertexOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@location(0) position: vec2<f32>, @location(1) uv: vec2<f32>) -> VertexOut {
    var out: VertexOut;
    out.clip_position = vec4<f32>(position, 0.0, 1.0);
    out.uv = uv;
    return out;
}
"#;
