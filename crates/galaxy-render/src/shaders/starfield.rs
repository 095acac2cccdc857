/// Layered procedural star field
///
/// Four depth layers of a hashed unit lattice, each cell holding one star
/// with seed-derived size, tint, flare and wander. Pointer distortion and
/// auto-rotation are applied to the sampling coordinate first.
/// `hue_shift` is in turns, already wrapped into [0, 1) by the host.
pub const STARFIELD_FRAGMENT: &str = r#"
struct GalaxyUniforms {
    resolution: vec3<f32>,
    time: f32,
    focal: vec2<f32>,
    rotation: vec2<f32>,
    mouse: vec2<f32>,
    star_speed: f32,
    density: f32,
    hue_shift: f32,
    speed: f32,
    glow_intensity: f32,
    saturation: f32,
    twinkle_intensity: f32,
    rotation_speed: f32,
    repulsion_strength: f32,
    mouse_active_factor: f32,
    auto_center_repulsion: f32,
    mouse_repulsion: u32,
    transparent: u32,
};

struct FragmentIn {
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0) var<uniform> u: GalaxyUniforms;

const NUM_LAYER: f32 = 4.0;
const STAR_COLOR_CUTOFF: f32 = 0.2;
const PERIOD: f32 = 3.0;

fn hash21(cell: vec2<f32>) -> f32 {
    var p = fract(cell * vec2<f32>(123.34, 456.21));
    p = p + vec2<f32>(dot(p, p + vec2<f32>(45.32)));
    return fract(p.x * p.y);
}

fn tri(x: f32) -> f32 {
    return abs(fract(x) * 2.0 - 1.0);
}

fn tris(x: f32) -> f32 {
    let t = fract(x);
    return 1.0 - smoothstep(0.0, 1.0, abs(2.0 * t - 1.0));
}

fn trisn(x: f32) -> f32 {
    let t = fract(x);
    return 2.0 * (1.0 - smoothstep(0.0, 1.0, abs(2.0 * t - 1.0))) - 1.0;
}

fn hsv2rgb(c: vec3<f32>) -> vec3<f32> {
    let k = vec4<f32>(1.0, 2.0 / 3.0, 1.0 / 3.0, 3.0);
    let p = abs(fract(c.xxx + k.xyz) * 6.0 - k.www);
    return c.z * mix(k.xxx, clamp(p - k.xxx, vec3<f32>(0.0), vec3<f32>(1.0)), c.y);
}

fn safe_normalize(v: vec2<f32>) -> vec2<f32> {
    let len = length(v);
    if (len > 0.0) {
        return v / len;
    }
    return vec2<f32>(0.0);
}

fn rotate45(v: vec2<f32>) -> vec2<f32> {
    return vec2<f32>(0.7071 * (v.x - v.y), 0.7071 * (v.x + v.y));
}

fn recolor(base: vec3<f32>) -> vec3<f32> {
    var hue = atan2(base.g - base.r, base.b - base.r) / (2.0 * 3.14159) + 0.5;
    hue = fract(hue + u.hue_shift);
    let luma = dot(base, vec3<f32>(0.299, 0.587, 0.114));
    let sat = length(base - vec3<f32>(luma)) * u.saturation;
    let val = max(max(base.r, base.g), base.b);
    return hsv2rgb(vec3<f32>(hue, sat, val));
}

fn star(uv: vec2<f32>, flare: f32) -> f32 {
    let d = max(length(uv), 0.0001);
    var m = (0.05 * u.glow_intensity) / d;
    var rays = smoothstep(0.0, 1.0, 1.0 - abs(uv.x * uv.y * 1000.0));
    m += rays * flare * u.glow_intensity;
    let diag = rotate45(uv);
    rays = smoothstep(0.0, 1.0, 1.0 - abs(diag.x * diag.y * 1000.0));
    m += rays * 0.3 * flare * u.glow_intensity;
    m *= 1.0 - smoothstep(0.2, 1.0, d);
    return m;
}

fn star_layer(uv: vec2<f32>) -> vec3<f32> {
    var col = vec3<f32>(0.0);
    let gv = fract(uv) - 0.5;
    let id = floor(uv);

    for (var y: i32 = -1; y <= 1; y += 1) {
        for (var x: i32 = -1; x <= 1; x += 1) {
            let offset = vec2<f32>(f32(x), f32(y));
            let si = id + offset;
            let seed = hash21(si);
            let size = fract(seed * 345.32);
            let gloss = tri(u.star_speed / (PERIOD * seed + 1.0));
            let flare_size = smoothstep(0.9, 1.0, size) * gloss;

            let red = smoothstep(STAR_COLOR_CUTOFF, 1.0, hash21(si + 1.0)) + STAR_COLOR_CUTOFF;
            let blu = smoothstep(STAR_COLOR_CUTOFF, 1.0, hash21(si + 3.0)) + STAR_COLOR_CUTOFF;
            let grn = min(red, blu) * seed;
            let tint = recolor(vec3<f32>(red, grn, blu));

            let pad = vec2<f32>(
                tris(seed * 34.0 + u.time * u.speed / 10.0),
                tris(seed * 38.0 + u.time * u.speed / 30.0)
            ) - 0.5;

            var intensity = star(gv - offset - pad, flare_size);
            var twinkle = trisn(u.time * u.speed + seed * 6.2831) * 0.5 + 1.0;
            twinkle = mix(1.0, twinkle, u.twinkle_intensity);
            intensity *= twinkle;

            col += intensity * size * tint;
        }
    }

    return col;
}

@fragment
fn fs_main(in: FragmentIn) -> @location(0) vec4<f32> {
    let res = u.resolution.xy;
    let focal_px = u.focal * res;
    var uv = (in.uv * res - focal_px) / res.y;

    if (u.auto_center_repulsion > 0.0) {
        let center_dist = length(uv);
        let repulsion = safe_normalize(uv) * (u.auto_center_repulsion / (center_dist + 0.1));
        uv += repulsion * 0.05;
    } else if (u.mouse_repulsion != 0u) {
        let mouse_uv = (u.mouse * res - focal_px) / res.y;
        let mouse_dist = length(uv - mouse_uv);
        let repulsion = safe_normalize(uv - mouse_uv) * (u.repulsion_strength / (mouse_dist + 0.1));
        uv += repulsion * 0.05 * u.mouse_active_factor;
    } else {
        uv += (u.mouse - vec2<f32>(0.5)) * 0.1 * u.mouse_active_factor;
    }

    let angle = u.time * u.rotation_speed;
    let ca = cos(angle);
    let sa = sin(angle);
    uv = mat2x2<f32>(vec2<f32>(ca, -sa), vec2<f32>(sa, ca)) * uv;
    uv = mat2x2<f32>(vec2<f32>(u.rotation.x, -u.rotation.y), vec2<f32>(u.rotation.y, u.rotation.x)) * uv;

    var col = vec3<f32>(0.0);
    for (var layer: i32 = 0; layer < 4; layer += 1) {
        let i = f32(layer) / NUM_LAYER;
        let depth = fract(i + u.star_speed * u.speed);
        let scale = mix(20.0 * u.density, 0.5 * u.density, depth);
        let fade = depth * (1.0 - smoothstep(0.9, 1.0, depth));
        col += star_layer(uv * scale + i * 453.32) * fade;
    }

    if (u.transparent != 0u) {
        let alpha = min(smoothstep(0.0, 0.3, length(col)), 1.0);
        return vec4<f32>(col, alpha);
    }
    return vec4<f32>(col, 1.0);
}
"#;
