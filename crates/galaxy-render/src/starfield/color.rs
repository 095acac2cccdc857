//! Star tint recoloring

use super::noise::fract;

const LUMA: [f32; 3] = [0.299, 0.587, 0.114];

/// HSV (all components in [0, 1]) to RGB
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let k = [1.0, 2.0 / 3.0, 1.0 / 3.0, 3.0];
    let channel = |offset: f32| {
        let p = (fract(h + offset) * 6.0 - k[3]).abs();
        let c = (p - k[0]).clamp(0.0, 1.0);
        v * (k[0] + (c - k[0]) * s)
    };
    [channel(k[0]), channel(k[1]), channel(k[2])]
}

/// Rotate the hue of a base tint and rescale its saturation
///
/// `hue_shift` is in turns. Value is the tint's brightest channel.
pub fn recolor(base: [f32; 3], hue_shift: f32, saturation: f32) -> [f32; 3] {
    let [r, g, b] = base;
    let hue = (g - r).atan2(b - r) / (2.0 * 3.14159) + 0.5;
    let hue = fract(hue + hue_shift);

    let luma = r * LUMA[0] + g * LUMA[1] + b * LUMA[2];
    let sat = ((r - luma).powi(2) + (g - luma).powi(2) + (b - luma).powi(2)).sqrt() * saturation;
    let val = r.max(g).max(b);
    hsv_to_rgb(hue, sat, val)
}
