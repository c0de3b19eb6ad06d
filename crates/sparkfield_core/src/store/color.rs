//! Luma-chroma particle colors.
//!
//! Colors are drawn in YIQ space: fixed luma, random hue angle, random
//! chroma. The fixed YIQ -> RGB matrix brings them into linear RGB.

/// Row-major YIQ -> RGB transform (NTSC 1953 coefficients).
pub const YIQ_TO_RGB: [[f32; 3]; 3] = [
    [1.0, 0.956, 0.621],
    [1.0, -0.272, -0.647],
    [1.0, -1.106, 1.703],
];

/// Converts a `[y, i, q]` triple to RGB, clamped to `[0, 1]` per channel.
#[inline]
#[must_use]
pub fn yiq_to_rgb(yiq: [f32; 3]) -> [f32; 3] {
    let mut rgb = [0.0; 3];
    for (out, row) in rgb.iter_mut().zip(YIQ_TO_RGB.iter()) {
        let value = row[0] * yiq[0] + row[1] * yiq[1] + row[2] * yiq[2];
        *out = value.clamp(0.0, 1.0);
    }
    rgb
}

/// Builds an RGBA color from luma, hue angle (radians) and chroma.
#[inline]
#[must_use]
pub fn particle_color(luma: f32, hue: f32, chroma: f32, alpha: f32) -> [f32; 4] {
    let (sin, cos) = hue.sin_cos();
    let [r, g, b] = yiq_to_rgb([luma, chroma * cos, chroma * sin]);
    [r, g, b, alpha]
}
