//! Color helpers
//!
//! Colors are authored the way web palettes are written (hex triplets, HSL,
//! 8-bit RGBA) and converted once into the `[f32; 4]` form the shaders take.

/// Straight-alpha RGBA, components in 0..=1
pub type Rgba = [f32; 4];

/// `0xRRGGBB` to an opaque color
pub fn hex(rgb: u32) -> Rgba {
    let [r, g, b] = hex_rgb(rgb);
    [r, g, b, 1.0]
}

/// `0xRRGGBB` to its three channels
pub fn hex_rgb(rgb: u32) -> [f32; 3] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    ]
}

/// 8-bit channels plus a 0..=1 alpha
pub fn rgba(r: u8, g: u8, b: u8, a: f32) -> Rgba {
    [
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        a.clamp(0.0, 1.0),
    ]
}

/// Hue in degrees, saturation and lightness as fractions
pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Rgba {
    hsla(hue, saturation, lightness, 1.0)
}

pub fn hsla(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Rgba {
    let h = hue.rem_euclid(360.0) / 60.0;
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = l - chroma * 0.5;
    [r + m, g + m, b + m, alpha.clamp(0.0, 1.0)]
}

/// Same color with a different alpha
pub fn with_alpha(color: Rgba, alpha: f32) -> Rgba {
    [color[0], color[1], color[2], alpha.clamp(0.0, 1.0)]
}

/// Per-channel linear blend, `t` clamped to 0..=1
pub fn lerp_rgb(from: [f32; 3], to: [f32; 3], t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    [
        from[0] + (to[0] - from[0]) * t,
        from[1] + (to[1] - from[1]) * t,
        from[2] + (to[2] - from[2]) * t,
    ]
}
