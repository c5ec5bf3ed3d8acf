//! sRGB color constants and palettes

/// Black
pub const BLACK: [f32; 3] = [0.0, 0.0, 0.0];
/// Red
pub const RED: [f32; 3] = [1.0, 0.0, 0.0];
/// Green
pub const GREEN: [f32; 3] = [0.0, 1.0, 0.0];
/// Blue
pub const BLUE: [f32; 3] = [0.0, 0.0, 1.0];
/// Yellow
pub const YELLOW: [f32; 3] = [1.0, 0.968_63, 0.0];
/// Cyan
pub const CYAN: [f32; 3] = [0.0, 1.0, 1.0];
/// Magenta
pub const MAGENTA: [f32; 3] = [1.0, 0.0, 0.564_71];
/// Purple
pub const PURPLE: [f32; 3] = [0.435_29, 0.050_98, 0.541_18];
/// Brown
pub const BROWN: [f32; 3] = [0.541_18, 0.203_92, 0.047_06];
/// White
pub const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

const HUES: [[f32; 3]; 8] = [RED, GREEN, BLUE, YELLOW, CYAN, MAGENTA, PURPLE, BROWN];

fn mix(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t, a[2] + (b[2] - a[2]) * t]
}

/// Heat-map color for a height in [-1, 1]: blue, cyan, green, yellow, red
pub fn heat_color_at(height: f32) -> [f32; 3] {
    let factor = height.clamp(-1.0, 1.0);
    if factor < -0.5 {
        mix(CYAN, BLUE, (factor + 0.5).abs() * 2.0)
    } else if factor < 0.0 {
        mix(GREEN, CYAN, factor.abs() * 2.0)
    } else if factor < 0.5 {
        mix(GREEN, YELLOW, factor * 2.0)
    } else {
        mix(YELLOW, RED, (factor - 0.5) * 2.0)
    }
}

/// One of eight distinct hues, cycling
pub const fn hue_at(ordinal: usize) -> [f32; 3] {
    HUES[ordinal % HUES.len()]
}

/// Opaque RGBA from an RGB color
pub const fn opaque(rgb: [f32; 3]) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], 1.0]
}
