//! Colour parsing and contrast helpers for path accents.

use peniko::Color;

/// Parse a CSS colour string as produced by computed styles.
///
/// Understands `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
/// `rgba(r, g, b, a)`, `transparent`, `white` and `black`. Anything else
/// falls back to black.
pub fn string_to_color(color: &str) -> Color {
    let color = color.trim();
    match color {
        "transparent" => return Color::from_rgba8(0, 0, 0, 0),
        "white" => return Color::from_rgba8(255, 255, 255, 255),
        "black" => return Color::from_rgba8(0, 0, 0, 255),
        _ => {}
    }

    if let Some(hex) = color.strip_prefix('#') {
        if let Some(parsed) = parse_hex(hex.trim()) {
            return parsed;
        }
    }

    if let Some(args) = color
        .strip_prefix("rgba(")
        .or_else(|| color.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        if let Some(parsed) = parse_rgb_args(args) {
            return parsed;
        }
    }

    log::warn!("Unrecognised colour {:?}, using black", color);
    Color::from_rgba8(0, 0, 0, 255)
}

fn parse_hex(hex: &str) -> Option<Color> {
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range).and_then(|s| u8::from_str_radix(s, 16).ok())
    };
    match hex.len() {
        3 => {
            // #rgb -> #rrggbb
            let r = channel(0..1)? * 17;
            let g = channel(1..2)? * 17;
            let b = channel(2..3)? * 17;
            Some(Color::from_rgba8(r, g, b, 255))
        }
        6 => Some(Color::from_rgba8(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
        8 => Some(Color::from_rgba8(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        )),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let channel = |i: usize| -> Option<u8> {
        let value: f64 = parts.get(i)?.parse().ok()?;
        Some(value.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = match parts.get(3) {
        Some(a) => {
            let a: f64 = a.parse().ok()?;
            (a.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Some(Color::from_rgba8(channel(0)?, channel(1)?, channel(2)?, alpha))
}

/// Relative luminance in `0.0..=1.0` (sRGB weights, no gamma).
pub fn luminance(color: Color) -> f64 {
    let rgba = color.to_rgba8();
    (0.2126 * rgba.r as f64 + 0.7152 * rgba.g as f64 + 0.0722 * rgba.b as f64) / 255.0
}

/// Pick an accent colour that stands out against `background`.
///
/// The accent is the inverted background pushed halfway towards white or
/// black. Dark backgrounds always get a light accent and light backgrounds a
/// dark one; for mid-tones `prefer_light` decides.
pub fn contrasting_color(background: Color, prefer_light: bool) -> Color {
    let lum = luminance(background);
    let light = if lum < 0.35 {
        true
    } else if lum > 0.65 {
        false
    } else {
        prefer_light
    };

    let rgba = background.to_rgba8();
    let target = if light { 255.0 } else { 0.0 };
    let mix = |c: u8| -> u8 { (((255 - c) as f64 + target) / 2.0).round() as u8 };
    Color::from_rgba8(mix(rgba.r), mix(rgba.g), mix(rgba.b), 255)
}

/// Format a colour for an SVG attribute (`#rrggbb`).
pub fn to_css(color: Color) -> String {
    let rgba = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
}
