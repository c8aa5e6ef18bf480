use crate::shared::constants::MAX_HUE;

/// HSV triple in 8-bit units: hue in `[0, 179]`, saturation and value in
/// `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

/// Converts one RGB pixel to 8-bit HSV.
///
/// Hue is degrees halved and rounded so it fits a byte; achromatic pixels
/// get hue 0. Saturation is 0 for black.
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> Hsv {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = (max - min) as f32;

    let s = if max == 0 {
        0
    } else {
        (255.0 * diff / max as f32).round() as u8
    };

    if diff == 0.0 {
        return Hsv { h: 0, s, v: max };
    }

    let (r, g, b) = (r as f32, g as f32, b as f32);
    let mut degrees = if max as f32 == r {
        60.0 * (g - b) / diff
    } else if max as f32 == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if degrees < 0.0 {
        degrees += 360.0;
    }

    let mut h = (degrees / 2.0).round() as u16;
    if h > MAX_HUE as u16 {
        h -= MAX_HUE as u16 + 1;
    }

    Hsv {
        h: h as u8,
        s,
        v: max,
    }
}
