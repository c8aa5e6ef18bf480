use image::{GrayImage, Luma};

use crate::detection::domain::detector_config::{CellColor, ColorRange};
use crate::detection::infrastructure::hsv::{rgb_to_hsv, Hsv};
use crate::shared::constants::{RED_HIGH_HUE, RED_LOW_HUE};
use crate::shared::frame::Frame;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Builds a binary mask (0 / 255) of the pixels whose HSV value lies in
/// `range`.
///
/// For [`CellColor::Red`] the hue test is replaced by the two fixed red
/// bands on either side of the hue origin; only the saturation and value
/// bounds of `range` apply.
pub fn segment(frame: &Frame, color: CellColor, range: &ColorRange) -> GrayImage {
    let width = frame.width();
    let mut mask = GrayImage::new(width, frame.height());

    for (i, rgb) in frame.data().chunks_exact(3).enumerate() {
        let hsv = rgb_to_hsv([rgb[0], rgb[1], rgb[2]]);
        if in_range(hsv, color, range) {
            let x = i as u32 % width;
            let y = i as u32 / width;
            mask.put_pixel(x, y, Luma([FOREGROUND]));
        }
    }
    mask
}

fn in_range(hsv: Hsv, color: CellColor, range: &ColorRange) -> bool {
    if !range.sat_val_contains(hsv.s, hsv.v) {
        return false;
    }
    if color.wraps_hue() {
        is_red_hue(hsv.h)
    } else {
        range.hue_contains(hsv.h)
    }
}

fn is_red_hue(hue: u8) -> bool {
    (RED_LOW_HUE.0..=RED_LOW_HUE.1).contains(&hue) || (RED_HIGH_HUE.0..=RED_HIGH_HUE.1).contains(&hue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone_frame() -> Frame {
        // left half green, right half red
        let mut frame = Frame::filled(4, 2, [0, 200, 0]);
        for y in 0..2 {
            frame.set_pixel(2, y, [220, 10, 10]);
            frame.set_pixel(3, y, [220, 10, 10]);
        }
        frame
    }

    fn foreground_count(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p.0[0] == FOREGROUND).count()
    }

    #[test]
    fn test_mask_matches_frame_dimensions() {
        let mask = segment(&two_tone_frame(), CellColor::Green, &ColorRange::default());
        assert_eq!(mask.dimensions(), (4, 2));
    }

    #[test]
    fn test_green_selects_green_pixels_only() {
        let mask = segment(&two_tone_frame(), CellColor::Green, &ColorRange::default());
        assert_eq!(mask.get_pixel(0, 0).0[0], FOREGROUND);
        assert_eq!(mask.get_pixel(1, 1).0[0], FOREGROUND);
        assert_eq!(mask.get_pixel(2, 0).0[0], BACKGROUND);
        assert_eq!(foreground_count(&mask), 4);
    }

    #[test]
    fn test_mask_is_strictly_binary() {
        let mask = segment(&two_tone_frame(), CellColor::Red, &ColorRange::default());
        assert!(mask
            .pixels()
            .all(|p| p.0[0] == FOREGROUND || p.0[0] == BACKGROUND));
    }

    #[test]
    fn test_red_ignores_configured_hue_bounds() {
        let range = ColorRange {
            hue_min: 100,
            hue_max: 120,
            ..ColorRange::default()
        };
        let mask = segment(&two_tone_frame(), CellColor::Red, &range);
        assert_eq!(mask.get_pixel(3, 1).0[0], FOREGROUND);
        assert_eq!(mask.get_pixel(0, 0).0[0], BACKGROUND);
        assert_eq!(foreground_count(&mask), 4);
    }

    #[test]
    fn test_red_selects_high_hue_band() {
        // hue 170 (340 degrees)
        let frame = Frame::filled(2, 2, [255, 0, 85]);
        let mask = segment(&frame, CellColor::Red, &ColorRange::default());
        assert_eq!(foreground_count(&mask), 4);
    }

    #[test]
    fn test_red_still_honours_saturation_bounds() {
        let range = ColorRange {
            sat_min: 250,
            ..ColorRange::default()
        };
        // saturation ~ 128
        let frame = Frame::filled(2, 2, [200, 100, 100]);
        let mask = segment(&frame, CellColor::Red, &range);
        assert_eq!(foreground_count(&mask), 0);
    }

    #[test]
    fn test_inverted_bounds_select_nothing() {
        let range = ColorRange {
            hue_min: 80,
            hue_max: 40,
            ..ColorRange::default()
        };
        let mask = segment(&two_tone_frame(), CellColor::Green, &range);
        assert_eq!(foreground_count(&mask), 0);
    }

    #[test]
    fn test_black_image_gives_empty_mask() {
        let frame = Frame::filled(8, 8, [0, 0, 0]);
        let mask = segment(&frame, CellColor::Green, &ColorRange::default());
        assert_eq!(foreground_count(&mask), 0);
    }
}
