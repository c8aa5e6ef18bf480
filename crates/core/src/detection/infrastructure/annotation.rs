//! Debug overlay drawing on RGB images.
//!
//! Labels use a built-in 3x5 bitmap font, scaled up, which covers the
//! characters the blob labels need (digits, `A`, `C`, `:`, `.`, `,`, `-`
//! and space). Anything else renders as blank space.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use imageproc::point::Point as ContourPoint;

use crate::shared::point::Point;

pub const CONTOUR_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const CENTER_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
pub const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
pub const REGION_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

pub const CENTER_RADIUS: i32 = 5;
/// Label baseline offset from the blob center.
pub const LABEL_OFFSET: (i32, i32) = (-40, -15);

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;
const GLYPH_SCALE: i32 = 2;
const GLYPH_SPACING: i32 = 2;

pub fn draw_contour(canvas: &mut RgbImage, points: &[ContourPoint<i32>]) {
    match points {
        [] => {}
        [only] => draw_line_segment_mut(
            canvas,
            (only.x as f32, only.y as f32),
            (only.x as f32, only.y as f32),
            CONTOUR_COLOR,
        ),
        _ => {
            for (i, start) in points.iter().enumerate() {
                let end = points[(i + 1) % points.len()];
                draw_line_segment_mut(
                    canvas,
                    (start.x as f32, start.y as f32),
                    (end.x as f32, end.y as f32),
                    CONTOUR_COLOR,
                );
            }
        }
    }
}

pub fn draw_center(canvas: &mut RgbImage, center: Point) {
    draw_filled_circle_mut(canvas, (center.x, center.y), CENTER_RADIUS, CENTER_COLOR);
}

/// Formats the `A:<area>, C:<circularity>` label of one blob.
pub fn blob_label(area: f64, circularity: f64) -> String {
    format!("A:{}, C:{circularity:.2}", area as i64)
}

pub fn draw_blob_label(canvas: &mut RgbImage, center: Point, text: &str) {
    let origin = Point::new(center.x + LABEL_OFFSET.0, center.y + LABEL_OFFSET.1);
    draw_text(canvas, origin, text, LABEL_COLOR);
}

/// Draws `text` with its bottom-left corner at `baseline`. Pixels falling
/// outside the canvas are clipped.
pub fn draw_text(canvas: &mut RgbImage, baseline: Point, text: &str, color: Rgb<u8>) {
    let top = baseline.y - GLYPH_HEIGHT * GLYPH_SCALE;
    let advance = GLYPH_WIDTH * GLYPH_SCALE + GLYPH_SPACING;

    for (index, ch) in text.chars().enumerate() {
        let left = baseline.x + index as i32 * advance;
        for (row, bits) in glyph(ch).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let x0 = left + col * GLYPH_SCALE;
                let y0 = top + row as i32 * GLYPH_SCALE;
                fill_block(canvas, x0, y0, GLYPH_SCALE, color);
            }
        }
    }
}

/// Per-channel `alpha * overlay + (1 - alpha) * base`, rounded and
/// saturated.
pub fn blend(overlay: &RgbImage, base: &RgbImage, alpha: f32) -> RgbImage {
    debug_assert_eq!(overlay.dimensions(), base.dimensions());
    let mut out = base.clone();
    for (dst, (o, b)) in out.pixels_mut().zip(overlay.pixels().zip(base.pixels())) {
        for c in 0..3 {
            let v = alpha * o.0[c] as f32 + (1.0 - alpha) * b.0[c] as f32;
            dst.0[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

fn fill_block(canvas: &mut RgbImage, x0: i32, y0: i32, size: i32, color: Rgb<u8>) {
    let (width, height) = (canvas.width() as i32, canvas.height() as i32);
    for y in y0..y0 + size {
        for x in x0..x0 + size {
            if x >= 0 && y >= 0 && x < width && y < height {
                canvas.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

fn glyph(ch: char) -> [u8; 5] {
    match ch {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        _ => [0; 5],
    }
}
