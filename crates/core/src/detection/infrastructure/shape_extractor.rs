use std::f64::consts::PI;

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point as ContourPoint;

use crate::detection::domain::blob::Blob;
use crate::detection::domain::detector_config::DetectorConfig;
use crate::detection::infrastructure::annotation;
use crate::shared::frame::Frame;
use crate::shared::point::Point;

/// Blobs accepted by the contour pass plus the annotated frame copy.
#[derive(Debug, Clone)]
pub struct ShapeExtraction {
    pub blobs: Vec<Blob>,
    pub annotated: Frame,
}

/// Traces the outer contours of `mask`, keeps those passing the size and
/// circularity filters, and annotates a copy of `frame` with them.
///
/// Blobs come out in contour discovery order. Holes are ignored.
pub fn extract(mask: &GrayImage, frame: &Frame, config: &DetectorConfig) -> ShapeExtraction {
    let mut canvas = frame.to_rgb_image();
    let mut blobs = Vec::new();

    let contours = find_contours::<i32>(mask);
    for contour in contours
        .iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
    {
        let points = &contour.points;

        let area = contour_area(points);
        if !config.size_filter.accepts(area) {
            continue;
        }

        let circ = circularity(area, arc_length(points));
        if circ < config.circularity_threshold {
            continue;
        }

        let Some(center) = centroid(points) else {
            continue;
        };

        annotation::draw_contour(&mut canvas, points);
        annotation::draw_center(&mut canvas, center);
        annotation::draw_blob_label(&mut canvas, center, &annotation::blob_label(area, circ));

        blobs.push(Blob::from_contour(center, area, circ));
    }

    log::debug!(
        "Contour pass: {} contours traced, {} accepted",
        contours.len(),
        blobs.len()
    );

    ShapeExtraction {
        blobs,
        annotated: Frame::from_rgb_image(canvas),
    }
}

/// Shoelace area of the closed polygon through `points`.
pub fn contour_area(points: &[ContourPoint<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = edges(points)
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    twice.abs() as f64 / 2.0
}

/// Length of the closed polyline through `points`.
pub fn arc_length(points: &[ContourPoint<i32>]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    edges(points)
        .map(|(a, b)| {
            let dx = (b.x - a.x) as f64;
            let dy = (b.y - a.y) as f64;
            (dx * dx + dy * dy).sqrt()
        })
        .sum()
}

/// `4π·area / perimeter²`; 0 for a zero perimeter.
pub fn circularity(area: f64, perimeter: f64) -> f64 {
    if perimeter == 0.0 {
        0.0
    } else {
        4.0 * PI * area / (perimeter * perimeter)
    }
}

/// Center of mass of the polygon from its first-order moments, truncated
/// toward zero. `None` when the polygon encloses no area.
pub fn centroid(points: &[ContourPoint<i32>]) -> Option<Point> {
    let (mut m00, mut m10, mut m01) = (0.0f64, 0.0f64, 0.0f64);
    for (a, b) in edges(points) {
        let (xa, ya, xb, yb) = (a.x as f64, a.y as f64, b.x as f64, b.y as f64);
        let cross = xa * yb - xb * ya;
        m00 += cross;
        m10 += cross * (xa + xb);
        m01 += cross * (ya + yb);
    }
    if m00 == 0.0 {
        return None;
    }
    m00 /= 2.0;
    m10 /= 6.0;
    m01 /= 6.0;
    if m00 < 0.0 {
        m00 = -m00;
        m10 = -m10;
        m01 = -m01;
    }
    Some(Point::new((m10 / m00) as i32, (m01 / m00) as i32))
}

fn edges(
    points: &[ContourPoint<i32>],
) -> impl Iterator<Item = (ContourPoint<i32>, ContourPoint<i32>)> + '_ {
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| (*a, *b))
}
