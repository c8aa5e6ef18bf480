use serde::Serialize;

use crate::shared::point::Point;

/// One detected cell.
///
/// `center` is local to the captured image. `circularity` is `None` for
/// cells recovered by the watershed pass, which measures pixel area only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Blob {
    pub center: Point,
    pub area: f64,
    pub circularity: Option<f64>,
}

impl Blob {
    pub fn from_contour(center: Point, area: f64, circularity: f64) -> Self {
        Self {
            center,
            area,
            circularity: Some(circularity),
        }
    }

    pub fn from_watershed(center: Point, pixel_count: usize) -> Self {
        Self {
            center,
            area: pixel_count as f64,
            circularity: None,
        }
    }
}
