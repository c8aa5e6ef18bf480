use image::{GrayImage, Luma};
use imageproc::distance_transform::euclidean_squared_distance_transform;
use imageproc::region_labelling::{connected_components, Connectivity};
use ndarray::Array2;

use crate::detection::domain::blob::Blob;
use crate::detection::domain::detector_config::DetectorConfig;
use crate::detection::infrastructure::annotation::{blend, REGION_COLOR};
use crate::detection::infrastructure::color_segmenter::{BACKGROUND, FOREGROUND};
use crate::detection::infrastructure::morphology_filter::dilate_3x3;
use crate::detection::infrastructure::watershed;
use crate::shared::constants::{
    OVERLAP_SENSITIVITY_GATE, SURE_BACKGROUND_ITERATIONS, SURE_FOREGROUND_RATIO,
    WATERSHED_OVERLAY_ALPHA,
};
use crate::shared::frame::Frame;
use crate::shared::point::Point;

/// Marker assigned to everything outside the grown mask.
const BACKGROUND_LABEL: i32 = 1;
/// Smallest label that belongs to a seeded cell.
const FIRST_CELL_LABEL: i32 = 2;

/// Cells recovered by the watershed pass, used only when they outnumber
/// the contour result.
#[derive(Debug, Clone)]
pub struct Separation {
    pub blobs: Vec<Blob>,
    pub annotated: Frame,
}

/// Whether the watershed pass should run at all.
pub fn is_enabled(config: &DetectorConfig, contour_blobs: usize) -> bool {
    config.overlap_sensitivity > OVERLAP_SENSITIVITY_GATE && contour_blobs > 0
}

/// Splits touching cells with a distance-transform seeded watershed.
///
/// Returns `Some` only when the watershed finds strictly more cells within
/// the size filter than `contour_blobs`; the returned annotation is
/// `annotated` with the kept regions blended in green. `frame` is the
/// unannotated capture, which is what gets flooded.
pub fn separate(
    mask: &GrayImage,
    frame: &Frame,
    annotated: &Frame,
    contour_blobs: usize,
    config: &DetectorConfig,
) -> Option<Separation> {
    if !is_enabled(config, contour_blobs) {
        return None;
    }
    if !mask.pixels().any(|p| p.0[0] == BACKGROUND) {
        log::debug!("Mask has no background; skipping overlap separation");
        return None;
    }

    let mut markers = seed_markers(mask);
    watershed::flood(frame, &mut markers);

    let regions = measure_regions(&markers);
    let kept: Vec<&RegionStats> = regions
        .iter()
        .filter(|r| r.count > 0 && config.size_filter.accepts(r.count as f64))
        .collect();

    log::debug!(
        "Watershed: {} regions, {} within size filter, contour pass had {}",
        regions.len(),
        kept.len(),
        contour_blobs
    );

    if kept.len() <= contour_blobs {
        return None;
    }

    let kept_labels: Vec<i32> = kept.iter().map(|r| r.label).collect();
    let blobs = kept
        .iter()
        .map(|r| Blob::from_watershed(r.center(), r.count))
        .collect();

    Some(Separation {
        blobs,
        annotated: paint_regions(annotated, &markers, &kept_labels),
    })
}

/// Seeds from the confident cell interiors, background label outside the
/// grown mask, and 0 in the band in between.
fn seed_markers(mask: &GrayImage) -> Array2<i32> {
    let (width, height) = mask.dimensions();

    // Distance to the nearest background pixel: transform the inverted
    // mask, whose foreground is the original background.
    let inverted = GrayImage::from_fn(width, height, |x, y| {
        Luma([FOREGROUND - mask.get_pixel(x, y).0[0]])
    });
    let squared = euclidean_squared_distance_transform(&inverted);
    let max_distance = squared.pixels().map(|p| p.0[0]).fold(0.0f64, f64::max).sqrt();
    let threshold = SURE_FOREGROUND_RATIO * max_distance;

    let sure_foreground = GrayImage::from_fn(width, height, |x, y| {
        let distance = squared.get_pixel(x, y).0[0].sqrt();
        Luma([if distance > threshold { FOREGROUND } else { BACKGROUND }])
    });
    let sure_background = dilate_3x3(mask, SURE_BACKGROUND_ITERATIONS);
    let components = connected_components(&sure_foreground, Connectivity::Eight, Luma([BACKGROUND]));

    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        let (x, y) = (x as u32, y as u32);
        let grown = sure_background.get_pixel(x, y).0[0] == FOREGROUND;
        let confident = sure_foreground.get_pixel(x, y).0[0] == FOREGROUND;
        if grown && !confident {
            0
        } else {
            components.get_pixel(x, y).0[0] as i32 + BACKGROUND_LABEL
        }
    })
}

#[derive(Debug, Clone, Copy, Default)]
struct RegionStats {
    label: i32,
    count: usize,
    sum_x: usize,
    sum_y: usize,
}

impl RegionStats {
    fn center(&self) -> Point {
        Point::new(
            (self.sum_x / self.count) as i32,
            (self.sum_y / self.count) as i32,
        )
    }
}

/// Pixel count and coordinate sums for each cell label, in label order.
fn measure_regions(markers: &Array2<i32>) -> Vec<RegionStats> {
    let max_label = markers.iter().copied().max().unwrap_or(0);
    if max_label < FIRST_CELL_LABEL {
        return Vec::new();
    }

    let mut stats: Vec<RegionStats> = (FIRST_CELL_LABEL..=max_label)
        .map(|label| RegionStats {
            label,
            ..RegionStats::default()
        })
        .collect();

    for ((y, x), &label) in markers.indexed_iter() {
        if label >= FIRST_CELL_LABEL {
            let entry = &mut stats[(label - FIRST_CELL_LABEL) as usize];
            entry.count += 1;
            entry.sum_x += x;
            entry.sum_y += y;
        }
    }
    stats
}

fn paint_regions(annotated: &Frame, markers: &Array2<i32>, labels: &[i32]) -> Frame {
    let base = annotated.to_rgb_image();
    let mut overlay = base.clone();
    for ((y, x), label) in markers.indexed_iter() {
        if labels.contains(label) {
            overlay.put_pixel(x as u32, y as u32, REGION_COLOR);
        }
    }
    Frame::from_rgb_image(blend(&overlay, &base, WATERSHED_OVERLAY_ALPHA))
}
