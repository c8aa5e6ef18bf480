use crate::detection::domain::cell_detector::{CellDetector, Detection};
use crate::detection::domain::detector_config::{CellColor, DetectorConfig};
use crate::detection::infrastructure::{
    color_segmenter, morphology_filter, overlap_separator, shape_extractor,
};
use crate::shared::frame::Frame;

/// HSV threshold, opening, contour filter and watershed split, in that
/// order.
///
/// The watershed result replaces the contour result only when it finds
/// strictly more cells.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColorBlobDetector;

impl ColorBlobDetector {
    pub fn new() -> Self {
        Self
    }
}

impl CellDetector for ColorBlobDetector {
    fn detect(&self, frame: &Frame, color: CellColor, config: &DetectorConfig) -> Detection {
        let mask = color_segmenter::segment(frame, color, &config.color_range);
        let cleaned = morphology_filter::open(&mask, &config.morph);
        let extraction = shape_extractor::extract(&cleaned, frame, config);
        let contour_count = extraction.blobs.len();

        let (blobs, annotated, separated) = match overlap_separator::separate(
            &cleaned,
            frame,
            &extraction.annotated,
            contour_count,
            config,
        ) {
            Some(separation) => {
                log::debug!(
                    "Watershed split {contour_count} contour blobs into {}",
                    separation.blobs.len()
                );
                (separation.blobs, separation.annotated, true)
            }
            None => (extraction.blobs, extraction.annotated, false),
        };

        Detection {
            centers: blobs.iter().map(|b| b.center).collect(),
            blobs,
            annotated,
            separated,
        }
    }
}
