use crate::detection::domain::blob::Blob;
use crate::detection::domain::detector_config::{CellColor, DetectorConfig};
use crate::shared::frame::Frame;
use crate::shared::point::Point;

/// Result of one detection call.
///
/// `centers` are local to the frame that was passed in. `annotated` is a
/// copy of that frame with contours, markers and labels drawn on it.
#[derive(Debug, Clone)]
pub struct Detection {
    pub centers: Vec<Point>,
    pub blobs: Vec<Blob>,
    pub annotated: Frame,
    /// True when the watershed pass replaced the contour result.
    pub separated: bool,
}

impl Detection {
    pub fn count(&self) -> usize {
        self.centers.len()
    }
}

/// Domain interface for cell detection.
///
/// Stateless: the config is passed on every call so a caller can swap it
/// between calls without touching the detector.
pub trait CellDetector: Send + Sync {
    fn detect(&self, frame: &Frame, color: CellColor, config: &DetectorConfig) -> Detection;
}
