//! Color-blob cell detection: HSV segmentation, morphological cleanup,
//! circularity-filtered contours and watershed separation of touching
//! cells, plus the click dispatch and capture boundaries around them.

pub mod clicking;
pub mod detection;
pub mod imaging;
pub mod pipeline;
pub mod settings;
pub mod shared;
