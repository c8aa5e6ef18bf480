pub mod annotation;
pub mod color_blob_detector;
pub mod color_segmenter;
pub mod hsv;
pub mod morphology_filter;
pub mod overlap_separator;
pub mod shape_extractor;
pub mod watershed;
