pub mod blob;
pub mod cell_detector;
pub mod detector_config;
