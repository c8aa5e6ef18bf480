use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate_mut, erode_mut};

use crate::detection::domain::detector_config::MorphParams;
use crate::shared::constants::MORPH_KERNEL_RADIUS;

/// Erodes then dilates `mask` with a 5x5 square element.
///
/// An L-infinity ball of radius 2 is exactly that square. Pixels outside
/// the image never count as background for erosion nor as foreground for
/// dilation, so blobs touching the border are not eaten from outside.
pub fn open(mask: &GrayImage, params: &MorphParams) -> GrayImage {
    let mut cleaned = mask.clone();
    for _ in 0..params.erosion_iterations {
        erode_mut(&mut cleaned, Norm::LInf, MORPH_KERNEL_RADIUS);
    }
    for _ in 0..params.dilation_iterations {
        dilate_mut(&mut cleaned, Norm::LInf, MORPH_KERNEL_RADIUS);
    }
    cleaned
}

/// Dilates `mask` `iterations` times with a 3x3 square element.
pub fn dilate_3x3(mask: &GrayImage, iterations: usize) -> GrayImage {
    let mut grown = mask.clone();
    for _ in 0..iterations {
        dilate_mut(&mut grown, Norm::LInf, 1);
    }
    grown
}
