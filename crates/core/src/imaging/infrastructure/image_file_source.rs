use std::path::{Path, PathBuf};

use image::imageops;

use crate::imaging::domain::frame_source::FrameSource;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Region {region} lies outside the {width}x{height} capture")]
    RegionOutOfBounds {
        region: Region,
        width: u32,
        height: u32,
    },
}

/// Treats an image file as the screen: every capture re-reads the file and
/// crops the requested region out of it.
///
/// Re-reading lets an external tool refresh the file between runs.
pub struct ImageFileSource {
    path: PathBuf,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for ImageFileSource {
    fn capture(&mut self, region: Option<&Region>) -> Result<Frame, Box<dyn std::error::Error>> {
        let screen = image::open(&self.path)?.to_rgb8();
        let (width, height) = screen.dimensions();

        let Some(region) = region else {
            return Ok(Frame::from_rgb_image(screen));
        };

        let fits = region.left >= 0
            && region.top >= 0
            && region.width > 0
            && region.height > 0
            && region.right() <= width as i64
            && region.bottom() <= height as i64;
        if !fits {
            return Err(CaptureError::RegionOutOfBounds {
                region: *region,
                width,
                height,
            }
            .into());
        }

        let cropped = imageops::crop_imm(
            &screen,
            region.left as u32,
            region.top as u32,
            region.width as u32,
            region.height as u32,
        )
        .to_image();
        Ok(Frame::from_rgb_image(cropped))
    }
}
