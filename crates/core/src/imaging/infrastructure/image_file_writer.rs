use std::path::Path;

use crate::imaging::domain::image_writer::ImageWriter;
use crate::shared::frame::Frame;

/// Writes a frame to disk using the `image` crate; the format follows the
/// file extension.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("Failed to create image from frame data")?;
        img.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed_image.png");
        let frame = Frame::filled(100, 80, [50, 100, 200]);
        ImageFileWriter::new().write(&path, &frame).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_roundtrip_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut frame = Frame::filled(50, 40, [50, 100, 200]);
        frame.set_pixel(49, 39, [0, 0, 255]);
        ImageFileWriter::new().write(&path, &frame).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (50, 40));
        assert_eq!(img.get_pixel(0, 0).0, [50, 100, 200]);
        assert_eq!(img.get_pixel(49, 39).0, [0, 0, 255]);
    }

    #[test]
    fn test_write_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug").join("nested").join("out.png");
        ImageFileWriter::new()
            .write(&path, &Frame::filled(4, 4, [1, 2, 3]))
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_unknown_extension_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.notanimage");
        assert!(ImageFileWriter::new()
            .write(&path, &Frame::filled(4, 4, [0, 0, 0]))
            .is_err());
    }
}
