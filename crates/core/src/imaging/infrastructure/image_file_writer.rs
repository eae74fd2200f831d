use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};

use crate::imaging::domain::image_writer::ImageWriter;
use crate::shared::frame::Frame;

/// Writes grayscale or RGB frames using the `image` crate.
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
            std::fs::create_dir_all(parent)?;
        }

        let (w, h, data) = (frame.width(), frame.height(), frame.data().to_vec());
        let img = match frame.channels() {
            1 => GrayImage::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
            c => return Err(format!("cannot encode a {c}-channel frame").into()),
        }
        .ok_or("Failed to create image from frame data")?;

        img.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_frame(width: u32, height: u32, r: u8, g: u8, b: u8) -> Frame {
        let data = (0..width * height).flat_map(|_| [r, g, b]).collect();
        Frame::new(data, width, height, 3)
    }

    #[test]
    fn test_write_creates_file_and_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alice").join("image_1.jpg");
        ImageFileWriter::new()
            .write(&path, &make_frame(100, 80, 50, 100, 200))
            .unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_roundtrip_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        ImageFileWriter::new()
            .write(&path, &make_frame(50, 50, 50, 100, 200))
            .unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (50, 50));
        assert_eq!(img.get_pixel(0, 0).0, [50, 100, 200]);
    }

    #[test]
    fn test_writes_grayscale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        ImageFileWriter::new()
            .write(&path, &Frame::gray(vec![77; 6], 3, 2))
            .unwrap();
        let img = image::open(&path).unwrap().to_luma8();
        assert_eq!(img.get_pixel(2, 1).0, [77]);
    }

    #[test]
    fn test_unknown_extension_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.unknownext");
        assert!(ImageFileWriter::new()
            .write(&path, &make_frame(4, 4, 0, 0, 0))
            .is_err());
    }
}
