use std::borrow::Cow;
use std::path::{Path, PathBuf};

use opencv::core::{Rect, Size, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use thiserror::Error;

use crate::detection::domain::detection_params::DetectionParams;
use crate::detection::domain::face_detector::FaceDetector;
use crate::imaging::infrastructure::opencv_mat::frame_to_mat;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("invalid detection parameters: {0}")]
    InvalidParams(String),
    #[error("cascade path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),
    #[error("no usable cascade could be loaded from {0}")]
    EmptyCascade(PathBuf),
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}

/// Face detector backed by OpenCV's `CascadeClassifier::detectMultiScale`.
pub struct CascadeFaceDetector {
    classifier: CascadeClassifier,
    params: DetectionParams,
}

impl CascadeFaceDetector {
    /// Loads a cascade XML (Haar or LBP) trained by OpenCV.
    pub fn from_file(path: &Path, params: DetectionParams) -> Result<Self, DetectorError> {
        params.validate().map_err(DetectorError::InvalidParams)?;
        let path_str = path
            .to_str()
            .ok_or_else(|| DetectorError::NonUtf8Path(path.to_path_buf()))?;
        let classifier = CascadeClassifier::new(path_str)?;
        if classifier.empty()? {
            return Err(DetectorError::EmptyCascade(path.to_path_buf()));
        }
        log::debug!("Loaded cascade {}", path.display());
        Ok(Self { classifier, params })
    }

    pub fn params(&self) -> &DetectionParams {
        &self.params
    }
}

impl FaceDetector for CascadeFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let gray = if frame.is_gray() {
            Cow::Borrowed(frame)
        } else {
            Cow::Owned(frame.to_gray())
        };
        let image = frame_to_mat(&gray)?;

        let mut faces = Vector::<Rect>::new();
        self.classifier.detect_multi_scale(
            &image,
            &mut faces,
            self.params.scale_factor,
            self.params.min_neighbors as i32,
            0,
            to_size(self.params.min_size),
            to_size(self.params.max_size),
        )?;
        log::debug!("Cascade found {} faces", faces.len());
        Ok(faces.iter().map(to_region).collect())
    }
}

/// OpenCV reads a zero size as "no bound".
fn to_size(size: Option<(u32, u32)>) -> Size {
    size.map_or_else(Size::default, |(w, h)| Size::new(w as i32, h as i32))
}

fn to_region(rect: Rect) -> Region {
    Region::new(rect.x, rect.y, rect.width, rect.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_invalid_params_rejected_before_loading() {
        let result =
            CascadeFaceDetector::from_file(Path::new("missing.xml"), DetectionParams::new(1.0, 5));
        assert!(matches!(result, Err(DetectorError::InvalidParams(_))));
    }

    #[test]
    fn test_missing_cascade_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = CascadeFaceDetector::from_file(
            &tmp.path().join("absent.xml"),
            DetectionParams::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_garbage_cascade_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cascade.xml");
        fs::write(&path, "<?xml version=\"1.0\"?>\n<opencv_storage>\n</opencv_storage>\n")
            .unwrap();
        assert!(CascadeFaceDetector::from_file(&path, DetectionParams::default()).is_err());
    }

    #[test]
    fn test_unbounded_size_maps_to_zero() {
        assert_eq!(to_size(None), Size::new(0, 0));
        assert_eq!(to_size(Some((40, 30))), Size::new(40, 30));
    }

    #[test]
    fn test_rect_maps_to_region() {
        assert_eq!(to_region(Rect::new(3, 4, 50, 60)), Region::new(3, 4, 50, 60));
    }
}
