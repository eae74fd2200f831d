use std::borrow::Cow;
use std::path::{Path, PathBuf};

use opencv::core::{Mat, Ptr, Vector};
use opencv::face::{
    FaceRecognizerTrait, FaceRecognizerTraitConst, LBPHFaceRecognizer,
    LBPHFaceRecognizerTraitConst,
};
use opencv::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::imaging::infrastructure::opencv_mat::frame_to_mat;
use crate::recognition::domain::face_recognizer::{FaceRecognizer, Prediction};
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum RecognizerError {
    #[error("cannot train on an empty set of images")]
    Empty,
    #[error("got {images} images but {labels} labels")]
    LengthMismatch { images: usize, labels: usize },
    #[error("model has not been trained")]
    NotTrained,
    #[error("invalid LBPH parameters: {0}")]
    InvalidParams(String),
    #[error("model path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),
    #[error("model file not found: {0}")]
    MissingModel(PathBuf),
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}

/// Local binary pattern histogram parameters. Defaults match OpenCV's
/// `LBPHFaceRecognizer::create()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LbphParams {
    pub radius: u32,
    pub neighbors: u32,
    pub grid_x: u32,
    pub grid_y: u32,
    /// Predictions farther than this are reported as unknown.
    pub threshold: f64,
}

impl Default for LbphParams {
    fn default() -> Self {
        Self {
            radius: 1,
            neighbors: 8,
            grid_x: 8,
            grid_y: 8,
            threshold: f64::MAX,
        }
    }
}

impl LbphParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.radius == 0 {
            return Err("lbph radius must be at least 1".into());
        }
        if !(1..=16).contains(&self.neighbors) {
            return Err(format!(
                "lbph neighbors must be between 1 and 16, got {}",
                self.neighbors
            ));
        }
        if self.grid_x == 0 || self.grid_y == 0 {
            return Err("lbph grid dimensions must be at least 1".into());
        }
        if self.threshold.is_nan() || self.threshold <= 0.0 {
            return Err(format!("lbph threshold must be positive, got {}", self.threshold));
        }
        Ok(())
    }
}

/// OpenCV's LBPH face recognizer behind the [`FaceRecognizer`] seam.
///
/// `save` writes OpenCV's `trainer.yml` format, which `load` (and any other
/// OpenCV binding) reads back.
pub struct LbphRecognizer {
    model: Ptr<LBPHFaceRecognizer>,
}

impl LbphRecognizer {
    pub fn new(params: LbphParams) -> Result<Self, RecognizerError> {
        params.validate().map_err(RecognizerError::InvalidParams)?;
        let model = LBPHFaceRecognizer::create(
            params.radius as i32,
            params.neighbors as i32,
            params.grid_x as i32,
            params.grid_y as i32,
            params.threshold,
        )?;
        Ok(Self { model })
    }

    /// Loads a model written by [`FaceRecognizer::save`] or by OpenCV.
    pub fn load(path: &Path) -> Result<Self, RecognizerError> {
        if !path.is_file() {
            return Err(RecognizerError::MissingModel(path.to_path_buf()));
        }
        let mut recognizer = Self::new(LbphParams::default())?;
        FaceRecognizerTrait::read(&mut recognizer.model, utf8(path)?)?;
        log::debug!(
            "Loaded LBPH model with {} samples from {}",
            recognizer.sample_count()?,
            path.display()
        );
        Ok(recognizer)
    }

    /// Parameters of the underlying model, including those read by `load`.
    pub fn params(&self) -> Result<LbphParams, RecognizerError> {
        Ok(LbphParams {
            radius: self.model.get_radius()? as u32,
            neighbors: self.model.get_neighbors()? as u32,
            grid_x: self.model.get_grid_x()? as u32,
            grid_y: self.model.get_grid_y()? as u32,
            threshold: LBPHFaceRecognizerTraitConst::get_threshold(&self.model)?,
        })
    }

    pub fn sample_count(&self) -> Result<usize, RecognizerError> {
        Ok(self.model.get_histograms()?.len())
    }

    /// Label of every training sample, in training order.
    pub fn labels(&self) -> Result<Vec<i32>, RecognizerError> {
        let labels = self.model.get_labels()?;
        (0..labels.rows())
            .map(|row| Ok(*labels.at::<i32>(row)?))
            .collect()
    }

    fn train_samples(&mut self, images: &[Frame], labels: &[i32]) -> Result<(), RecognizerError> {
        if images.is_empty() {
            return Err(RecognizerError::Empty);
        }
        if images.len() != labels.len() {
            return Err(RecognizerError::LengthMismatch {
                images: images.len(),
                labels: labels.len(),
            });
        }
        let faces = images
            .iter()
            .map(gray_mat)
            .collect::<Result<Vector<Mat>, _>>()?;
        let labels = Vector::<i32>::from_slice(labels);
        FaceRecognizerTrait::train(&mut self.model, &faces, &labels)?;
        Ok(())
    }

    fn predict_sample(&self, image: &Frame) -> Result<Prediction, RecognizerError> {
        if self.sample_count()? == 0 {
            return Err(RecognizerError::NotTrained);
        }
        let mut label = 0;
        let mut distance = 0.0;
        FaceRecognizerTraitConst::predict(&self.model, &gray_mat(image)?, &mut label, &mut distance)?;
        Ok(Prediction { label, distance })
    }
}

impl FaceRecognizer for LbphRecognizer {
    fn train(&mut self, images: &[Frame], labels: &[i32]) -> Result<(), Box<dyn std::error::Error>> {
        Ok(self.train_samples(images, labels)?)
    }

    fn predict(&self, image: &Frame) -> Result<Prediction, Box<dyn std::error::Error>> {
        Ok(self.predict_sample(image)?)
    }

    fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        FaceRecognizerTraitConst::write(&self.model, utf8(path)?)?;
        Ok(())
    }
}

fn gray_mat(image: &Frame) -> opencv::Result<Mat> {
    let gray = if image.is_gray() {
        Cow::Borrowed(image)
    } else {
        Cow::Owned(image.to_gray())
    };
    frame_to_mat(&gray)
}

fn utf8(path: &Path) -> Result<&str, RecognizerError> {
    path.to_str()
        .ok_or_else(|| RecognizerError::NonUtf8Path(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::domain::face_recognizer::UNKNOWN_LABEL;
    use approx::assert_relative_eq;
    use rstest::rstest;

    /// Horizontal stripes of period `period` pixels.
    fn stripes(period: u32) -> Frame {
        let (w, h) = (32, 32);
        let data = (0..h)
            .flat_map(|y| (0..w).map(move |_| if (y / period) % 2 == 0 { 30 } else { 220 }))
            .collect();
        Frame::gray(data, w, h)
    }

    /// Diagonal gradient.
    fn gradient() -> Frame {
        let (w, h) = (32u32, 32u32);
        let data = (0..h)
            .flat_map(|y| (0..w).map(move |x| ((x + y) * 4) as u8))
            .collect();
        Frame::gray(data, w, h)
    }

    fn trained() -> LbphRecognizer {
        let mut rec = LbphRecognizer::new(LbphParams::default()).unwrap();
        rec.train(&[stripes(2), gradient(), stripes(4)], &[0, 1, 0])
            .unwrap();
        rec
    }

    #[rstest]
    #[case(LbphParams { radius: 0, ..LbphParams::default() })]
    #[case(LbphParams { neighbors: 0, ..LbphParams::default() })]
    #[case(LbphParams { neighbors: 17, ..LbphParams::default() })]
    #[case(LbphParams { grid_x: 0, ..LbphParams::default() })]
    #[case(LbphParams { threshold: 0.0, ..LbphParams::default() })]
    #[case(LbphParams { threshold: f64::NAN, ..LbphParams::default() })]
    fn test_invalid_params(#[case] params: LbphParams) {
        assert!(params.validate().is_err());
        assert!(LbphRecognizer::new(params).is_err());
    }

    #[test]
    fn test_exact_sample_predicts_its_label() {
        let rec = trained();
        let p = rec.predict(&gradient()).unwrap();
        assert_eq!(p.label, 1);
        assert_relative_eq!(p.distance, 0.0, epsilon = 1e-6);

        let p = rec.predict(&stripes(2)).unwrap();
        assert_eq!(p.label, 0);
        assert!(p.is_known());
    }

    #[test]
    fn test_threshold_yields_unknown() {
        let mut rec = LbphRecognizer::new(LbphParams {
            threshold: 1e-9,
            ..LbphParams::default()
        })
        .unwrap();
        rec.train(&[gradient()], &[4]).unwrap();
        let p = rec.predict(&stripes(3)).unwrap();
        assert_eq!(p.label, UNKNOWN_LABEL);
        assert!(!p.is_known());
    }

    #[test]
    fn test_rgb_input_is_converted() {
        let rec = trained();
        let gray = gradient();
        let rgb = Frame::new(
            gray.data().iter().flat_map(|&v| [v, v, v]).collect(),
            gray.width(),
            gray.height(),
            3,
        );
        assert_eq!(rec.predict(&rgb).unwrap().label, 1);
    }

    #[test]
    fn test_train_rejects_empty_and_mismatched() {
        let mut rec = LbphRecognizer::new(LbphParams::default()).unwrap();
        assert!(rec.train(&[], &[]).is_err());
        assert!(rec.train(&[gradient()], &[0, 1]).is_err());
    }

    #[test]
    fn test_predict_before_training_fails() {
        let rec = LbphRecognizer::new(LbphParams::default()).unwrap();
        assert!(matches!(
            rec.predict_sample(&gradient()),
            Err(RecognizerError::NotTrained)
        ));
    }

    #[test]
    fn test_retrain_replaces_model() {
        let mut rec = trained();
        rec.train(&[gradient()], &[9]).unwrap();
        assert_eq!(rec.labels().unwrap(), vec![9]);
        assert_eq!(rec.sample_count().unwrap(), 1);
    }

    #[test]
    fn test_save_then_load_predicts_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trainer.yml");
        let mut rec = LbphRecognizer::new(LbphParams {
            grid_x: 4,
            grid_y: 4,
            ..LbphParams::default()
        })
        .unwrap();
        rec.train(&[stripes(2), gradient()], &[0, 1]).unwrap();
        rec.save(&path).unwrap();

        let yaml = std::fs::read_to_string(&path).unwrap();
        assert!(yaml.contains("opencv_lbphfaces"));

        let loaded = LbphRecognizer::load(&path).unwrap();
        assert_eq!(loaded.params().unwrap(), rec.params().unwrap());
        assert_eq!(loaded.labels().unwrap(), vec![0, 1]);
        let p = loaded.predict(&gradient()).unwrap();
        assert_eq!(p.label, 1);
        assert_relative_eq!(p.distance, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            LbphRecognizer::load(&dir.path().join("trainer.yml")),
            Err(RecognizerError::MissingModel(_))
        ));
    }
}
