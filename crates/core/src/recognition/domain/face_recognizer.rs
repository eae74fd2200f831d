use std::path::Path;

use crate::shared::frame::Frame;

/// Label reported when no training sample is within the recognizer threshold.
pub const UNKNOWN_LABEL: i32 = -1;

/// Nearest training label for a face and its distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: i32,
    pub distance: f64,
}

impl Prediction {
    pub fn is_known(&self) -> bool {
        self.label != UNKNOWN_LABEL
    }
}

/// Learns identities from labeled face crops and predicts them for new ones.
pub trait FaceRecognizer: Send {
    /// Replaces any previous state with a model built from `images`, where
    /// `labels[i]` is the identity of `images[i]`.
    fn train(&mut self, images: &[Frame], labels: &[i32]) -> Result<(), Box<dyn std::error::Error>>;

    fn predict(&self, image: &Frame) -> Result<Prediction, Box<dyn std::error::Error>>;

    fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>>;
}
