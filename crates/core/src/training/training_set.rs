use crate::shared::frame::Frame;
use crate::training::label_registry::LabelRegistry;

/// One grayscale face crop and the id of the subject it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    pub face: Frame,
    pub label: i32,
}

/// Samples gathered by one collection run together with the registry that
/// produced their ids. Never empty.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    registry: LabelRegistry,
    faces: Vec<Frame>,
    labels: Vec<i32>,
}

impl TrainingSet {
    /// Returns `None` when `samples` is empty.
    pub fn new(registry: LabelRegistry, samples: Vec<TrainingSample>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let (faces, labels) = samples.into_iter().map(|s| (s.face, s.label)).unzip();
        Some(Self {
            registry,
            faces,
            labels,
        })
    }

    pub fn registry(&self) -> &LabelRegistry {
        &self.registry
    }

    pub fn faces(&self) -> &[Frame] {
        &self.faces
    }

    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}
