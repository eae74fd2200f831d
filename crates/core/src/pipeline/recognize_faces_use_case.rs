use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::imaging::infrastructure::annotate::annotate_faces;
use crate::recognition::domain::face_recognizer::{FaceRecognizer, Prediction};
use crate::shared::region::Region;
use crate::training::label_registry::LabelRegistry;

/// One detected face and who the recognizer thinks it is.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub region: Region,
    pub prediction: Prediction,
    /// `None` when the prediction is unknown or its id is not in the registry.
    pub name: Option<String>,
}

/// Single-image recognition: read → grayscale → detect → predict each face.
pub struct RecognizeFacesUseCase {
    reader: Box<dyn ImageReader>,
    detector: Box<dyn FaceDetector>,
    recognizer: Box<dyn FaceRecognizer>,
    image_writer: Box<dyn ImageWriter>,
    registry: LabelRegistry,
}

impl RecognizeFacesUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        detector: Box<dyn FaceDetector>,
        recognizer: Box<dyn FaceRecognizer>,
        image_writer: Box<dyn ImageWriter>,
        registry: LabelRegistry,
    ) -> Self {
        Self {
            reader,
            detector,
            recognizer,
            image_writer,
            registry,
        }
    }

    /// Recognizes every face in `input_path`. When `annotated_output` is
    /// given, a copy of the image with a box around each face is written there.
    pub fn execute(
        &mut self,
        input_path: &Path,
        annotated_output: Option<&Path>,
    ) -> Result<Vec<Recognition>, Box<dyn std::error::Error>> {
        let frame = self.reader.read(input_path)?;
        let gray = frame.to_gray();
        let regions = self.detector.detect(&gray)?;

        let mut results = Vec::with_capacity(regions.len());
        for region in regions {
            let prediction = self.recognizer.predict(&gray.crop(&region))?;
            let name = prediction
                .is_known()
                .then(|| self.registry.name(prediction.label))
                .flatten()
                .map(str::to_string);
            log::debug!(
                "{region:?}: label {} ({}) distance {:.2}",
                prediction.label,
                name.as_deref().unwrap_or("unknown"),
                prediction.distance
            );
            results.push(Recognition {
                region,
                prediction,
                name,
            });
        }

        if let Some(output) = annotated_output {
            let regions: Vec<Region> = results.iter().map(|r| r.region).collect();
            self.image_writer
                .write(output, &annotate_faces(&frame, &regions)?)?;
        }
        Ok(results)
    }
}
