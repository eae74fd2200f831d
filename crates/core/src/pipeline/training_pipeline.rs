use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use thiserror::Error;

use crate::detection::domain::face_detector::FaceDetector;
use crate::imaging::domain::image_reader::ImageReader;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::recognition::domain::face_recognizer::FaceRecognizer;
use crate::shared::constants::{LABELS_FILE_NAME, MODEL_FILE_NAME};
use crate::training::image_walker::walk_training_images;
use crate::training::label_registry::{LabelRegistry, LabelRegistryError};
use crate::training::training_set::{TrainingSample, TrainingSet};

#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("failed to walk training images: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("failed to read image {path}: {reason}")]
    Image { path: PathBuf, reason: String },
    #[error("face detection failed on {path}: {reason}")]
    Detection { path: PathBuf, reason: String },
    #[error("failed to create model directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Labels(#[from] LabelRegistryError),
    #[error("recognizer training failed: {0}")]
    Train(String),
    #[error("failed to save model {path}: {reason}")]
    SaveModel { path: PathBuf, reason: String },
}

/// Files written by [`TrainingPipeline::persist_model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedArtifacts {
    pub labels_path: PathBuf,
    pub model_path: PathBuf,
}

/// Walks labeled images, detects faces, trains the recognizer and writes
/// `labels.pickle` and `trainer.yml`.
pub struct TrainingPipeline {
    reader: Box<dyn ImageReader>,
    detector: Box<dyn FaceDetector>,
    recognizer: Box<dyn FaceRecognizer>,
    logger: Box<dyn PipelineLogger>,
    training_images_dir: PathBuf,
    model_dir: PathBuf,
}

impl TrainingPipeline {
    pub fn new(
        reader: Box<dyn ImageReader>,
        detector: Box<dyn FaceDetector>,
        recognizer: Box<dyn FaceRecognizer>,
        logger: Box<dyn PipelineLogger>,
        training_images_dir: PathBuf,
        model_dir: PathBuf,
    ) -> Self {
        Self {
            reader,
            detector,
            recognizer,
            logger,
            training_images_dir,
            model_dir,
        }
    }

    /// Scans the training directory and crops every detected face.
    ///
    /// Returns `Ok(None)` when no face was found anywhere. A label is only
    /// registered once a face has been detected in one of its images, so ids
    /// stay dense over the labels that actually contribute samples.
    pub fn collect_training_data(&mut self) -> Result<Option<TrainingSet>, TrainingError> {
        let images = walk_training_images(&self.training_images_dir)?;
        self.logger.run_started(images.len());
        self.logger.info(&format!(
            "Found {} training images under {}",
            images.len(),
            self.training_images_dir.display()
        ));

        let mut registry = LabelRegistry::new();
        let mut samples = Vec::new();

        for image in &images {
            let t0 = Instant::now();
            let frame = self
                .reader
                .read(&image.path)
                .map_err(|e| TrainingError::Image {
                    path: image.path.clone(),
                    reason: e.to_string(),
                })?;
            let gray = frame.to_gray();
            self.logger.stage_time("decode", elapsed_ms(t0));

            let t1 = Instant::now();
            let faces = self
                .detector
                .detect(&gray)
                .map_err(|e| TrainingError::Detection {
                    path: image.path.clone(),
                    reason: e.to_string(),
                })?;
            self.logger.stage_time("detect", elapsed_ms(t1));
            self.logger
                .image_scanned(&image.path, &image.label, faces.len());

            for region in &faces {
                let face = gray.crop(region);
                if face.width() == 0 || face.height() == 0 {
                    log::warn!(
                        "Detector returned {region:?} outside {}x{} image {}; skipping it",
                        gray.width(),
                        gray.height(),
                        image.path.display()
                    );
                    self.logger.face_dropped(&image.path);
                    continue;
                }
                let label = registry.get_or_assign(&image.label);
                samples.push(TrainingSample { face, label });
            }
        }

        let labels = registry.len();
        let set = TrainingSet::new(registry, samples);
        match &set {
            Some(set) => self.logger.info(&format!(
                "Collected {} faces for {labels} labels",
                set.len()
            )),
            None => log::warn!(
                "No faces detected under {}",
                self.training_images_dir.display()
            ),
        }
        Ok(set)
    }

    /// Writes the label mapping, trains the recognizer on `set` and saves it.
    pub fn persist_model(&mut self, set: &TrainingSet) -> Result<PersistedArtifacts, TrainingError> {
        fs::create_dir_all(&self.model_dir).map_err(|e| TrainingError::CreateDir {
            path: self.model_dir.clone(),
            source: e,
        })?;

        let labels_path = self.model_dir.join(LABELS_FILE_NAME);
        set.registry().save(&labels_path)?;

        let t0 = Instant::now();
        self.recognizer
            .train(set.faces(), set.labels())
            .map_err(|e| TrainingError::Train(e.to_string()))?;
        self.logger.stage_time("train", elapsed_ms(t0));

        let model_path = self.model_dir.join(MODEL_FILE_NAME);
        self.recognizer
            .save(&model_path)
            .map_err(|e| TrainingError::SaveModel {
                path: model_path.clone(),
                reason: e.to_string(),
            })?;

        self.logger.info(&format!(
            "Saved {} and {}",
            labels_path.display(),
            model_path.display()
        ));
        Ok(PersistedArtifacts {
            labels_path,
            model_path,
        })
    }

    /// Does not delete anything; training images are left in place.
    pub fn delete_trained_images(&mut self) {
        self.logger
            .info("Deleting trained images is not implemented; leaving them in place");
    }

    /// Collects, and persists when at least one face was found.
    pub fn run(&mut self) -> Result<Option<PersistedArtifacts>, TrainingError> {
        let artifacts = match self.collect_training_data()? {
            Some(set) => Some(self.persist_model(&set)?),
            None => None,
        };
        self.logger.summary();
        Ok(artifacts)
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
