use std::fs;
use std::path::{Path, PathBuf};

use crate::detection::domain::face_detector::FaceDetector;
use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::training::label_registry::normalize_label;

/// Outcome of one enrollment run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollReport {
    pub saved: Vec<PathBuf>,
    /// Sources in which no face was detected.
    pub skipped: Vec<PathBuf>,
    /// True when the subject directory filled up before all sources were seen.
    pub limit_reached: bool,
}

/// Copies source images that contain a face into a subject's training
/// directory as `image_<n>.jpg`.
pub struct EnrollFacesUseCase {
    reader: Box<dyn ImageReader>,
    detector: Box<dyn FaceDetector>,
    image_writer: Box<dyn ImageWriter>,
    logger: Box<dyn PipelineLogger>,
    training_images_dir: PathBuf,
    max_images: usize,
}

impl EnrollFacesUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        detector: Box<dyn FaceDetector>,
        image_writer: Box<dyn ImageWriter>,
        logger: Box<dyn PipelineLogger>,
        training_images_dir: PathBuf,
        max_images: usize,
    ) -> Self {
        Self {
            reader,
            detector,
            image_writer,
            logger,
            training_images_dir,
            max_images,
        }
    }

    /// The directory `label` enrolls into.
    pub fn subject_dir(&self, label: &str) -> PathBuf {
        self.training_images_dir.join(normalize_label(label))
    }

    pub fn execute(
        &mut self,
        sources: &[PathBuf],
        label: &str,
    ) -> Result<EnrollReport, Box<dyn std::error::Error>> {
        let subject_dir = self.subject_dir(label);
        let label = normalize_label(label);
        fs::create_dir_all(&subject_dir)?;
        let mut count = fs::read_dir(&subject_dir)?.count();
        let mut report = EnrollReport::default();
        self.logger.run_started(sources.len());

        for source in sources {
            if count >= self.max_images {
                report.limit_reached = true;
                self.logger.info(&format!(
                    "{} already holds {} images, stopping",
                    subject_dir.display(),
                    self.max_images
                ));
                break;
            }

            let frame = self.reader.read(source)?;
            let faces = self.detector.detect(&frame.to_gray())?;
            self.logger.image_scanned(source, &label, faces.len());

            if faces.is_empty() {
                log::debug!("No face found in {}", source.display());
                report.skipped.push(source.clone());
            } else {
                let target = next_free_path(&subject_dir, count + 1);
                self.image_writer.write(&target, &frame)?;
                count += 1;
                report.saved.push(target);
            }
        }

        self.logger.info(&format!(
            "Enrolled {} images for {label}",
            report.saved.len()
        ));
        self.logger.summary();
        Ok(report)
    }
}

/// `image_<n>.jpg` for the first `n >= start` that does not exist yet.
fn next_free_path(dir: &Path, start: usize) -> PathBuf {
    (start..)
        .map(|n| dir.join(format!("image_{n}.jpg")))
        .find(|p| !p.exists())
        .unwrap_or_else(|| dir.join(format!("image_{start}.jpg")))
}
