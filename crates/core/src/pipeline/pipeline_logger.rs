use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// How many face-less images the summary names before abbreviating.
const LISTED_WITHOUT_FACE: usize = 5;

/// Observer for what a training or enrollment run finds in each image.
pub trait PipelineLogger: Send {
    /// Called once, before the first image, with the number of images queued.
    fn run_started(&mut self, total_images: usize);

    /// `faces` were detected in `path`, an image of subject `label`.
    fn image_scanned(&mut self, path: &Path, label: &str, faces: usize);

    /// A detected face in `path` yielded no usable crop.
    fn face_dropped(&mut self, path: &Path);

    /// Wall time spent in one stage (`decode`, `detect`, `train`).
    fn stage_time(&mut self, stage: &str, duration_ms: f64);

    fn info(&mut self, message: &str);

    /// End-of-run report. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn run_started(&mut self, _total_images: usize) {}
    fn image_scanned(&mut self, _path: &Path, _label: &str, _faces: usize) {}
    fn face_dropped(&mut self, _path: &Path) {}
    fn stage_time(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI logger: reports progress through `log` every `progress_every` images
/// and tallies faces per subject for the end-of-run summary.
pub struct StdoutPipelineLogger {
    progress_every: usize,
    total_images: usize,
    scanned: usize,
    faces_by_label: BTreeMap<String, usize>,
    without_face: Vec<PathBuf>,
    dropped_faces: usize,
    stage_ms: BTreeMap<String, f64>,
    started: Instant,
}

impl StdoutPipelineLogger {
    pub fn new(progress_every: usize) -> Self {
        Self {
            progress_every: progress_every.max(1),
            total_images: 0,
            scanned: 0,
            faces_by_label: BTreeMap::new(),
            without_face: Vec::new(),
            dropped_faces: 0,
            stage_ms: BTreeMap::new(),
            started: Instant::now(),
        }
    }

    /// Faces seen per subject, including subjects where none were found.
    pub fn faces_by_label(&self) -> &BTreeMap<String, usize> {
        &self.faces_by_label
    }

    pub fn images_without_face(&self) -> &[PathBuf] {
        &self.without_face
    }

    /// Returns the formatted summary, or `None` if no image was scanned.
    pub fn summary_string(&self) -> Option<String> {
        if self.scanned == 0 {
            return None;
        }

        let faces: usize = self.faces_by_label.values().sum();
        let mut lines = vec![format!(
            "Scanned {}/{} images in {:.1}s: {faces} faces across {} subjects",
            self.scanned,
            self.total_images.max(self.scanned),
            self.started.elapsed().as_secs_f64(),
            self.faces_by_label.values().filter(|&&n| n > 0).count(),
        )];

        for (label, count) in &self.faces_by_label {
            let note = if *count == 0 { "  (not trained)" } else { "" };
            lines.push(format!("  {label:16} {count:4} faces{note}"));
        }

        if !self.without_face.is_empty() {
            let mut listed: Vec<String> = self
                .without_face
                .iter()
                .take(LISTED_WITHOUT_FACE)
                .map(|p| p.display().to_string())
                .collect();
            let rest = self.without_face.len().saturating_sub(LISTED_WITHOUT_FACE);
            if rest > 0 {
                listed.push(format!("and {rest} more"));
            }
            lines.push(format!(
                "  No face in {} images: {}",
                self.without_face.len(),
                listed.join(", ")
            ));
        }

        if self.dropped_faces > 0 {
            lines.push(format!(
                "  Dropped {} detections outside their image",
                self.dropped_faces
            ));
        }

        if !self.stage_ms.is_empty() {
            let stages: Vec<String> = self
                .stage_ms
                .iter()
                .map(|(stage, ms)| format!("{stage} {ms:.0}ms"))
                .collect();
            lines.push(format!("  Time: {}", stages.join(", ")));
        }

        Some(lines.join("\n"))
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn run_started(&mut self, total_images: usize) {
        self.total_images = total_images;
        self.started = Instant::now();
    }

    fn image_scanned(&mut self, path: &Path, label: &str, faces: usize) {
        self.scanned += 1;
        *self.faces_by_label.entry(label.to_string()).or_default() += faces;
        if faces == 0 {
            self.without_face.push(path.to_path_buf());
        }
        if self.scanned % self.progress_every == 0 || self.scanned == self.total_images {
            log::info!("Scanned {}/{} images", self.scanned, self.total_images);
        }
    }

    fn face_dropped(&mut self, _path: &Path) {
        self.dropped_faces += 1;
    }

    fn stage_time(&mut self, stage: &str, duration_ms: f64) {
        *self.stage_ms.entry(stage.to_string()).or_default() += duration_ms;
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}
