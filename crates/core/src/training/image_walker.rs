use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::shared::constants::TRAINING_IMAGE_SUFFIXES;
use crate::training::label_registry::normalize_label;

/// A training image and the normalized label of the directory holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledImage {
    pub path: PathBuf,
    pub label: String,
}

/// True when the file name ends in one of the accepted suffixes.
/// Matching is case-sensitive, so `face.JPG` is skipped.
pub fn is_training_image(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| TRAINING_IMAGE_SUFFIXES.iter().any(|s| name.ends_with(s)))
}

/// Recursively lists training images under `root` in file-name order.
///
/// The label is the name of each image's immediate parent directory, so
/// nested layouts label by the innermost directory.
pub fn walk_training_images(root: &Path) -> Result<Vec<LabeledImage>, walkdir::Error> {
    let mut images = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_training_image(entry.path()) {
            continue;
        }
        let Some(dir_name) = entry
            .path()
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy())
        else {
            continue;
        };
        let label = normalize_label(&dir_name);
        images.push(LabeledImage {
            path: entry.into_path(),
            label,
        });
    }
    Ok(images)
}
