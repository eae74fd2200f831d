use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::domain::detection_params::DetectionParams;
use crate::recognition::infrastructure::lbph_recognizer::LbphParams;
use crate::shared::constants::{
    DEFAULT_CASCADE_PATH, DEFAULT_MODEL_DIR, DEFAULT_TRAINING_IMAGES_DIR, LABELS_FILE_NAME,
    MODEL_FILE_NAME,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Locations and tuning knobs for a training run.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Pretrained frontal-face cascade definition (OpenCV XML).
    pub cascade_path: PathBuf,
    /// Root holding one subdirectory of images per subject.
    pub training_images_dir: PathBuf,
    /// Output directory for `labels.pickle` and `trainer.yml`.
    pub model_dir: PathBuf,
    pub detection: DetectionParams,
    pub lbph: LbphParams,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            cascade_path: PathBuf::from(DEFAULT_CASCADE_PATH),
            training_images_dir: PathBuf::from(DEFAULT_TRAINING_IMAGES_DIR),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            detection: DetectionParams::default(),
            lbph: LbphParams::default(),
        }
    }
}

impl TrainerConfig {
    /// Platform config location: `<config_dir>/facetrain/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("facetrain").join("config.json"))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: TrainerConfig =
            serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads an explicit config file, or the platform default if one exists,
    /// falling back to built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                log::debug!("Loading config from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |e: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, json).map_err(write_err)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detection.validate().map_err(ConfigError::Invalid)?;
        self.lbph.validate().map_err(ConfigError::Invalid)
    }

    pub fn labels_path(&self) -> PathBuf {
        self.model_dir.join(LABELS_FILE_NAME)
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(MODEL_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = TrainerConfig::default();
        assert_eq!(config.model_dir, PathBuf::from("model"));
        assert_eq!(config.labels_path(), PathBuf::from("model/labels.pickle"));
        assert_eq!(config.model_path(), PathBuf::from("model/trainer.yml"));
        assert_relative_eq!(config.detection.scale_factor, 1.5);
        assert_eq!(config.detection.min_neighbors, 5);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"model_dir": "/srv/models", "detection": {"min_neighbors": 3}}"#)
            .unwrap();

        let config = TrainerConfig::load(&path).unwrap();
        assert_eq!(config.model_dir, PathBuf::from("/srv/models"));
        assert_eq!(config.detection.min_neighbors, 3);
        assert_relative_eq!(config.detection.scale_factor, 1.5);
        assert_eq!(config.training_images_dir, PathBuf::from("training_images"));
    }

    #[test]
    fn test_save_then_load_matches() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.json");
        let mut config = TrainerConfig::default();
        config.training_images_dir = PathBuf::from("faces");
        config.save(&path).unwrap();

        assert_eq!(TrainerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_scale_factor_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"detection": {"scale_factor": 1.0}}"#).unwrap();

        assert!(matches!(
            TrainerConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = TrainerConfig::load_or_default(Some(Path::new("/nonexistent/config.json")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            TrainerConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
