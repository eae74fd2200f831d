use serde::{Deserialize, Serialize};

use crate::shared::constants::{DEFAULT_MIN_NEIGHBORS, DEFAULT_SCALE_FACTOR};

/// Multi-scale detection settings.
///
/// `scale_factor` controls how much the search window grows per pyramid
/// level; `min_neighbors` is how many overlapping raw hits a candidate
/// needs before it is reported. Higher values trade recall for precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    pub scale_factor: f64,
    pub min_neighbors: u32,
    /// Smallest face (width, height) to report. `None` = cascade window size.
    pub min_size: Option<(u32, u32)>,
    /// Largest face (width, height) to report. `None` = image size.
    pub max_size: Option<(u32, u32)>,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            min_size: None,
            max_size: None,
        }
    }
}

impl DetectionParams {
    pub fn new(scale_factor: f64, min_neighbors: u32) -> Self {
        Self {
            scale_factor,
            min_neighbors,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 1.0 {
            return Err(format!(
                "scale factor must be greater than 1.0, got {}",
                self.scale_factor
            ));
        }
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min.0 > max.0 || min.1 > max.1 {
                return Err(format!(
                    "min size {}x{} exceeds max size {}x{}",
                    min.0, min.1, max.0, max.1
                ));
            }
        }
        Ok(())
    }
}
