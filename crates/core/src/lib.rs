//! Face detection, LBPH recognition and training pipeline for `facetrain`.

pub mod detection;
pub mod imaging;
pub mod pipeline;
pub mod recognition;
pub mod shared;
pub mod training;
