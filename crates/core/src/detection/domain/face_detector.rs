use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for face detection.
///
/// Takes a single-channel grayscale frame and returns face rectangles in
/// that frame's pixel coordinates. `&mut self` leaves room for detectors
/// that keep scratch buffers between calls.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
