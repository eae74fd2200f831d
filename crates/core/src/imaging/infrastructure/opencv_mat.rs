use opencv::core::{Mat, StsUnsupportedFormat, CV_8U};
use opencv::prelude::*;

use crate::shared::frame::Frame;

/// Copies a frame into an owned OpenCV matrix with the same channel count
/// and byte order. RGB frames stay RGB; OpenCV's BGR convention is not applied.
pub fn frame_to_mat(frame: &Frame) -> opencv::Result<Mat> {
    let flat = Mat::from_slice(frame.data())?;
    let shaped = flat.reshape(i32::from(frame.channels()), frame.height() as i32)?;
    shaped.try_clone()
}

/// Copies an 8-bit matrix back into a frame.
pub fn mat_to_frame(mat: &Mat) -> opencv::Result<Frame> {
    if mat.depth() != CV_8U {
        return Err(opencv::Error::new(
            StsUnsupportedFormat,
            format!("expected an 8-bit matrix, got depth {}", mat.depth()),
        ));
    }
    let copy;
    let continuous = if mat.is_continuous() {
        mat
    } else {
        copy = mat.try_clone()?;
        &copy
    };
    Ok(Frame::new(
        continuous.data_bytes()?.to_vec(),
        mat.cols() as u32,
        mat.rows() as u32,
        mat.channels() as u8,
    ))
}
