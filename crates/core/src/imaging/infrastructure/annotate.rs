use opencv::core::{Rect, Scalar};
use opencv::imgproc::{self, LINE_8};

use crate::imaging::infrastructure::opencv_mat::{frame_to_mat, mat_to_frame};
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Box colour in the frame's RGB order.
pub const ANNOTATION_COLOR: [u8; 3] = [255, 0, 0];

/// Outline width for a face box: one pixel per 45 pixels of side, rounded up.
pub fn rect_thickness(region: &Region) -> i32 {
    ((region.area() as f64).sqrt() / 45.0).ceil() as i32
}

/// Copy of `frame` with a box around every region.
pub fn annotate_faces(frame: &Frame, regions: &[Region]) -> opencv::Result<Frame> {
    let mut mat = frame_to_mat(frame)?;
    let color = if frame.is_gray() {
        let gray = Frame::new(ANNOTATION_COLOR.to_vec(), 1, 1, 3).to_gray();
        Scalar::all(f64::from(gray.data()[0]))
    } else {
        let [r, g, b] = ANNOTATION_COLOR.map(f64::from);
        Scalar::new(r, g, b, 0.0)
    };
    for region in regions.iter().filter(|r| r.area() > 0) {
        imgproc::rectangle(
            &mut mat,
            Rect::new(region.x, region.y, region.width, region.height),
            color,
            rect_thickness(region),
            LINE_8,
            0,
        )?;
    }
    mat_to_frame(&mat)
}
