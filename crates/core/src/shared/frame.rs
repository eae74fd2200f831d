use crate::shared::region::Region;

/// A decoded image: contiguous pixel bytes in row-major order.
///
/// Either RGB (3 channels) straight from the decoder, or single-channel
/// grayscale as consumed by detection and recognition.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    pub fn gray(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self::new(data, width, height, 1)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn is_gray(&self) -> bool {
        self.channels == 1
    }

    /// Converts to single-channel luma using ITU-R 601-2 weights in 16-bit
    /// fixed point, `(R*19595 + G*38470 + B*7471 + 0x8000) >> 16`, which is
    /// how PIL's `convert("L")` rounds.
    pub fn to_gray(&self) -> Frame {
        match self.channels {
            1 => self.clone(),
            3 | 4 => {
                let stride = self.channels as usize;
                let data = self
                    .data
                    .chunks_exact(stride)
                    .map(|px| {
                        let (r, g, b) = (px[0] as u32, px[1] as u32, px[2] as u32);
                        ((r * 19595 + g * 38470 + b * 7471 + 0x8000) >> 16) as u8
                    })
                    .collect();
                Frame::gray(data, self.width, self.height)
            }
            c => panic!("unsupported channel count {c}"),
        }
    }

    /// Copies the pixels under `region`, clamped to the frame bounds.
    pub fn crop(&self, region: &Region) -> Frame {
        let clamped = region.clamp_to(self.width, self.height);
        let x1 = clamped.x as usize;
        let y1 = clamped.y as usize;
        let w = clamped.width as usize;
        let h = clamped.height as usize;
        let channels = self.channels as usize;
        let row_len = self.width as usize * channels;

        let mut data = Vec::with_capacity(w * h * channels);
        for row in y1..y1 + h {
            let start = row * row_len + x1 * channels;
            data.extend_from_slice(&self.data[start..start + w * channels]);
        }
        Frame::new(data, w as u32, h as u32, self.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(x: i32, y: i32, w: i32, h: i32) -> Region {
        Region::new(x, y, w, h)
    }

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert!(!frame.is_gray());
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 3);
    }

    #[test]
    fn test_to_gray_uses_luma_weights() {
        let frame = Frame::new(vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255], 4, 1, 3);
        let gray = frame.to_gray();
        assert!(gray.is_gray());
        assert_eq!(gray.data(), &[76, 150, 29, 255]);
    }

    #[test]
    fn test_to_gray_rounds_in_fixed_point() {
        // Truncating per-channel division would give 0 and 127 here.
        let frame = Frame::new(vec![1, 1, 1, 128, 128, 128], 2, 1, 3);
        assert_eq!(frame.to_gray().data(), &[1, 128]);
    }

    #[test]
    fn test_to_gray_on_gray_is_identity() {
        let frame = Frame::gray(vec![7, 8, 9, 10], 2, 2);
        assert_eq!(frame.to_gray(), frame);
    }

    #[test]
    fn test_crop_extracts_region() {
        // 4x3 gray: value = row * 10 + col
        let data: Vec<u8> = (0..3)
            .flat_map(|r| (0..4).map(move |c| (r * 10 + c) as u8))
            .collect();
        let frame = Frame::gray(data, 4, 3);
        let crop = frame.crop(&region(1, 1, 2, 2));
        assert_eq!(crop.width(), 2);
        assert_eq!(crop.height(), 2);
        assert_eq!(crop.data(), &[11, 12, 21, 22]);
    }

    #[test]
    fn test_crop_clamps_to_bounds() {
        let frame = Frame::gray(vec![1u8; 16], 4, 4);
        let crop = frame.crop(&region(2, 2, 10, 10));
        assert_eq!(crop.width(), 2);
        assert_eq!(crop.height(), 2);
    }

    #[test]
    fn test_crop_keeps_channels() {
        let frame = Frame::new(vec![9u8; 4 * 4 * 3], 4, 4, 3);
        let crop = frame.crop(&region(0, 0, 2, 3));
        assert_eq!(crop.channels(), 3);
        assert_eq!(crop.data().len(), 2 * 3 * 3);
    }
}
