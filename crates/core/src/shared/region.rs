/// An axis-aligned face rectangle in image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Intersection with the `[0, width) x [0, height)` image rectangle.
    ///
    /// A region entirely outside the image collapses to zero size.
    pub fn clamp_to(&self, width: u32, height: u32) -> Region {
        let x1 = self.x.clamp(0, width as i32);
        let y1 = self.y.clamp(0, height as i32);
        let x2 = self.right().clamp(x1, width as i32);
        let y2 = self.bottom().clamp(y1, height as i32);
        Region::new(x1, y1, x2 - x1, y2 - y1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_area_and_edges() {
        let r = Region::new(10, 20, 30, 40);
        assert_eq!(r.area(), 1200);
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
    }

    #[test]
    fn test_negative_size_has_zero_area() {
        assert_eq!(Region::new(0, 0, -5, 10).area(), 0);
    }

    #[rstest]
    #[case::inside(Region::new(1, 1, 2, 2), Region::new(1, 1, 2, 2))]
    #[case::overflow_right(Region::new(8, 0, 5, 5), Region::new(8, 0, 2, 5))]
    #[case::negative_origin(Region::new(-3, -2, 6, 6), Region::new(0, 0, 3, 4))]
    #[case::fully_outside(Region::new(20, 20, 5, 5), Region::new(10, 10, 0, 0))]
    fn test_clamp_to(#[case] input: Region, #[case] expected: Region) {
        assert_eq!(input.clamp_to(10, 10), expected);
    }
}
