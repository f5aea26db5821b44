/// A detected face bounding box in pixel coordinates, with the detector's
/// confidence score.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub score: f64,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32, score: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            score,
        }
    }

    pub fn iou(&self, other: &Region) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = (self.x + self.width).min(other.x + other.width);
        let iy2 = (self.y + self.height).min(other.y + other.height);

        let inter = (ix2 - ix1).max(0) as f64 * (iy2 - iy1).max(0) as f64;
        if inter == 0.0 {
            return 0.0;
        }

        let area_a = self.width as f64 * self.height as f64;
        let area_b = other.width as f64 * other.height as f64;
        inter / (area_a + area_b - inter)
    }

    /// Maps the box from one coordinate space to another (e.g. frame space
    /// to display space).
    pub fn scaled(&self, sx: f64, sy: f64) -> Region {
        Region {
            x: (self.x as f64 * sx).round() as i32,
            y: (self.y as f64 * sy).round() as i32,
            width: (self.width as f64 * sx).round() as i32,
            height: (self.height as f64 * sy).round() as i32,
            score: self.score,
        }
    }

    /// Grows the box to at least `min` per side (anchored at the top-left,
    /// as the upstream API measures crops), then shifts and clamps it so it
    /// stays inside a `frame_w` x `frame_h` frame. A frame smaller than
    /// `min` yields the full frame.
    pub fn expanded_to_min(&self, min: i32, frame_w: i32, frame_h: i32) -> Region {
        let width = self.width.max(min).min(frame_w);
        let height = self.height.max(min).min(frame_h);
        let x = self.x.min(frame_w - width).max(0);
        let y = self.y.min(frame_h - height).max(0);
        Region {
            x,
            y,
            width,
            height,
            score: self.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn region(x: i32, y: i32, w: i32, h: i32) -> Region {
        Region::new(x, y, w, h, 1.0)
    }

    // ── IoU ──────────────────────────────────────────────────────────

    #[test]
    fn test_iou_identical_regions() {
        let a = region(10, 10, 100, 100);
        assert_relative_eq!(a.iou(&a), 1.0);
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = region(0, 0, 50, 50);
        let b = region(100, 100, 50, 50);
        assert_relative_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        // a: [0,0]-[100,100], b: [50,0]-[150,100]
        // intersection: [50,0]-[100,100] = 50*100 = 5000
        // union: 10000 + 10000 - 5000 = 15000
        let a = region(0, 0, 100, 100);
        let b = region(50, 0, 100, 100);
        assert_relative_eq!(a.iou(&b), 5000.0 / 15000.0);
    }

    #[rstest]
    #[case::zero_width(region(0, 0, 0, 100), region(0, 0, 50, 50), 0.0)]
    #[case::zero_height(region(0, 0, 100, 0), region(0, 0, 50, 50), 0.0)]
    #[case::touching_edges(region(0, 0, 50, 50), region(50, 0, 50, 50), 0.0)]
    fn test_iou_degenerate(#[case] a: Region, #[case] b: Region, #[case] expected: f64) {
        assert_relative_eq!(a.iou(&b), expected);
    }

    // ── Scaling ──────────────────────────────────────────────────────

    #[test]
    fn test_scaled_maps_to_display_space() {
        // 640x480 frame shown at 320x240
        let r = region(64, 48, 128, 96).scaled(0.5, 0.5);
        assert_eq!((r.x, r.y, r.width, r.height), (32, 24, 64, 48));
    }

    #[test]
    fn test_scaled_rounds_and_keeps_score() {
        let r = Region::new(3, 3, 3, 3, 0.9).scaled(1.5, 1.5);
        assert_eq!((r.x, r.width), (5, 5)); // 4.5 rounds away from zero
        assert_relative_eq!(r.score, 0.9);
    }

    #[test]
    fn test_scaled_identity() {
        let r = region(10, 20, 30, 40);
        assert_eq!(r.scaled(1.0, 1.0), r);
    }

    // ── Minimum-size expansion ───────────────────────────────────────

    #[test]
    fn test_expanded_to_min_grows_tiny_box() {
        let r = region(100, 100, 10, 10).expanded_to_min(48, 640, 480);
        assert_eq!((r.width, r.height), (48, 48));
        assert_eq!((r.x, r.y), (100, 100));
    }

    #[test]
    fn test_expanded_to_min_keeps_large_box() {
        let r = region(10, 10, 120, 90).expanded_to_min(48, 640, 480);
        assert_eq!((r.x, r.y, r.width, r.height), (10, 10, 120, 90));
    }

    #[test]
    fn test_expanded_to_min_shifts_at_edge() {
        // Box hugging the bottom-right corner must shift up-left to fit.
        let r = region(630, 470, 10, 10).expanded_to_min(48, 640, 480);
        assert_eq!((r.width, r.height), (48, 48));
        assert_eq!((r.x, r.y), (592, 432));
    }

    #[test]
    fn test_expanded_to_min_frame_smaller_than_min() {
        let r = region(5, 5, 10, 10).expanded_to_min(48, 32, 32);
        assert_eq!((r.x, r.y, r.width, r.height), (0, 0, 32, 32));
    }

    #[rstest]
    #[case::one_by_one(region(0, 0, 1, 1))]
    #[case::tall_sliver(region(200, 0, 4, 200))]
    #[case::wide_sliver(region(0, 200, 200, 4))]
    fn test_expanded_never_below_min(#[case] r: Region) {
        let e = r.expanded_to_min(48, 640, 480);
        assert!(e.width >= 48 && e.height >= 48);
        assert!(e.x >= 0 && e.y >= 0);
        assert!(e.x + e.width <= 640 && e.y + e.height <= 480);
    }
}
