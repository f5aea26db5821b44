/// Points in the standard 68-landmark annotation.
pub const LANDMARK_COUNT: usize = 68;

/// Facial keypoints in pixel coordinates, in the standard iBUG 68-point
/// ordering (jaw 0..17, brows 17..27, nose 27..36, eyes 36..48,
/// mouth 48..68).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceLandmarks {
    points: Vec<(f64, f64)>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Maps all points from one coordinate space to another.
    pub fn scaled(&self, sx: f64, sy: f64) -> FaceLandmarks {
        FaceLandmarks {
            points: self.points.iter().map(|&(x, y)| (x * sx, y * sy)).collect(),
        }
    }
}
