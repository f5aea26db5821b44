use crate::detection::domain::expression::ExpressionScores;
use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full per-face inference output for one frame: box, keypoints,
/// expression distribution, and demographic estimates.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceObservation {
    pub region: Region,
    pub landmarks: FaceLandmarks,
    pub expressions: ExpressionScores,
    /// Estimated age in years (continuous, not a bracket).
    pub age: f64,
    pub gender: Gender,
    /// Confidence of the gender estimate, `0..=1`.
    pub gender_probability: f64,
}

impl FaceObservation {
    /// Maps all geometry from frame space to another space (e.g. the
    /// display surface). Non-geometric fields are unchanged.
    pub fn scaled(&self, sx: f64, sy: f64) -> FaceObservation {
        FaceObservation {
            region: self.region.scaled(sx, sy),
            landmarks: self.landmarks.scaled(sx, sy),
            expressions: self.expressions.clone(),
            age: self.age,
            gender: self.gender,
            gender_probability: self.gender_probability,
        }
    }
}

/// Domain interface for full on-device inference over one frame:
/// localization plus landmarks, expressions, and age/gender per face.
///
/// Implementations may be stateful, hence `&mut self`.
pub trait FaceAnalyzer: Send {
    fn analyze(&mut self, frame: &Frame) -> Result<Vec<FaceObservation>, Box<dyn std::error::Error>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scaled_maps_region_and_landmarks() {
        let obs = FaceObservation {
            region: Region::new(10, 20, 40, 60, 0.9),
            landmarks: FaceLandmarks::new(vec![(10.0, 20.0)]),
            expressions: ExpressionScores::default(),
            age: 31.4,
            gender: Gender::Female,
            gender_probability: 0.8,
        };

        let scaled = obs.scaled(2.0, 0.5);
        assert_eq!(scaled.region.x, 20);
        assert_eq!(scaled.region.height, 30);
        assert_relative_eq!(scaled.landmarks.points()[0].0, 20.0);
        assert_relative_eq!(scaled.landmarks.points()[0].1, 10.0);
        // Non-geometric fields untouched
        assert_relative_eq!(scaled.age, 31.4);
        assert_eq!(scaled.gender, Gender::Female);
    }

    #[test]
    fn test_gender_labels() {
        assert_eq!(Gender::Male.as_str(), "male");
        assert_eq!(Gender::Female.to_string(), "female");
    }
}
