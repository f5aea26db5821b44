use crate::attributes::domain::extractor::{
    extract_ethnicity, extract_physical_state, extract_skin_health,
};
use crate::attributes::domain::raw::FaceAttributes;
use crate::detection::domain::expression::Expression;
use crate::detection::domain::face_analyzer::{FaceObservation, Gender};

/// The merged dashboard result. Exactly one instance exists per session,
/// owned by the session loop.
///
/// Local-origin fields (age, gender, gender_probability, expression) and
/// remote-origin fields (ethnicity, skin_health, physical_state) are
/// patched independently; a patch never touches the other group. The only
/// wholesale reset is [`clear`](Self::clear), issued when a local cycle
/// detects zero faces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisResult {
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    /// Percent, 0..=100.
    pub gender_probability: Option<u32>,
    pub expression: Option<Expression>,
    pub ethnicity: Option<String>,
    pub skin_health: Option<String>,
    pub physical_state: Option<String>,
}

impl AnalysisResult {
    pub fn is_empty(&self) -> bool {
        self.age.is_none()
            && self.gender.is_none()
            && self.gender_probability.is_none()
            && self.expression.is_none()
            && self.ethnicity.is_none()
            && self.skin_health.is_none()
            && self.physical_state.is_none()
    }

    pub fn apply_local(&mut self, patch: LocalPatch) {
        self.age = Some(patch.age);
        self.gender = Some(patch.gender);
        self.gender_probability = Some(patch.gender_probability);
        self.expression = Some(patch.expression);
    }

    pub fn apply_remote(&mut self, patch: RemotePatch) {
        self.ethnicity = Some(patch.ethnicity);
        self.skin_health = Some(patch.skin_health);
        self.physical_state = Some(patch.physical_state);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Fields produced by the on-device analysis tick.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalPatch {
    pub age: u32,
    pub gender: Gender,
    pub gender_probability: u32,
    pub expression: Expression,
}

impl LocalPatch {
    pub fn from_observation(obs: &FaceObservation) -> Self {
        Self {
            age: obs.age.round().max(0.0) as u32,
            gender: obs.gender,
            gender_probability: (obs.gender_probability.clamp(0.0, 1.0) * 100.0).round() as u32,
            expression: obs.expressions.dominant().0,
        }
    }
}

/// Fields produced by a remote enrichment cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct RemotePatch {
    pub ethnicity: String,
    pub skin_health: String,
    pub physical_state: String,
}

impl RemotePatch {
    pub fn from_attributes(attrs: &FaceAttributes) -> Self {
        Self {
            ethnicity: extract_ethnicity(attrs).label,
            skin_health: extract_skin_health(attrs).label,
            physical_state: extract_physical_state(attrs).label,
        }
    }

    /// Deterministic placeholders patched in when enrichment fails, so the
    /// dashboard never shows a blank enrichment field. The suffix marks
    /// them as simulated.
    pub fn simulated() -> Self {
        Self {
            ethnicity: "Châu Á (mô phỏng)".to_string(),
            skin_health: "Khỏe mạnh (mô phỏng)".to_string(),
            physical_state: "Bình thường (mô phỏng)".to_string(),
        }
    }
}
