use crate::shared::model_resolver::ModelSpec;

pub const BLAZEFACE_MODEL: ModelSpec = ModelSpec {
    name: "blazeface_short_range.onnx",
    url: "https://github.com/facelens/facelens/releases/download/v0.1.0/blazeface_short_range.onnx",
};

pub const LANDMARK_MODEL: ModelSpec = ModelSpec {
    name: "face_landmarks_68.onnx",
    url: "https://github.com/facelens/facelens/releases/download/v0.1.0/face_landmarks_68.onnx",
};

pub const EXPRESSION_MODEL: ModelSpec = ModelSpec {
    name: "emotion_ferplus.onnx",
    url: "https://github.com/facelens/facelens/releases/download/v0.1.0/emotion_ferplus.onnx",
};

pub const AGE_MODEL: ModelSpec = ModelSpec {
    name: "age_googlenet.onnx",
    url: "https://github.com/facelens/facelens/releases/download/v0.1.0/age_googlenet.onnx",
};

pub const GENDER_MODEL: ModelSpec = ModelSpec {
    name: "gender_googlenet.onnx",
    url: "https://github.com/facelens/facelens/releases/download/v0.1.0/gender_googlenet.onnx",
};

/// Cadence of the on-device detection/annotation tick.
pub const LOCAL_ANALYSIS_INTERVAL_MS: u64 = 200;

/// Cadence of the remote attribute enrichment tick. Kept long to bound
/// calls against the metered upstream API.
pub const REMOTE_ENRICHMENT_INTERVAL_MS: u64 = 3000;

/// Minimum side length of the face crop sent to the remote API,
/// which rejects inputs smaller than 48x48.
pub const MIN_REMOTE_CROP: i32 = 48;

/// Decoded frames required before the source reports ready.
pub const READY_FRAME_THRESHOLD: u64 = 2;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
