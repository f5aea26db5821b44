//! Wire types for the remote face-attribute API, as relayed by the proxy.
//!
//! Every attribute group is optional: the upstream service omits groups it
//! could not compute, and the extractors must stay defensive about that.

use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct DetectResponse {
    #[serde(default)]
    pub faces: Vec<RemoteFace>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RemoteFace {
    #[serde(default)]
    pub face_token: Option<String>,
    #[serde(default)]
    pub attributes: FaceAttributes,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct FaceAttributes {
    #[serde(default)]
    pub ethnicity: Option<EthnicityAttr>,
    #[serde(default)]
    pub skinstatus: Option<SkinStatus>,
    #[serde(default)]
    pub emotion: Option<EmotionScores>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct EthnicityAttr {
    pub value: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Skin-condition sub-scores, each on a 0-100 scale where higher means a
/// stronger defect signal.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SkinStatus {
    #[serde(default)]
    pub dark_circle: f64,
    #[serde(default)]
    pub stain: f64,
    #[serde(default)]
    pub acne: f64,
    #[serde(default)]
    pub health: f64,
}

/// Emotion scores on a 0-100 scale. They need not sum to 100.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct EmotionScores {
    #[serde(default)]
    pub sadness: f64,
    #[serde(default)]
    pub neutral: f64,
    #[serde(default)]
    pub disgust: f64,
    #[serde(default)]
    pub anger: f64,
    #[serde(default)]
    pub surprise: f64,
    #[serde(default)]
    pub fear: f64,
    #[serde(default)]
    pub happiness: f64,
}
