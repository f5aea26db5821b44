//! Pure mappings from raw remote attributes to dashboard labels.
//!
//! Labels are Vietnamese, matching the dashboard locale. Each extractor is
//! defensive: a missing attribute group yields an explicit unknown result
//! instead of an error.

use crate::attributes::domain::raw::FaceAttributes;

pub const UNKNOWN_LABEL: &str = "Không xác định";

/// A display label with the confidence of the mapping, `0..=1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Extraction {
    pub label: String,
    pub confidence: f64,
}

impl Extraction {
    fn unknown() -> Self {
        Self {
            label: UNKNOWN_LABEL.to_string(),
            confidence: 0.0,
        }
    }
}

/// Maps the upstream ethnicity code to a localized label.
/// Unmapped codes pass through verbatim.
pub fn extract_ethnicity(attrs: &FaceAttributes) -> Extraction {
    let Some(ethnicity) = &attrs.ethnicity else {
        return Extraction::unknown();
    };

    let label = match ethnicity.value.as_str() {
        "ASIAN" => "Châu Á",
        "WHITE" => "Châu Âu",
        "BLACK" => "Châu Phi",
        "INDIA" => "Nam Á",
        other => other,
    };

    Extraction {
        label: label.to_string(),
        confidence: ethnicity.confidence,
    }
}

/// Overall skin health: 100 minus the mean of the four defect sub-scores,
/// banded at 40/60/80.
pub fn extract_skin_health(attrs: &FaceAttributes) -> Extraction {
    let Some(skin) = &attrs.skinstatus else {
        return Extraction::unknown();
    };

    let score = 100.0 - (skin.dark_circle + skin.stain + skin.acne + skin.health) / 4.0;

    let label = if score < 40.0 {
        "Cần cải thiện"
    } else if score < 60.0 {
        "Trung bình"
    } else if score < 80.0 {
        "Tốt"
    } else {
        "Khỏe mạnh"
    };

    Extraction {
        label: label.to_string(),
        confidence: score / 100.0,
    }
}

/// Physical state inferred from the emotion distribution.
///
/// The final branch (no threshold met) intentionally reports "Khỏe mạnh"
/// at 0.7 confidence; the reachable no-signal default is kept as-is.
pub fn extract_physical_state(attrs: &FaceAttributes) -> Extraction {
    let Some(emotion) = &attrs.emotion else {
        return Extraction::unknown();
    };

    if emotion.sadness > 50.0 || emotion.anger > 50.0 || emotion.fear > 50.0 {
        return Extraction {
            label: "Căng thẳng".to_string(),
            confidence: emotion.sadness.max(emotion.anger).max(emotion.fear) / 100.0,
        };
    }
    if emotion.neutral > 70.0 {
        return Extraction {
            label: "Bình thường".to_string(),
            confidence: emotion.neutral / 100.0,
        };
    }
    if emotion.happiness > 50.0 {
        return Extraction {
            label: "Khỏe mạnh".to_string(),
            confidence: emotion.happiness / 100.0,
        };
    }

    Extraction {
        label: "Khỏe mạnh".to_string(),
        confidence: 0.7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::domain::raw::{EmotionScores, EthnicityAttr, SkinStatus};
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn with_ethnicity(value: &str, confidence: f64) -> FaceAttributes {
        FaceAttributes {
            ethnicity: Some(EthnicityAttr {
                value: value.to_string(),
                confidence,
            }),
            ..Default::default()
        }
    }

    fn with_skin(dark_circle: f64, stain: f64, acne: f64, health: f64) -> FaceAttributes {
        FaceAttributes {
            skinstatus: Some(SkinStatus {
                dark_circle,
                stain,
                acne,
                health,
            }),
            ..Default::default()
        }
    }

    fn with_emotion(emotion: EmotionScores) -> FaceAttributes {
        FaceAttributes {
            emotion: Some(emotion),
            ..Default::default()
        }
    }

    // ── Ethnicity ────────────────────────────────────────────────────

    #[rstest]
    #[case::asian("ASIAN", "Châu Á")]
    #[case::white("WHITE", "Châu Âu")]
    #[case::black("BLACK", "Châu Phi")]
    #[case::india("INDIA", "Nam Á")]
    #[case::unmapped_passthrough("OTHER", "OTHER")]
    fn test_ethnicity_table(#[case] code: &str, #[case] label: &str) {
        let result = extract_ethnicity(&with_ethnicity(code, 88.0));
        assert_eq!(result.label, label);
        assert_relative_eq!(result.confidence, 88.0);
    }

    #[test]
    fn test_ethnicity_missing_group() {
        let result = extract_ethnicity(&FaceAttributes::default());
        assert_eq!(result.label, UNKNOWN_LABEL);
        assert_relative_eq!(result.confidence, 0.0);
    }

    // ── Skin health ──────────────────────────────────────────────────

    #[test]
    fn test_skin_perfect_scores_best_band() {
        let result = extract_skin_health(&with_skin(0.0, 0.0, 0.0, 0.0));
        assert_eq!(result.label, "Khỏe mạnh");
        assert_relative_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_skin_worst_scores_worst_band() {
        let result = extract_skin_health(&with_skin(100.0, 100.0, 100.0, 100.0));
        assert_eq!(result.label, "Cần cải thiện");
        assert_relative_eq!(result.confidence, 0.0);
    }

    #[rstest]
    // mean defect 50 → score 50 → middle band
    #[case::middle(50.0, 50.0, 50.0, 50.0, "Trung bình", 0.5)]
    // mean defect 30 → score 70 → good band
    #[case::good(30.0, 30.0, 30.0, 30.0, "Tốt", 0.7)]
    // boundary: score exactly 80 falls into the best band
    #[case::boundary_80(20.0, 20.0, 20.0, 20.0, "Khỏe mạnh", 0.8)]
    // boundary: score exactly 40 falls into the middle band
    #[case::boundary_40(60.0, 60.0, 60.0, 60.0, "Trung bình", 0.4)]
    fn test_skin_bands(
        #[case] dark_circle: f64,
        #[case] stain: f64,
        #[case] acne: f64,
        #[case] health: f64,
        #[case] label: &str,
        #[case] confidence: f64,
    ) {
        let result = extract_skin_health(&with_skin(dark_circle, stain, acne, health));
        assert_eq!(result.label, label);
        assert_relative_eq!(result.confidence, confidence);
    }

    #[test]
    fn test_skin_missing_group() {
        let result = extract_skin_health(&FaceAttributes::default());
        assert_eq!(result.label, UNKNOWN_LABEL);
        assert_relative_eq!(result.confidence, 0.0);
    }

    // ── Physical state ───────────────────────────────────────────────

    #[test]
    fn test_physical_state_stressed_on_anger() {
        let result = extract_physical_state(&with_emotion(EmotionScores {
            anger: 60.0,
            ..Default::default()
        }));
        assert_eq!(result.label, "Căng thẳng");
        assert_relative_eq!(result.confidence, 0.6);
    }

    #[test]
    fn test_physical_state_stressed_takes_max_of_three() {
        let result = extract_physical_state(&with_emotion(EmotionScores {
            sadness: 55.0,
            anger: 60.0,
            fear: 80.0,
            ..Default::default()
        }));
        assert_eq!(result.label, "Căng thẳng");
        assert_relative_eq!(result.confidence, 0.8);
    }

    #[test]
    fn test_physical_state_normal_on_neutral() {
        let result = extract_physical_state(&with_emotion(EmotionScores {
            neutral: 80.0,
            ..Default::default()
        }));
        assert_eq!(result.label, "Bình thường");
        assert_relative_eq!(result.confidence, 0.8);
    }

    #[test]
    fn test_physical_state_healthy_on_happiness() {
        let result = extract_physical_state(&with_emotion(EmotionScores {
            happiness: 60.0,
            neutral: 10.0,
            ..Default::default()
        }));
        assert_eq!(result.label, "Khỏe mạnh");
        assert_relative_eq!(result.confidence, 0.6);
    }

    #[test]
    fn test_physical_state_no_signal_default() {
        // Nothing crosses a threshold: the default branch reports healthy
        // at 0.7, and that branch is reachable on purpose.
        let result = extract_physical_state(&with_emotion(EmotionScores {
            sadness: 10.0,
            neutral: 30.0,
            happiness: 20.0,
            ..Default::default()
        }));
        assert_eq!(result.label, "Khỏe mạnh");
        assert_relative_eq!(result.confidence, 0.7);
    }

    #[test]
    fn test_physical_state_stress_beats_neutral() {
        // Stress check runs first even when neutral is also high.
        let result = extract_physical_state(&with_emotion(EmotionScores {
            fear: 51.0,
            neutral: 90.0,
            ..Default::default()
        }));
        assert_eq!(result.label, "Căng thẳng");
    }

    #[test]
    fn test_physical_state_missing_group() {
        let result = extract_physical_state(&FaceAttributes::default());
        assert_eq!(result.label, UNKNOWN_LABEL);
        assert_relative_eq!(result.confidence, 0.0);
    }
}
