use std::path::Path;

use crate::detection::domain::expression::ExpressionScores;
use crate::detection::domain::face_analyzer::{FaceAnalyzer, FaceObservation, Gender};
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_landmarks::{FaceLandmarks, LANDMARK_COUNT};
use crate::detection::infrastructure::execution_provider::preferred_execution_providers;
use crate::detection::infrastructure::onnx_blazeface_detector::OnnxBlazefaceDetector;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Landmark head input resolution.
const LANDMARK_INPUT: u32 = 112;

/// FER+ expression head input resolution (grayscale).
const EXPRESSION_INPUT: u32 = 64;

/// Age/gender head input resolution.
const DEMOGRAPHIC_INPUT: u32 = 224;

/// Caffe-style BGR channel means for the age/gender nets.
const DEMOGRAPHIC_MEAN: [f32; 3] = [104.0, 117.0, 123.0];

/// Midpoints of the eight age brackets the age head classifies into.
const AGE_BRACKET_MIDPOINTS: [f64; 8] = [1.0, 5.0, 10.0, 17.5, 28.5, 40.5, 50.5, 80.0];

pub struct AnalyzerModelPaths<'a> {
    pub detector: &'a Path,
    pub landmarks: &'a Path,
    pub expression: &'a Path,
    pub age: &'a Path,
    pub gender: &'a Path,
}

/// Full on-device inference: BlazeFace localization plus three per-face
/// ONNX heads (68 landmarks, FER+ expression, age/gender).
///
/// Each detected face is cut to a square chip around its box; every head
/// consumes a resized copy of that chip. A head failure fails the whole
/// frame, which the session treats as a skipped frame.
pub struct OnnxFaceAnalyzer {
    localizer: OnnxBlazefaceDetector,
    landmark_session: ort::session::Session,
    expression_session: ort::session::Session,
    age_session: ort::session::Session,
    gender_session: ort::session::Session,
}

impl OnnxFaceAnalyzer {
    pub fn new(
        paths: &AnalyzerModelPaths<'_>,
        confidence: f64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            localizer: OnnxBlazefaceDetector::new(paths.detector, confidence)?,
            landmark_session: load_session(paths.landmarks)?,
            expression_session: load_session(paths.expression)?,
            age_session: load_session(paths.age)?,
            gender_session: load_session(paths.gender)?,
        })
    }

    fn run_landmarks(
        &mut self,
        chip: &Frame,
        chip_box: &Region,
    ) -> Result<FaceLandmarks, Box<dyn std::error::Error>> {
        let tensor = chip_tensor_rgb(chip, LANDMARK_INPUT, 1.0 / 255.0, None);
        let outputs = self
            .landmark_session
            .run(ort::inputs![ort::value::Tensor::from_array(tensor)?])?;
        let raw = outputs[0].try_extract_array::<f32>()?;
        let raw = raw.as_slice().ok_or("Cannot get landmark slice")?;
        Ok(decode_landmarks(raw, chip_box))
    }

    fn run_expression(
        &mut self,
        chip: &Frame,
    ) -> Result<ExpressionScores, Box<dyn std::error::Error>> {
        let tensor = chip_tensor_gray(chip, EXPRESSION_INPUT);
        let outputs = self
            .expression_session
            .run(ort::inputs![ort::value::Tensor::from_array(tensor)?])?;
        let raw = outputs[0].try_extract_array::<f32>()?;
        let raw = raw.as_slice().ok_or("Cannot get expression slice")?;
        Ok(ferplus_scores(&softmax(raw)))
    }

    fn run_age(&mut self, chip: &Frame) -> Result<f64, Box<dyn std::error::Error>> {
        let tensor = chip_tensor_rgb(chip, DEMOGRAPHIC_INPUT, 1.0, Some(DEMOGRAPHIC_MEAN));
        let outputs = self
            .age_session
            .run(ort::inputs![ort::value::Tensor::from_array(tensor)?])?;
        let raw = outputs[0].try_extract_array::<f32>()?;
        let raw = raw.as_slice().ok_or("Cannot get age slice")?;
        Ok(expected_age(&softmax(raw)))
    }

    fn run_gender(&mut self, chip: &Frame) -> Result<(Gender, f64), Box<dyn std::error::Error>> {
        let tensor = chip_tensor_rgb(chip, DEMOGRAPHIC_INPUT, 1.0, Some(DEMOGRAPHIC_MEAN));
        let outputs = self
            .gender_session
            .run(ort::inputs![ort::value::Tensor::from_array(tensor)?])?;
        let raw = outputs[0].try_extract_array::<f32>()?;
        let raw = raw.as_slice().ok_or("Cannot get gender slice")?;
        Ok(decode_gender(&softmax(raw)))
    }
}

impl FaceAnalyzer for OnnxFaceAnalyzer {
    fn analyze(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<FaceObservation>, Box<dyn std::error::Error>> {
        let regions = self.localizer.detect(frame)?;
        let mut observations = Vec::with_capacity(regions.len());

        for region in regions {
            let chip_box = square_chip(&region, frame.width() as i32, frame.height() as i32);
            let Some(chip) = frame.crop(chip_box.x, chip_box.y, chip_box.width, chip_box.height)
            else {
                continue;
            };

            let landmarks = self.run_landmarks(&chip, &chip_box)?;
            let expressions = self.run_expression(&chip)?;
            let age = self.run_age(&chip)?;
            let (gender, gender_probability) = self.run_gender(&chip)?;

            observations.push(FaceObservation {
                region,
                landmarks,
                expressions,
                age,
                gender,
                gender_probability,
            });
        }

        Ok(observations)
    }
}

fn load_session(path: &Path) -> Result<ort::session::Session, Box<dyn std::error::Error>> {
    Ok(ort::session::Session::builder()?
        .with_execution_providers(preferred_execution_providers())?
        .commit_from_file(path)?)
}

// ---------------------------------------------------------------------------
// Chip geometry
// ---------------------------------------------------------------------------

/// Square box of side `max(w, h)` centered on the region, clamped to the
/// frame.
fn square_chip(region: &Region, frame_w: i32, frame_h: i32) -> Region {
    let side = region.width.max(region.height).min(frame_w).min(frame_h);
    let cx = region.x + region.width / 2;
    let cy = region.y + region.height / 2;
    let x = (cx - side / 2).clamp(0, frame_w - side);
    let y = (cy - side / 2).clamp(0, frame_h - side);
    Region {
        x,
        y,
        width: side,
        height: side,
        score: region.score,
    }
}

// ---------------------------------------------------------------------------
// Tensor preparation
// ---------------------------------------------------------------------------

/// Resize the chip to `size × size` NCHW float32, scaled by `scale` with an
/// optional per-channel mean subtracted (in BGR order, Caffe-style).
fn chip_tensor_rgb(
    chip: &Frame,
    size: u32,
    scale: f32,
    bgr_mean: Option<[f32; 3]>,
) -> ndarray::Array4<f32> {
    let src = chip.as_ndarray();
    let src_h = chip.height() as usize;
    let src_w = chip.width() as usize;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));
    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                let value = match bgr_mean {
                    // Mean-subtracted nets read channels as BGR.
                    Some(mean) => src[[src_y, src_x, 2 - c]] as f32 - mean[c],
                    None => src[[src_y, src_x, c]] as f32,
                };
                tensor[[0, c, y, x]] = value * scale;
            }
        }
    }
    tensor
}

/// Resize the chip to `size × size` single-channel float32, raw 0-255 luma.
fn chip_tensor_gray(chip: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = chip.as_ndarray();
    let src_h = chip.height() as usize;
    let src_w = chip.width() as usize;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 1, s, s));
    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            let r = src[[src_y, src_x, 0]] as f32;
            let g = src[[src_y, src_x, 1]] as f32;
            let b = src[[src_y, src_x, 2]] as f32;
            tensor[[0, 0, y, x]] = 0.299 * r + 0.587 * g + 0.114 * b;
        }
    }
    tensor
}

// ---------------------------------------------------------------------------
// Output decoding
// ---------------------------------------------------------------------------

fn softmax(xs: &[f32]) -> Vec<f32> {
    let max = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = xs.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|&e| e / sum).collect()
}

/// Maps normalized `[x0, y0, x1, y1, ...]` landmark output (chip-relative,
/// 0..1) into frame coordinates.
fn decode_landmarks(raw: &[f32], chip_box: &Region) -> FaceLandmarks {
    let count = (raw.len() / 2).min(LANDMARK_COUNT);
    let points = (0..count)
        .map(|i| {
            (
                chip_box.x as f64 + raw[i * 2] as f64 * chip_box.width as f64,
                chip_box.y as f64 + raw[i * 2 + 1] as f64 * chip_box.height as f64,
            )
        })
        .collect();
    FaceLandmarks::new(points)
}

/// FER+ class order: neutral, happiness, surprise, sadness, anger,
/// disgust, fear, contempt. Contempt has no dashboard counterpart and is
/// dropped.
fn ferplus_scores(probs: &[f32]) -> ExpressionScores {
    let p = |i: usize| probs.get(i).copied().unwrap_or(0.0) as f64;
    ExpressionScores {
        neutral: p(0),
        happy: p(1),
        surprised: p(2),
        sad: p(3),
        angry: p(4),
        disgusted: p(5),
        fearful: p(6),
    }
}

/// Expected age over the bracket distribution; smoother than taking the
/// top bracket alone.
fn expected_age(probs: &[f32]) -> f64 {
    probs
        .iter()
        .zip(AGE_BRACKET_MIDPOINTS.iter())
        .map(|(&p, &mid)| p as f64 * mid)
        .sum()
}

/// Gender head class order: male, female.
fn decode_gender(probs: &[f32]) -> (Gender, f64) {
    let male = probs.first().copied().unwrap_or(0.0) as f64;
    let female = probs.get(1).copied().unwrap_or(0.0) as f64;
    if male >= female {
        (Gender::Male, male)
    } else {
        (Gender::Female, female)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ── Chip geometry ────────────────────────────────────────────────

    #[test]
    fn test_square_chip_uses_max_side() {
        let chip = square_chip(&Region::new(40, 35, 10, 30, 0.9), 100, 100);
        assert_eq!((chip.width, chip.height), (30, 30));
        // Centered on (45, 50)
        assert_eq!((chip.x, chip.y), (30, 35));
    }

    #[test]
    fn test_square_chip_clamps_to_frame() {
        let chip = square_chip(&Region::new(90, 90, 20, 20, 0.9), 100, 100);
        assert_eq!((chip.width, chip.height), (20, 20));
        assert_eq!((chip.x, chip.y), (80, 80));
    }

    #[test]
    fn test_square_chip_larger_than_frame_shrinks() {
        let chip = square_chip(&Region::new(0, 0, 200, 200, 0.9), 100, 80);
        assert_eq!((chip.width, chip.height), (80, 80));
    }

    // ── Tensors ──────────────────────────────────────────────────────

    fn solid_chip(r: u8, g: u8, b: u8) -> Frame {
        let mut data = Vec::with_capacity(16 * 16 * 3);
        for _ in 0..(16 * 16) {
            data.extend_from_slice(&[r, g, b]);
        }
        Frame::new(data, 16, 16, 3, 0)
    }

    #[test]
    fn test_chip_tensor_rgb_shape_and_scale() {
        let tensor = chip_tensor_rgb(&solid_chip(255, 0, 0), 112, 1.0 / 255.0, None);
        assert_eq!(tensor.shape(), &[1, 3, 112, 112]);
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 1.0);
        assert_relative_eq!(tensor[[0, 1, 0, 0]], 0.0);
    }

    #[test]
    fn test_chip_tensor_rgb_mean_subtraction_is_bgr() {
        // Pixel RGB (10, 20, 30): BGR order means channel 0 reads B=30.
        let tensor = chip_tensor_rgb(&solid_chip(10, 20, 30), 8, 1.0, Some([104.0, 117.0, 123.0]));
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 30.0 - 104.0);
        assert_relative_eq!(tensor[[0, 1, 0, 0]], 20.0 - 117.0);
        assert_relative_eq!(tensor[[0, 2, 0, 0]], 10.0 - 123.0);
    }

    #[test]
    fn test_chip_tensor_gray_luma() {
        let tensor = chip_tensor_gray(&solid_chip(100, 100, 100), 64);
        assert_eq!(tensor.shape(), &[1, 1, 64, 64]);
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 100.0, epsilon = 0.01);
    }

    // ── Decoding ─────────────────────────────────────────────────────

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_is_shift_invariant() {
        let a = softmax(&[1.0, 2.0]);
        let b = softmax(&[1001.0, 1002.0]);
        assert!((a[0] - b[0]).abs() < 1e-6);
    }

    #[test]
    fn test_decode_landmarks_maps_to_frame_space() {
        let chip_box = Region::new(100, 50, 200, 200, 0.9);
        let lm = decode_landmarks(&[0.0, 0.0, 0.5, 0.5, 1.0, 1.0], &chip_box);
        assert_eq!(lm.points().len(), 3);
        assert_relative_eq!(lm.points()[0].0, 100.0);
        assert_relative_eq!(lm.points()[1].0, 200.0);
        assert_relative_eq!(lm.points()[1].1, 150.0);
        assert_relative_eq!(lm.points()[2].1, 250.0);
    }

    #[test]
    fn test_decode_landmarks_caps_at_landmark_count() {
        let raw = vec![0.5f32; (LANDMARK_COUNT + 10) * 2];
        let lm = decode_landmarks(&raw, &Region::new(0, 0, 100, 100, 1.0));
        assert_eq!(lm.points().len(), LANDMARK_COUNT);
    }

    #[test]
    fn test_ferplus_mapping_drops_contempt() {
        //                 neu  hap  sur  sad  ang  dis  fea  con
        let probs = [0.1, 0.2, 0.3, 0.05, 0.05, 0.1, 0.1, 0.1];
        let scores = ferplus_scores(&probs);
        assert_relative_eq!(scores.neutral, 0.1, epsilon = 1e-6);
        assert_relative_eq!(scores.happy, 0.2, epsilon = 1e-6);
        assert_relative_eq!(scores.surprised, 0.3, epsilon = 1e-6);
        assert_relative_eq!(scores.sad, 0.05, epsilon = 1e-6);
        assert_relative_eq!(scores.fearful, 0.1, epsilon = 1e-6);
        // Contempt (last class) appears nowhere.
        let total = scores.happy
            + scores.sad
            + scores.angry
            + scores.surprised
            + scores.fearful
            + scores.disgusted
            + scores.neutral;
        assert_relative_eq!(total, 0.9, epsilon = 1e-6);
    }

    #[test]
    fn test_expected_age_weighted_midpoints() {
        let mut probs = [0.0f32; 8];
        probs[4] = 1.0; // 25-32 bracket
        assert_relative_eq!(expected_age(&probs), 28.5);

        let mut split = [0.0f32; 8];
        split[4] = 0.5;
        split[5] = 0.5; // halfway between 28.5 and 40.5
        assert_relative_eq!(expected_age(&split), 34.5);
    }

    #[test]
    fn test_decode_gender_picks_larger_class() {
        let (g, p) = decode_gender(&[0.9, 0.1]);
        assert_eq!(g, Gender::Male);
        assert_relative_eq!(p, 0.9, epsilon = 1e-6);

        let (g, p) = decode_gender(&[0.2, 0.8]);
        assert_eq!(g, Gender::Female);
        assert_relative_eq!(p, 0.8, epsilon = 1e-6);
    }
}
