use crate::detection::domain::face_analyzer::{FaceAnalyzer, FaceObservation};
use crate::overlay::domain::overlay_renderer::OverlayRenderer;
use crate::pipeline::analysis_result::{AnalysisResult, LocalPatch};
use crate::video::domain::frame_source::FrameSource;

/// What a single local tick did.
#[derive(Clone, Debug, PartialEq)]
pub enum LocalTick {
    /// Source not ready or display has no size; nothing ran.
    Skipped,
    /// Zero faces detected; the result was reset to empty.
    Cleared,
    /// At least one face annotated; the primary face's patch was applied.
    Annotated { faces: usize, patch: LocalPatch },
}

/// One firing of the on-device detection/annotation cadence.
///
/// Runs full inference over the latest frame, redraws the overlay in
/// display space, and patches the local-origin result fields from the
/// primary (first-detected) face.
pub struct LocalAnalysisUseCase {
    analyzer: Box<dyn FaceAnalyzer>,
    renderer: Box<dyn OverlayRenderer>,
    matched_size: Option<(u32, u32)>,
}

impl LocalAnalysisUseCase {
    pub fn new(analyzer: Box<dyn FaceAnalyzer>, renderer: Box<dyn OverlayRenderer>) -> Self {
        Self {
            analyzer,
            renderer,
            matched_size: None,
        }
    }

    pub fn tick(
        &mut self,
        source: &mut dyn FrameSource,
        result: &mut AnalysisResult,
    ) -> Result<LocalTick, Box<dyn std::error::Error>> {
        if !source.ready() {
            return Ok(LocalTick::Skipped);
        }
        let (display_w, display_h) = source.display_size();
        if display_w == 0 || display_h == 0 {
            return Ok(LocalTick::Skipped);
        }
        let Some(frame) = source.latest() else {
            return Ok(LocalTick::Skipped);
        };

        if self.matched_size != Some((display_w, display_h)) {
            self.renderer.match_dimensions(display_w, display_h);
            self.matched_size = Some((display_w, display_h));
        }

        let observations = self.analyzer.analyze(&frame)?;

        let sx = display_w as f64 / frame.width() as f64;
        let sy = display_h as f64 / frame.height() as f64;

        self.renderer.clear();
        for obs in &observations {
            let display = obs.scaled(sx, sy);
            self.renderer.draw_box(&display.region);
            self.renderer.draw_landmarks(&display.landmarks);
            self.renderer
                .draw_expression_bars(&display.region, &display.expressions);
            self.renderer
                .draw_label(&display.region, &label_lines(&display));
        }

        // Primary face: the detector's first result, in its native order.
        match observations.first() {
            Some(primary) => {
                let patch = LocalPatch::from_observation(primary);
                result.apply_local(patch.clone());
                Ok(LocalTick::Annotated {
                    faces: observations.len(),
                    patch,
                })
            }
            None => {
                result.clear();
                Ok(LocalTick::Cleared)
            }
        }
    }
}

/// Two label lines drawn at the box's bottom-left corner, matching the
/// on-canvas format: gender with probability, then rounded age.
fn label_lines(obs: &FaceObservation) -> Vec<String> {
    let pct = (obs.gender_probability.clamp(0.0, 1.0) * 100.0).round() as u32;
    vec![
        format!("{} ({pct}%)", obs.gender),
        format!("{} tuổi", obs.age.round().max(0.0) as u32),
    ]
}
