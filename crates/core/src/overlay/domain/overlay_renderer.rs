use crate::detection::domain::expression::ExpressionScores;
use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::region::Region;

/// Domain interface for the annotation surface drawn over the camera feed.
///
/// All coordinates are in display space; callers scale detector output
/// before drawing. One annotated face produces one
/// box → landmarks → bars → label call sequence per tick, after a single
/// `clear`.
pub trait OverlayRenderer: Send {
    /// Resizes the surface to the current display size. Implementations
    /// may drop existing content when the size changes.
    fn match_dimensions(&mut self, width: u32, height: u32);

    /// Erases the whole surface.
    fn clear(&mut self);

    /// Draws a face bounding box.
    fn draw_box(&mut self, region: &Region);

    /// Draws the facial keypoints.
    fn draw_landmarks(&mut self, landmarks: &FaceLandmarks);

    /// Draws the per-class expression bars near the top of the box.
    fn draw_expression_bars(&mut self, region: &Region, scores: &ExpressionScores);

    /// Draws text lines anchored at the box's bottom-left corner.
    fn draw_label(&mut self, region: &Region, lines: &[String]);
}
