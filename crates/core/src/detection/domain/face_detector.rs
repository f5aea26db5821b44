use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for face localization: bounding boxes only, no
/// landmarks or attributes. Used where a cheap box is enough, such as
/// picking the crop for remote enrichment.
///
/// Implementations may be stateful, hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
