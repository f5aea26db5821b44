use crate::shared::frame::Frame;

/// Domain interface for a live frame supply (webcam or any decodable
/// input). Decoding happens in the background; consumers poll the most
/// recent frame at their own cadence.
pub trait FrameSource: Send {
    /// Buffered-readiness threshold: `true` once enough frames have been
    /// decoded that analysis can run on current data.
    fn ready(&self) -> bool;

    /// The most recent decoded frame, if at least one exists.
    fn latest(&self) -> Option<Frame>;

    /// The size annotations should be rendered at. May differ from the
    /// native capture size when a display override is configured.
    fn display_size(&self) -> (u32, u32);

    /// `false` once the stream has ended or the source was closed.
    fn is_open(&self) -> bool;

    /// Stops decoding and releases the device. Idempotent; must be safe
    /// to call on every exit path.
    fn close(&mut self);
}
