use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use crate::attributes::domain::attribute_client::AttributeClient;
use crate::detection::domain::face_detector::FaceDetector;
use crate::pipeline::analysis_result::RemotePatch;
use crate::shared::constants::MIN_REMOTE_CROP;
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::FrameSource;

/// User-facing advisory shown while placeholder values are in effect.
pub const REMOTE_FAILURE_MESSAGE: &str =
    "Không thể kết nối đến dịch vụ phân tích nâng cao. Đang sử dụng kết quả mô phỏng.";

/// Result of a settled enrichment firing, delivered over the outcome
/// channel and applied by the session loop.
#[derive(Clone, Debug, PartialEq)]
pub enum RemoteOutcome {
    Enriched(RemotePatch),
    Failed { message: String },
}

/// The slow cadence: crops the current best face and sends it to the
/// remote attribute service, at most one request in flight.
///
/// Localization, cropping, and encoding run on the caller's thread (all
/// on-device and fast); only the network call is dispatched to a worker.
/// The busy flag is claimed before dispatch and released by a drop guard
/// when the request settles, success or failure, so a wedged worker can
/// never be mistaken for an idle one.
pub struct RemoteEnrichmentLoop {
    detector: Box<dyn FaceDetector>,
    client: Arc<dyn AttributeClient>,
    busy: Arc<AtomicBool>,
    outcome_tx: Sender<RemoteOutcome>,
    outcome_rx: Receiver<RemoteOutcome>,
}

impl RemoteEnrichmentLoop {
    pub fn new(detector: Box<dyn FaceDetector>, client: Arc<dyn AttributeClient>) -> Self {
        let (outcome_tx, outcome_rx) = crossbeam_channel::unbounded();
        Self {
            detector,
            client,
            busy: Arc::new(AtomicBool::new(false)),
            outcome_tx,
            outcome_rx,
        }
    }

    /// True while a request is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Settled outcomes since the last drain, oldest first.
    pub fn drain(&self) -> Vec<RemoteOutcome> {
        self.outcome_rx.try_iter().collect()
    }

    /// One firing of the enrichment cadence. A no-op unless a decoded
    /// frame exists and no prior request is in flight. Zero detected faces
    /// end the firing with no outcome at all.
    pub fn fire(&mut self, source: &dyn FrameSource) {
        if self.busy.load(Ordering::SeqCst) {
            return;
        }
        let Some(frame) = source.latest() else {
            return;
        };

        let regions = match self.detector.detect(&frame) {
            Ok(regions) => regions,
            Err(e) => {
                log::warn!("enrichment localization failed: {e}");
                self.fail();
                return;
            }
        };
        let Some(region) = regions.first() else {
            return;
        };

        let crop_box =
            region.expanded_to_min(MIN_REMOTE_CROP, frame.width() as i32, frame.height() as i32);
        let Some(crop) = frame.crop(crop_box.x, crop_box.y, crop_box.width, crop_box.height)
        else {
            log::warn!("enrichment crop fell outside the frame");
            self.fail();
            return;
        };

        let jpeg = match encode_jpeg(&crop) {
            Ok(bytes) if !bytes.is_empty() => bytes,
            Ok(_) => {
                log::warn!("enrichment crop encoded to zero bytes");
                self.fail();
                return;
            }
            Err(e) => {
                log::warn!("enrichment crop encoding failed: {e}");
                self.fail();
                return;
            }
        };

        self.busy.store(true, Ordering::SeqCst);
        let busy = self.busy.clone();
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();

        thread::spawn(move || {
            let _guard = BusyGuard(busy);
            match client.detect_face(&jpeg) {
                Ok(response) => {
                    // No face entries: the firing ends silently, exactly
                    // like a local zero-face detection.
                    if let Some(face) = response.faces.first() {
                        let patch = RemotePatch::from_attributes(&face.attributes);
                        // Send failure means the session is gone; the
                        // result is discarded silently.
                        let _ = tx.send(RemoteOutcome::Enriched(patch));
                    }
                }
                Err(e) => {
                    log::warn!("remote attribute request failed: {e}");
                    let _ = tx.send(RemoteOutcome::Failed {
                        message: REMOTE_FAILURE_MESSAGE.to_string(),
                    });
                }
            }
        });
    }

    fn fail(&self) {
        let _ = self.outcome_tx.send(RemoteOutcome::Failed {
            message: REMOTE_FAILURE_MESSAGE.to_string(),
        });
    }
}

/// Releases the busy flag when the request settles, on every path.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn encode_jpeg(frame: &Frame) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or("crop buffer does not match its dimensions")?;
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)?;
    Ok(bytes)
}
