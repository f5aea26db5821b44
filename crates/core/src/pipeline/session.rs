use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::pipeline::analysis_result::{AnalysisResult, RemotePatch};
use crate::pipeline::local_analysis::LocalAnalysisUseCase;
use crate::pipeline::remote_enrichment::{RemoteEnrichmentLoop, RemoteOutcome};
use crate::shared::constants::{LOCAL_ANALYSIS_INTERVAL_MS, REMOTE_ENRICHMENT_INTERVAL_MS};
use crate::video::domain::frame_source::FrameSource;

#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    pub local_interval: Duration,
    pub remote_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            local_interval: Duration::from_millis(LOCAL_ANALYSIS_INTERVAL_MS),
            remote_interval: Duration::from_millis(REMOTE_ENRICHMENT_INTERVAL_MS),
        }
    }
}

/// Snapshot handed to the presenter after each local tick.
pub struct DashboardState<'a> {
    pub result: &'a AnalysisResult,
    /// Advisory message while placeholder enrichment values are in effect.
    pub remote_error: Option<&'a str>,
    /// True while an enrichment request is in flight.
    pub enriching: bool,
}

/// Presenter callback; returning `false` stops the session.
pub type PresenterFn = Box<dyn FnMut(&DashboardState) -> bool + Send>;

/// Drives the two analysis cadences over one frame source and owns the
/// single merged result.
///
/// Both cadences publish disjoint-field patches into the owned result on
/// this thread; there is no lock around it. The remote loop's worker only
/// ever reports through its outcome channel, drained here before each
/// tick. Ordering between a local patch and a drained remote patch is
/// deliberately unspecified; the field groups are disjoint.
pub struct AnalysisSession {
    source: Box<dyn FrameSource>,
    local: LocalAnalysisUseCase,
    remote: RemoteEnrichmentLoop,
    result: AnalysisResult,
    remote_error: Option<String>,
    config: SessionConfig,
    cancelled: Arc<AtomicBool>,
}

impl AnalysisSession {
    pub fn new(
        source: Box<dyn FrameSource>,
        local: LocalAnalysisUseCase,
        remote: RemoteEnrichmentLoop,
        config: SessionConfig,
    ) -> Self {
        Self {
            source,
            local,
            remote,
            result: AnalysisResult::default(),
            remote_error: None,
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops the loop from another thread. An in-flight
    /// enrichment request is allowed to complete; its outcome is discarded.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    /// Runs until cancelled, stopped by the presenter, or the source ends.
    /// The source is released on every exit path.
    pub fn run(&mut self, mut on_update: PresenterFn) {
        let now = Instant::now();
        let mut next_local = now + self.config.local_interval;
        let mut next_remote = now + self.config.remote_interval;

        while !self.cancelled.load(Ordering::Relaxed) && self.source.is_open() {
            let now = Instant::now();

            if now >= next_remote {
                self.apply_remote_outcomes();
                self.remote.fire(self.source.as_ref());
                next_remote = now + self.config.remote_interval;
            }

            if now >= next_local {
                self.apply_remote_outcomes();
                if let Err(e) = self.local.tick(self.source.as_mut(), &mut self.result) {
                    // Taxonomy (c): a bad frame is dropped, the loop lives.
                    log::warn!("frame analysis failed, skipping frame: {e}");
                }

                let state = DashboardState {
                    result: &self.result,
                    remote_error: self.remote_error.as_deref(),
                    enriching: self.remote.is_busy(),
                };
                if !on_update(&state) {
                    break;
                }
                next_local = now + self.config.local_interval;
            }

            let wake = next_local.min(next_remote);
            let now = Instant::now();
            if wake > now {
                std::thread::sleep(wake - now);
            }
        }

        self.source.close();
    }

    fn apply_remote_outcomes(&mut self) {
        for outcome in self.remote.drain() {
            match outcome {
                RemoteOutcome::Enriched(patch) => {
                    self.result.apply_remote(patch);
                    self.remote_error = None;
                }
                RemoteOutcome::Failed { message } => {
                    log::warn!("remote enrichment failed: {message}");
                    self.remote_error = Some(message);
                    self.result.apply_remote(RemotePatch::simulated());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::domain::attribute_client::{AttributeClient, AttributeError};
    use crate::attributes::domain::raw::{
        DetectResponse, EthnicityAttr, FaceAttributes, RemoteFace,
    };
    use crate::detection::domain::expression::ExpressionScores;
    use crate::detection::domain::face_analyzer::{FaceAnalyzer, FaceObservation, Gender};
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::detection::domain::face_landmarks::FaceLandmarks;
    use crate::overlay::domain::overlay_renderer::OverlayRenderer;
    use crate::shared::frame::Frame;
    use crate::shared::region::Region;
    use std::sync::Mutex;

    // --- Stubs ---

    struct StubSource {
        frame: Option<Frame>,
        closed: Arc<AtomicBool>,
        open: Arc<AtomicBool>,
    }

    impl StubSource {
        fn new() -> Self {
            Self {
                frame: Some(Frame::new(vec![0u8; 64 * 48 * 3], 64, 48, 3, 0)),
                closed: Arc::new(AtomicBool::new(false)),
                open: Arc::new(AtomicBool::new(true)),
            }
        }
    }

    impl FrameSource for StubSource {
        fn ready(&self) -> bool {
            true
        }
        fn latest(&self) -> Option<Frame> {
            self.frame.clone()
        }
        fn display_size(&self) -> (u32, u32) {
            (64, 48)
        }
        fn is_open(&self) -> bool {
            self.open.load(Ordering::Relaxed)
        }
        fn close(&mut self) {
            self.closed.store(true, Ordering::Relaxed);
            self.open.store(false, Ordering::Relaxed);
        }
    }

    /// Returns a face for the first `faces_until` calls, then none.
    struct CountingAnalyzer {
        calls: usize,
        faces_until: usize,
    }

    impl FaceAnalyzer for CountingAnalyzer {
        fn analyze(
            &mut self,
            _frame: &Frame,
        ) -> Result<Vec<FaceObservation>, Box<dyn std::error::Error>> {
            self.calls += 1;
            if self.calls > self.faces_until {
                return Ok(vec![]);
            }
            Ok(vec![FaceObservation {
                region: Region::new(8, 8, 24, 24, 0.9),
                landmarks: FaceLandmarks::default(),
                expressions: ExpressionScores {
                    happy: 0.9,
                    ..Default::default()
                },
                age: 30.0,
                gender: Gender::Male,
                gender_probability: 0.9,
            }])
        }
    }

    struct NullRenderer;

    impl OverlayRenderer for NullRenderer {
        fn match_dimensions(&mut self, _width: u32, _height: u32) {}
        fn clear(&mut self) {}
        fn draw_box(&mut self, _region: &Region) {}
        fn draw_landmarks(&mut self, _landmarks: &FaceLandmarks) {}
        fn draw_expression_bars(&mut self, _region: &Region, _scores: &ExpressionScores) {}
        fn draw_label(&mut self, _region: &Region, _lines: &[String]) {}
    }

    struct StubDetector;

    impl FaceDetector for StubDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            Ok(vec![Region::new(8, 8, 24, 24, 0.9)])
        }
    }

    struct StubClient {
        fail: bool,
        calls: Mutex<usize>,
    }

    impl AttributeClient for StubClient {
        fn detect_face(&self, _jpeg: &[u8]) -> Result<DetectResponse, AttributeError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(AttributeError::Http { status: 500 });
            }
            Ok(DetectResponse {
                faces: vec![RemoteFace {
                    face_token: None,
                    attributes: FaceAttributes {
                        ethnicity: Some(EthnicityAttr {
                            value: "ASIAN".to_string(),
                            confidence: 90.0,
                        }),
                        ..Default::default()
                    },
                }],
                request_id: None,
            })
        }

        fn analyze_face(&self, _face_token: &str) -> Result<DetectResponse, AttributeError> {
            Ok(DetectResponse::default())
        }

        fn status(&self) -> bool {
            true
        }
    }

    fn session(faces_until: usize, client_fails: bool) -> (AnalysisSession, Arc<AtomicBool>) {
        let source = StubSource::new();
        let closed = source.closed.clone();
        let local = LocalAnalysisUseCase::new(
            Box::new(CountingAnalyzer {
                calls: 0,
                faces_until,
            }),
            Box::new(NullRenderer),
        );
        let remote = RemoteEnrichmentLoop::new(
            Box::new(StubDetector),
            Arc::new(StubClient {
                fail: client_fails,
                calls: Mutex::new(0),
            }),
        );
        let config = SessionConfig {
            local_interval: Duration::from_millis(2),
            remote_interval: Duration::from_millis(5),
        };
        (AnalysisSession::new(Box::new(source), local, remote, config), closed)
    }

    // --- Tests ---

    #[test]
    fn test_presenter_false_stops_and_closes_source() {
        let (mut s, closed) = session(usize::MAX, false);
        let mut updates = 0;
        s.run(Box::new(move |_state| {
            updates += 1;
            updates < 3
        }));
        assert!(closed.load(Ordering::Relaxed));
    }

    #[test]
    fn test_cancel_handle_stops_the_loop() {
        let (mut s, closed) = session(usize::MAX, false);
        s.cancel_handle().store(true, Ordering::Relaxed);
        s.run(Box::new(|_state| true));
        assert!(closed.load(Ordering::Relaxed));
    }

    #[test]
    fn test_local_fields_populated_from_ticks() {
        let (mut s, _closed) = session(usize::MAX, false);
        let seen = Arc::new(AtomicBool::new(false));
        let seen_in = seen.clone();
        s.run(Box::new(move |state| {
            if state.result.age == Some(30) {
                seen_in.store(true, Ordering::Relaxed);
                return false;
            }
            true
        }));
        assert!(seen.load(Ordering::Relaxed));
    }

    #[test]
    fn test_remote_patch_merges_with_local_fields() {
        let (mut s, _closed) = session(usize::MAX, false);
        let mut updates = 0;
        let merged = Arc::new(AtomicBool::new(false));
        let merged_in = merged.clone();
        s.run(Box::new(move |state| {
            updates += 1;
            if state.result.ethnicity.as_deref() == Some("Châu Á")
                && state.result.age.is_some()
            {
                merged_in.store(true, Ordering::Relaxed);
                return false;
            }
            updates < 500
        }));
        assert!(merged.load(Ordering::Relaxed));
        // A clean merge carries the real label, not the placeholder.
        assert!(!s
            .result()
            .ethnicity
            .as_deref()
            .unwrap_or_default()
            .contains("mô phỏng"));
    }

    #[test]
    fn test_remote_failure_sets_placeholders_and_banner() {
        let (mut s, _closed) = session(usize::MAX, true);
        let mut updates = 0;
        let seen = Arc::new(AtomicBool::new(false));
        let seen_in = seen.clone();
        s.run(Box::new(move |state| {
            updates += 1;
            if state.remote_error.is_some() {
                assert_eq!(
                    state.result.ethnicity.as_deref(),
                    Some("Châu Á (mô phỏng)")
                );
                seen_in.store(true, Ordering::Relaxed);
                return false;
            }
            updates < 500
        }));
        assert!(seen.load(Ordering::Relaxed));
    }

    #[test]
    fn test_local_clear_wins_after_remote_patch() {
        // Faces vanish after 40 ticks: any remote patch applied before
        // that must be wiped by the following local clear.
        let (mut s, _closed) = session(40, false);
        let mut updates = 0;
        let cleared_after_merge = Arc::new(AtomicBool::new(false));
        let flag = cleared_after_merge.clone();
        let mut saw_remote = false;
        s.run(Box::new(move |state| {
            updates += 1;
            if state.result.ethnicity.is_some() {
                saw_remote = true;
            }
            if saw_remote && state.result.is_empty() {
                flag.store(true, Ordering::Relaxed);
                return false;
            }
            updates < 1000
        }));
        assert!(cleared_after_merge.load(Ordering::Relaxed));
    }

    #[test]
    fn test_source_end_terminates_run() {
        let (mut s, closed) = session(usize::MAX, false);
        let handle = s.cancel_handle();
        // Simulate the stream ending shortly after start.
        let stopper = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            handle.store(true, Ordering::Relaxed);
        });
        s.run(Box::new(|_state| true));
        stopper.join().unwrap();
        assert!(closed.load(Ordering::Relaxed));
    }
}
