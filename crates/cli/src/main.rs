use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use facelens_core::attributes::domain::attribute_client::AttributeClient;
use facelens_core::attributes::infrastructure::http_attribute_client::HttpAttributeClient;
use facelens_core::detection::infrastructure::onnx_blazeface_detector::{
    OnnxBlazefaceDetector, DEFAULT_CONFIDENCE,
};
use facelens_core::detection::infrastructure::onnx_face_analyzer::{
    AnalyzerModelPaths, OnnxFaceAnalyzer,
};
use facelens_core::overlay::infrastructure::frame_overlay_renderer::FrameOverlayRenderer;
use facelens_core::pipeline::local_analysis::LocalAnalysisUseCase;
use facelens_core::pipeline::remote_enrichment::RemoteEnrichmentLoop;
use facelens_core::pipeline::session::{AnalysisSession, SessionConfig};
use facelens_core::shared::constants::{
    AGE_MODEL, BLAZEFACE_MODEL, DEFAULT_API_URL, EXPRESSION_MODEL, LANDMARK_MODEL,
    LOCAL_ANALYSIS_INTERVAL_MS, REMOTE_ENRICHMENT_INTERVAL_MS, GENDER_MODEL,
};
use facelens_core::shared::model_resolver::{self, ModelSpec};
use facelens_core::video::domain::frame_source::FrameSource;
use facelens_core::video::infrastructure::ffmpeg_camera_source::{CameraError, FfmpegCameraSource};

mod dashboard;

const MODEL_LOAD_ERROR: &str = "Không thể tải các mô hình AI. Vui lòng thử lại.";
const CAMERA_PERMISSION_ERROR: &str =
    "Bạn đã từ chối quyền truy cập camera. Vui lòng cấp quyền và thử lại.";
const CAMERA_GENERIC_ERROR: &str =
    "Không thể truy cập camera. Vui lòng kiểm tra quyền truy cập, thiết bị và thử lại.";

/// Real-time face analysis dashboard with remote attribute enrichment.
#[derive(Parser)]
#[command(name = "facelens")]
struct Cli {
    /// Capture source: a V4L2 device or any ffmpeg-readable input.
    #[arg(long, default_value = "/dev/video0")]
    source: PathBuf,

    /// Base URL of the attribute proxy.
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// On-device analysis interval in milliseconds.
    #[arg(long, default_value_t = LOCAL_ANALYSIS_INTERVAL_MS)]
    local_interval_ms: u64,

    /// Remote enrichment interval in milliseconds.
    #[arg(long, default_value_t = REMOTE_ENRICHMENT_INTERVAL_MS)]
    remote_interval_ms: u64,

    /// Display size for annotations as WIDTHxHEIGHT (default: capture size).
    #[arg(long)]
    display: Option<String>,

    /// Stop after this many seconds (default: run until the source ends).
    #[arg(long)]
    duration: Option<u64>,

    /// Directory with pre-bundled model files, checked before downloading.
    #[arg(long)]
    models_dir: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;
    let display = parse_display(cli.display.as_deref())?;

    // Taxonomy (a): model failures block the session outright.
    let models = resolve_models(cli.models_dir.as_deref()).map_err(|e| {
        log::error!("model resolution failed: {e}");
        MODEL_LOAD_ERROR
    })?;

    let analyzer = OnnxFaceAnalyzer::new(
        &AnalyzerModelPaths {
            detector: &models.detector,
            landmarks: &models.landmarks,
            expression: &models.expression,
            age: &models.age,
            gender: &models.gender,
        },
        cli.confidence,
    )
    .map_err(|e| {
        log::error!("analyzer session load failed: {e}");
        MODEL_LOAD_ERROR
    })?;
    let detector =
        OnnxBlazefaceDetector::new(&models.detector, cli.confidence).map_err(|e| {
            log::error!("detector session load failed: {e}");
            MODEL_LOAD_ERROR
        })?;

    let client = Arc::new(HttpAttributeClient::new(&cli.api_url));
    if !client.status() {
        log::warn!(
            "attribute proxy not responding at {} - enrichment will fall back to simulated values",
            cli.api_url
        );
    }

    // Taxonomy (b): camera failures are fatal, permission-denied is
    // reported distinctly.
    let source = FfmpegCameraSource::open(&cli.source, display).map_err(|e| {
        log::error!("camera setup failed: {e}");
        match e {
            CameraError::PermissionDenied => CAMERA_PERMISSION_ERROR,
            _ => CAMERA_GENERIC_ERROR,
        }
    })?;
    let (width, height) = source.display_size();
    log::info!(
        "camera ready: {} at {width}x{height}",
        cli.source.display()
    );

    let local = LocalAnalysisUseCase::new(
        Box::new(analyzer),
        Box::new(FrameOverlayRenderer::new()),
    );
    let remote = RemoteEnrichmentLoop::new(Box::new(detector), client);
    let config = SessionConfig {
        local_interval: Duration::from_millis(cli.local_interval_ms),
        remote_interval: Duration::from_millis(cli.remote_interval_ms),
    };

    let mut session = AnalysisSession::new(Box::new(source), local, remote, config);
    let mut dashboard =
        dashboard::TerminalDashboard::new(cli.duration.map(Duration::from_secs));
    session.run(Box::new(move |state| dashboard.update(state)));

    log::info!("session ended");
    Ok(())
}

struct ResolvedModels {
    detector: PathBuf,
    landmarks: PathBuf,
    expression: PathBuf,
    age: PathBuf,
    gender: PathBuf,
}

fn resolve_models(
    bundled_dir: Option<&Path>,
) -> Result<ResolvedModels, model_resolver::ModelResolveError> {
    let resolve = |spec: &ModelSpec| -> Result<PathBuf, model_resolver::ModelResolveError> {
        log::info!("resolving model: {}", spec.name);
        let name = spec.name;
        let path = model_resolver::resolve(
            spec,
            bundled_dir,
            Some(Box::new(move |downloaded, total| {
                download_progress(name, downloaded, total);
            })),
        )?;
        eprintln!();
        Ok(path)
    };

    Ok(ResolvedModels {
        detector: resolve(&BLAZEFACE_MODEL)?,
        landmarks: resolve(&LANDMARK_MODEL)?,
        expression: resolve(&EXPRESSION_MODEL)?,
        age: resolve(&AGE_MODEL)?,
        gender: resolve(&GENDER_MODEL)?,
    })
}

fn download_progress(name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {name}... {pct}%");
    } else {
        eprint!("\rDownloading {name}... {downloaded} bytes");
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if cli.local_interval_ms == 0 || cli.remote_interval_ms == 0 {
        return Err("Intervals must be positive".into());
    }
    if cli.remote_interval_ms < cli.local_interval_ms {
        return Err("Remote interval must not be shorter than the local interval".into());
    }
    Ok(())
}

fn parse_display(display: Option<&str>) -> Result<Option<(u32, u32)>, Box<dyn std::error::Error>> {
    let Some(display) = display else {
        return Ok(None);
    };
    let parts: Vec<&str> = display.split('x').collect();
    if parts.len() == 2 {
        if let (Ok(w), Ok(h)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>()) {
            if w > 0 && h > 0 {
                return Ok(Some((w, h)));
            }
        }
    }
    Err(format!("Display must be WIDTHxHEIGHT, got '{display}'").into())
}
