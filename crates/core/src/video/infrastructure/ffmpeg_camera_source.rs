use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use thiserror::Error;

use crate::shared::constants::READY_FRAME_THRESHOLD;
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::FrameSource;

const EACCES: i32 = 13;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("camera access was denied - check device permissions")]
    PermissionDenied,
    #[error("no video stream in capture source")]
    NoVideoStream,
    #[error("failed to initialize ffmpeg: {0}")]
    Init(#[source] ffmpeg_next::Error),
    #[error("failed to open capture source: {0}")]
    Open(#[source] ffmpeg_next::Error),
    #[error("failed to set up decoder: {0}")]
    Decoder(#[source] ffmpeg_next::Error),
}

/// Live frame capture via ffmpeg-next (libavformat + libavcodec).
///
/// Works on V4L2 camera devices and on any ffmpeg-readable input, which
/// keeps development possible without a physical camera. A background
/// thread decodes continuously and publishes the most recent RGB24 frame;
/// consumers poll at their own cadence and slow consumers simply skip
/// frames.
#[derive(Debug)]
pub struct FfmpegCameraSource {
    shared: Arc<SharedSlot>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    display_size: (u32, u32),
}

#[derive(Debug)]
struct SharedSlot {
    latest: Mutex<Option<Frame>>,
    decoded: AtomicU64,
    stream_open: AtomicBool,
}

/// Decode-side ffmpeg state, moved wholesale into the worker thread.
struct DecodeContext {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
}

// Safety: the context is used by exactly one thread after construction.
// The raw pointers inside ffmpeg types are never shared.
unsafe impl Send for DecodeContext {}

impl FfmpegCameraSource {
    /// Opens the capture source and starts the decode thread.
    ///
    /// `display_override` sets the display-space size annotations are
    /// rendered at; `None` uses the native capture size.
    pub fn open(
        source: &Path,
        display_override: Option<(u32, u32)>,
    ) -> Result<Self, CameraError> {
        ffmpeg_next::init().map_err(CameraError::Init)?;

        let ictx = ffmpeg_next::format::input(source).map_err(classify_open_error)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or(CameraError::NoVideoStream)?;
        let stream_index = stream.index();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(CameraError::Decoder)?;
        let decoder = codec_ctx.decoder().video().map_err(CameraError::Decoder)?;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(CameraError::Decoder)?;

        let ctx = DecodeContext {
            ictx,
            decoder,
            scaler,
            stream_index,
            width,
            height,
        };

        let shared = Arc::new(SharedSlot {
            latest: Mutex::new(None),
            decoded: AtomicU64::new(0),
            stream_open: AtomicBool::new(true),
        });
        let stop = Arc::new(AtomicBool::new(false));

        let worker = {
            let shared = shared.clone();
            let stop = stop.clone();
            std::thread::spawn(move || decode_loop(ctx, &shared, &stop))
        };

        Ok(Self {
            shared,
            stop,
            worker: Some(worker),
            display_size: display_override.unwrap_or((width, height)),
        })
    }
}

impl FrameSource for FfmpegCameraSource {
    fn ready(&self) -> bool {
        self.shared.decoded.load(Ordering::Relaxed) >= READY_FRAME_THRESHOLD
    }

    fn latest(&self) -> Option<Frame> {
        self.shared.latest.lock().ok()?.clone()
    }

    fn display_size(&self) -> (u32, u32) {
        self.display_size
    }

    fn is_open(&self) -> bool {
        self.shared.stream_open.load(Ordering::Relaxed) && self.worker.is_some()
    }

    fn close(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.shared.stream_open.store(false, Ordering::Relaxed);
        if let Ok(mut latest) = self.shared.latest.lock() {
            *latest = None;
        }
    }
}

impl Drop for FfmpegCameraSource {
    fn drop(&mut self) {
        self.close();
    }
}

fn classify_open_error(e: ffmpeg_next::Error) -> CameraError {
    match e {
        ffmpeg_next::Error::Other { errno } if errno == EACCES => CameraError::PermissionDenied,
        other => CameraError::Open(other),
    }
}

fn decode_loop(mut ctx: DecodeContext, shared: &SharedSlot, stop: &AtomicBool) {
    let mut index: u64 = 0;

    for (stream, packet) in ctx.ictx.packets() {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        if stream.index() != ctx.stream_index {
            continue;
        }
        if ctx.decoder.send_packet(&packet).is_err() {
            continue;
        }
        drain_decoder(
            &mut ctx.decoder,
            &mut ctx.scaler,
            ctx.width,
            ctx.height,
            &mut index,
            shared,
        );
    }

    let _ = ctx.decoder.send_eof();
    drain_decoder(
        &mut ctx.decoder,
        &mut ctx.scaler,
        ctx.width,
        ctx.height,
        &mut index,
        shared,
    );

    shared.stream_open.store(false, Ordering::Relaxed);
}

fn drain_decoder(
    decoder: &mut ffmpeg_next::decoder::Video,
    scaler: &mut ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    index: &mut u64,
    shared: &SharedSlot,
) {
    let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
    while decoder.receive_frame(&mut decoded).is_ok() {
        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        if scaler.run(&decoded, &mut rgb).is_err() {
            continue;
        }

        let pixels = extract_rgb_pixels(&rgb, width, height);
        let frame = Frame::new(pixels, width, height, 3, *index);
        *index += 1;

        if let Ok(mut latest) = shared.latest.lock() {
            *latest = Some(frame);
        }
        shared.decoded.fetch_add(1, Ordering::Relaxed);
    }
}

/// Copies RGB24 plane data row by row, dropping the per-row stride padding
/// ffmpeg may add.
fn extract_rgb_pixels(
    rgb: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb.stride(0);
    let data = rgb.data(0);
    let row_bytes = (width * 3) as usize;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}
