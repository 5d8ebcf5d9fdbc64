use face_capture_common::capture::CaptureName;
use face_capture_common::config::CaptureConfig;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::detector::{DetectError, FaceDetector};
use crate::frame::to_grayscale;
use crate::sharpness::laplacian_variance;
use crate::source::FrameSource;

/// Quality of saved captures, matching what OpenCV's `imwrite` uses.
pub const JPEG_QUALITY: u8 = 95;

/// A frame that passed both checks and was written to disk.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub name: CaptureName,
    pub path: PathBuf,
    pub sharpness: f64,
    pub faces: usize,
}

/// Returns `true` when a frame is good enough to keep: at least one face and
/// a sharpness score strictly above the threshold.
pub fn is_acceptable(sharpness: f64, faces: usize, threshold: f64) -> bool {
    faces > 0 && sharpness > threshold
}

/// Pulls frames until one shows a face and is in focus, then saves it.
pub struct CaptureLoop {
    sharpness_threshold: f64,
    max_read_failures: u32,
    timeout: Option<Duration>,
    captured_dir: PathBuf,
    namer: Box<dyn FnMut() -> CaptureName>,
}

impl CaptureLoop {
    pub fn new(config: &CaptureConfig, captured_dir: impl Into<PathBuf>) -> Self {
        Self {
            sharpness_threshold: config.sharpness_threshold,
            max_read_failures: config.max_read_failures,
            timeout: config.timeout_secs.map(Duration::from_secs),
            captured_dir: captured_dir.into(),
            namer: Box::new(CaptureName::now),
        }
    }

    /// Replace the wall-clock naming of captures.
    pub fn with_namer(mut self, namer: impl FnMut() -> CaptureName + 'static) -> Self {
        self.namer = Box::new(namer);
        self
    }

    /// Run until a frame is accepted or the loop gives up. The source is
    /// released before returning, whatever the outcome.
    pub fn run<S, D>(&mut self, source: &mut S, detector: &mut D) -> Result<CapturedImage, CaptureError>
    where
        S: FrameSource + ?Sized,
        D: FaceDetector + ?Sized,
    {
        let result = self.acquire(source, detector);
        source.release();
        debug!("camera released");
        result
    }

    fn acquire<S, D>(&mut self, source: &mut S, detector: &mut D) -> Result<CapturedImage, CaptureError>
    where
        S: FrameSource + ?Sized,
        D: FaceDetector + ?Sized,
    {
        info!(
            detector = detector.name(),
            threshold = self.sharpness_threshold,
            "detecting faces and taking pictures, try to stay still"
        );

        let started = Instant::now();
        let mut consecutive_failures: u32 = 0;
        let mut frames: u64 = 0;

        loop {
            match source.read_frame() {
                Ok(Some(frame)) => {
                    consecutive_failures = 0;
                    frames += 1;

                    let faces = detector.detect(&to_grayscale(&frame))?;
                    let sharpness = laplacian_variance(&frame);
                    let accepted =
                        is_acceptable(sharpness, faces.len(), self.sharpness_threshold);
                    debug!(
                        frames,
                        faces = faces.len(),
                        sharpness = format!("{:.2}", sharpness),
                        accepted,
                        "frame check"
                    );

                    if accepted {
                        let (name, path) = self.write_capture(&frame)?;
                        info!(path = %path.display(), frames, "picture taken");
                        return Ok(CapturedImage {
                            name,
                            path,
                            sharpness,
                            faces: faces.len(),
                        });
                    }
                }
                Ok(None) => {
                    consecutive_failures += 1;
                    debug!(consecutive_failures, "camera returned no frame");
                }
                Err(e) => {
                    consecutive_failures += 1;
                    warn!(error = %e, consecutive_failures, "camera read error");
                }
            }

            if self.max_read_failures > 0 && consecutive_failures >= self.max_read_failures {
                return Err(CaptureError::Device(consecutive_failures));
            }
            if let Some(timeout) = self.timeout {
                if started.elapsed() >= timeout {
                    return Err(CaptureError::Timeout(timeout));
                }
            }
        }
    }

    /// Write the frame under a fresh timestamp name, never overwriting an
    /// earlier capture from the same second.
    fn write_capture(&mut self, frame: &RgbImage) -> Result<(CaptureName, PathBuf), CaptureError> {
        std::fs::create_dir_all(&self.captured_dir).map_err(|e| {
            CaptureError::Write(self.captured_dir.display().to_string(), e.to_string())
        })?;

        let base = (self.namer)();
        let (name, path) = unused_name(&base, &self.captured_dir);
        if name != base {
            warn!(taken = base.file_name(), using = name.file_name(), "capture name already used");
        }

        let file = File::create(&path)
            .map_err(|e| CaptureError::Write(path.display().to_string(), e.to_string()))?;
        let mut writer = BufWriter::new(file);
        encode_jpeg(frame, &mut writer)
            .and_then(|()| writer.flush().map_err(image::ImageError::IoError))
            .map_err(|e| CaptureError::Write(path.display().to_string(), e.to_string()))?;
        Ok((name, path))
    }
}

/// Encode `frame` as a JPEG at [`JPEG_QUALITY`].
fn encode_jpeg<W: Write>(frame: &RgbImage, writer: &mut W) -> image::ImageResult<()> {
    frame.write_with_encoder(JpegEncoder::new_with_quality(writer, JPEG_QUALITY))
}

fn unused_name(base: &CaptureName, dir: &Path) -> (CaptureName, PathBuf) {
    let mut n = 0;
    loop {
        let candidate = base.with_suffix(n);
        let path = candidate.path_in(dir);
        if !path.exists() {
            return (candidate, path);
        }
        n += 1;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("camera delivered no frame for {0} consecutive reads")]
    Device(u32),
    #[error("no acceptable frame within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error("failed to write capture {0}: {1}")]
    Write(String, String),
}
