use face_capture_common::config::CameraConfig;
use image::RgbImage;
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::{imgproc, videoio};
use tracing::{debug, info, warn};

use crate::source::{FrameSource, SourceError};

/// A V4L/DirectShow/AVFoundation camera opened through `cv::VideoCapture`.
pub struct OpenCvCamera {
    cam: videoio::VideoCapture,
    released: bool,
}

impl OpenCvCamera {
    pub fn open(config: &CameraConfig) -> Result<Self, SourceError> {
        info!(device = config.device_index, "starting camera");
        let mut cam = videoio::VideoCapture::new(config.device_index, videoio::CAP_ANY)
            .map_err(|e| SourceError::Open(e.to_string()))?;
        let opened = cam
            .is_opened()
            .map_err(|e| SourceError::Open(e.to_string()))?;
        if !opened {
            return Err(SourceError::Open(format!(
                "device {} is not available",
                config.device_index
            )));
        }

        let settings = [
            ("autofocus", videoio::CAP_PROP_AUTOFOCUS, if config.autofocus { 1.0 } else { 0.0 }),
            ("focus", videoio::CAP_PROP_FOCUS, config.focus),
            ("brightness", videoio::CAP_PROP_BRIGHTNESS, config.brightness),
            ("sharpness", videoio::CAP_PROP_SHARPNESS, config.sharpness),
            ("frame_width", videoio::CAP_PROP_FRAME_WIDTH, config.frame_width as f64),
            ("frame_height", videoio::CAP_PROP_FRAME_HEIGHT, config.frame_height as f64),
        ];
        for (name, prop, value) in settings {
            match cam.set(prop, value) {
                Ok(true) => debug!(property = name, value, "camera property set"),
                Ok(false) => warn!(property = name, value, "camera ignored property"),
                Err(e) => warn!(property = name, value, error = %e, "failed to set camera property"),
            }
        }

        Ok(Self {
            cam,
            released: false,
        })
    }
}

impl FrameSource for OpenCvCamera {
    fn read_frame(&mut self) -> Result<Option<RgbImage>, SourceError> {
        let mut bgr = Mat::default();
        let grabbed = self
            .cam
            .read(&mut bgr)
            .map_err(|e| SourceError::Read(e.to_string()))?;
        if !grabbed || bgr.empty() {
            return Ok(None);
        }
        bgr_to_rgb(&bgr).map(Some)
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.cam.release() {
            warn!(error = %e, "failed to release camera");
        }
        self.released = true;
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        self.release();
    }
}

fn bgr_to_rgb(bgr: &Mat) -> Result<RgbImage, SourceError> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0)
        .map_err(|e| SourceError::Read(e.to_string()))?;

    let width = rgb.cols() as u32;
    let height = rgb.rows() as u32;
    let data = rgb
        .data_bytes()
        .map_err(|e| SourceError::Read(e.to_string()))?
        .to_vec();
    RgbImage::from_raw(width, height, data).ok_or_else(|| {
        SourceError::Read(format!("frame buffer does not match {width}x{height}x3"))
    })
}
