use face_capture_common::config::DetectorConfig;
use image::GrayImage;
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use tracing::info;

use crate::detector::{DetectError, FaceDetector};
use crate::frame::FaceRegion;

/// Viola-Jones face detection with a pre-trained Haar cascade.
pub struct HaarFaceDetector {
    classifier: CascadeClassifier,
    scale_factor: f64,
    min_neighbors: i32,
    min_size: i32,
}

impl HaarFaceDetector {
    pub fn load(config: &DetectorConfig) -> Result<Self, DetectError> {
        let path = config.cascade_path.display().to_string();
        let classifier =
            CascadeClassifier::new(&path).map_err(|e| DetectError::Model(path.clone(), e.to_string()))?;
        let empty = classifier
            .empty()
            .map_err(|e| DetectError::Model(path.clone(), e.to_string()))?;
        if empty {
            return Err(DetectError::Model(path, "cascade is empty or missing".into()));
        }
        let min_size = i32::try_from(config.min_size).map_err(|_| {
            DetectError::Model(path.clone(), format!("min_size {} is too large", config.min_size))
        })?;
        info!(cascade = path, "loaded face cascade");

        Ok(Self {
            classifier,
            scale_factor: config.scale_factor,
            min_neighbors: config.min_neighbors,
            min_size,
        })
    }
}

impl FaceDetector for HaarFaceDetector {
    fn detect(&mut self, gray: &GrayImage) -> Result<Vec<FaceRegion>, DetectError> {
        let mat = Mat::new_rows_cols_with_data(gray.height() as i32, gray.width() as i32, gray.as_raw())
            .map_err(|e| DetectError::Detect(e.to_string()))?;

        let mut faces = Vector::<Rect>::new();
        self.classifier
            .detect_multi_scale(
                &*mat,
                &mut faces,
                self.scale_factor,
                self.min_neighbors,
                0,
                Size::new(self.min_size, self.min_size),
                Size::new(0, 0),
            )
            .map_err(|e| DetectError::Detect(e.to_string()))?;

        Ok(faces
            .iter()
            .map(|r| {
                FaceRegion::new(
                    r.x.max(0) as u32,
                    r.y.max(0) as u32,
                    r.width.max(0) as u32,
                    r.height.max(0) as u32,
                )
            })
            .collect())
    }

    fn name(&self) -> &str {
        "haar"
    }
}
