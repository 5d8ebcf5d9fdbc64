use image::GrayImage;

use crate::frame::FaceRegion;

/// Finds faces in a grayscale frame.
///
/// Implementations own their model and detection parameters; the capture
/// loop only cares whether the returned list is empty.
pub trait FaceDetector {
    fn detect(&mut self, gray: &GrayImage) -> Result<Vec<FaceRegion>, DetectError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("failed to load face model {0}: {1}")]
    Model(String, String),
    #[error("face detection failed: {0}")]
    Detect(String),
}
