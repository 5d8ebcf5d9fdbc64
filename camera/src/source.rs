use image::RgbImage;

/// A camera (or anything else) that hands out colour frames on demand.
pub trait FrameSource {
    /// Read the next frame. `Ok(None)` means the device answered but had no
    /// frame to give this time.
    fn read_frame(&mut self) -> Result<Option<RgbImage>, SourceError>;

    /// Give the device back. Must be safe to call more than once.
    fn release(&mut self);
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to open camera: {0}")]
    Open(String),
    #[error("failed to read frame: {0}")]
    Read(String),
}
