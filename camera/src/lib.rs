//! Camera-side half of face-capture: pulls frames from a device, looks for a
//! face, scores focus and keeps the first frame that passes both checks.

#[cfg(feature = "opencv")]
pub mod backend;
pub mod capture_loop;
pub mod detector;
pub mod frame;
pub mod sharpness;
pub mod source;

pub use capture_loop::{CaptureError, CaptureLoop, CapturedImage};
pub use detector::{DetectError, FaceDetector};
pub use frame::FaceRegion;
pub use source::{FrameSource, SourceError};
