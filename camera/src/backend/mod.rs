//! OpenCV-backed camera and Haar cascade face detector.

mod camera;
mod haar;

pub use camera::OpenCvCamera;
pub use haar::HaarFaceDetector;
