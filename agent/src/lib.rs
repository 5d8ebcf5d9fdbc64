//! Cloud half of face-capture: pushes a captured picture to S3, asks
//! Rekognition whether it shows the reference face, and keeps the time log.

pub mod aws;
pub mod compare;
pub mod pipeline;
pub mod result_log;
pub mod storage;

pub use pipeline::{Pipeline, RunReport};
