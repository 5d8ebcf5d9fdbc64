use face_capture_agent::compare::RekognitionComparer;
use face_capture_agent::storage::S3Storage;
use face_capture_agent::{aws, Pipeline, RunReport};
use face_capture_camera::backend::{HaarFaceDetector, OpenCvCamera};
use face_capture_camera::CaptureLoop;
use face_capture_common::config::Config;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("face-capture.toml"));

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    info!(
        bucket = config.bucket_name,
        base_face = config.base_face_file,
        captured_dir = %config.paths.captured_dir.display(),
        "starting face capture"
    );

    let mut detector = match HaarFaceDetector::load(&config.detector) {
        Ok(d) => d,
        Err(e) => {
            error!(error = %e, "failed to load face detector");
            std::process::exit(1);
        }
    };
    let mut camera = match OpenCvCamera::open(&config.camera) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to open camera");
            std::process::exit(1);
        }
    };

    let capture = CaptureLoop::new(&config.capture, &config.paths.captured_dir)
        .run(&mut camera, &mut detector);
    drop(camera);

    let sdk_config = aws::load_sdk_config(&config.aws).await;
    let store = S3Storage::new(&sdk_config, &config.bucket_name);
    let comparer = RekognitionComparer::new(&sdk_config, &config.bucket_name);

    let report = Pipeline::new(&config, &store, &comparer).run(capture).await;
    present(&report);

    info!(exit_code = report.exit_code(), "exiting face capture");
    std::process::exit(report.exit_code());
}

/// Print the comparison summary and surface any step failures.
fn present(report: &RunReport) {
    if let Err(e) = &report.capture {
        error!(error = %e, "no picture was taken");
    }
    if let Some(Err(e)) = &report.image_upload {
        warn!(error = %e, "picture was not uploaded");
    }
    match &report.comparison {
        Some(Ok(_)) => {
            println!();
            for line in report.comparison_lines() {
                println!("{line}");
            }
            println!();
        }
        Some(Err(e)) => warn!(error = %e, "comparison result unavailable"),
        None => {}
    }
    if let Some(Err(e)) = &report.log_entry {
        warn!(error = %e, "capture time was not logged");
    }
    if let Some(Err(e)) = &report.log_upload {
        warn!(error = %e, "log file was not uploaded");
    }
}
