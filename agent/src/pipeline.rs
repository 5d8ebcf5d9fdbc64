use face_capture_camera::{CaptureError, CapturedImage};
use face_capture_common::config::Config;
use tracing::{info, warn};

use crate::compare::{CompareError, ComparisonResult, FaceComparer};
use crate::result_log::{LogError, ResultLog};
use crate::storage::{ObjectStore, StorageError, JPEG_CONTENT_TYPE, TEXT_CONTENT_TYPE};

/// Everything one run did. `None` marks a step that was skipped.
#[derive(Debug)]
pub struct RunReport {
    pub capture: Result<CapturedImage, CaptureError>,
    pub image_upload: Option<Result<(), StorageError>>,
    pub comparison: Option<Result<ComparisonResult, CompareError>>,
    pub log_entry: Option<Result<String, LogError>>,
    pub log_upload: Option<Result<(), StorageError>>,
}

impl RunReport {
    pub fn picture_taken(&self) -> bool {
        self.capture.is_ok()
    }

    pub fn image_uploaded(&self) -> bool {
        matches!(self.image_upload, Some(Ok(())))
    }

    pub fn log_uploaded(&self) -> bool {
        matches!(self.log_upload, Some(Ok(())))
    }

    /// Comparison summary lines. Empty when the comparison did not succeed.
    pub fn comparison_lines(&self) -> Vec<String> {
        match &self.comparison {
            Some(Ok(result)) => result.report_lines(),
            _ => Vec::new(),
        }
    }

    /// 0 once a picture was taken, 2 when capture failed.
    pub fn exit_code(&self) -> i32 {
        if self.picture_taken() {
            0
        } else {
            2
        }
    }
}

/// Upload, compare, log and upload-log, in that order, for one capture.
///
/// No step failure stops the run. Steps that need the captured picture are
/// skipped when there is none.
pub struct Pipeline<'a> {
    config: &'a Config,
    store: &'a dyn ObjectStore,
    comparer: &'a dyn FaceComparer,
    log: ResultLog,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, store: &'a dyn ObjectStore, comparer: &'a dyn FaceComparer) -> Self {
        Self {
            config,
            store,
            comparer,
            log: ResultLog::new(&config.paths.log_file),
        }
    }

    pub async fn run(&self, capture: Result<CapturedImage, CaptureError>) -> RunReport {
        let mut report = RunReport {
            capture,
            image_upload: None,
            comparison: None,
            log_entry: None,
            log_upload: None,
        };

        match &report.capture {
            Ok(captured) => {
                report.image_upload = Some(self.upload_image(captured).await);
                report.comparison = Some(self.compare(captured).await);
                report.log_entry = Some(self.log_capture(captured));
            }
            Err(e) => {
                warn!(error = %e, "no picture taken, skipping upload, comparison and logging");
            }
        }

        report.log_upload = self.upload_log().await;
        report
    }

    async fn upload_image(&self, captured: &CapturedImage) -> Result<(), StorageError> {
        let key = captured.name.object_key();
        info!(path = %captured.path.display(), bucket = self.store.bucket(), key, "uploading picture");
        let result = self
            .store
            .put_file(&captured.path, key, JPEG_CONTENT_TYPE)
            .await;
        match &result {
            Ok(()) => info!(key, "picture file uploaded"),
            Err(e) => warn!(error = %e, key, "picture upload failed"),
        }
        result
    }

    async fn compare(&self, captured: &CapturedImage) -> Result<ComparisonResult, CompareError> {
        let threshold = self.config.compare.similarity_threshold;
        info!(
            reference = self.config.base_face_file,
            target = captured.name.object_key(),
            threshold,
            "comparing picture"
        );
        let result = self
            .comparer
            .compare(&self.config.base_face_file, captured.name.object_key(), threshold)
            .await;
        match &result {
            Ok(r) => info!(
                matched = r.is_match(),
                matches = r.matches.len(),
                unmatched = r.unmatched.len(),
                "picture successfully compared"
            ),
            Err(e) => warn!(error = %e, "picture comparison failed"),
        }
        result
    }

    fn log_capture(&self, captured: &CapturedImage) -> Result<String, LogError> {
        let entry = captured.name.log_entry().to_string();
        match self.log.append(&entry) {
            Ok(()) => Ok(entry),
            Err(e) => {
                warn!(error = %e, "failed to log capture time");
                Err(e)
            }
        }
    }

    async fn upload_log(&self) -> Option<Result<(), StorageError>> {
        if !self.log.exists() {
            info!(path = %self.log.path().display(), "no log file yet, skipping log upload");
            return None;
        }
        let key = self.config.log_object_key();
        info!(path = %self.log.path().display(), key, "uploading log file");
        let result = self
            .store
            .put_file(self.log.path(), &key, TEXT_CONTENT_TYPE)
            .await;
        match &result {
            Ok(()) => info!(key, "log file uploaded"),
            Err(e) => warn!(error = %e, key, "log upload failed"),
        }
        Some(result)
    }
}
