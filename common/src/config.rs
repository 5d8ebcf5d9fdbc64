use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bucket holding the reference face, the captures and the time log.
    pub bucket_name: String,
    /// Object key of the reference face image inside `bucket_name`.
    pub base_face_file: String,
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub compare: CompareConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwsConfig {
    /// Falls back to the SDK's default region provider chain when unset.
    pub region: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub device_index: i32,
    #[serde(default)]
    pub autofocus: bool,
    #[serde(default = "default_focus")]
    pub focus: f64,
    #[serde(default = "default_brightness")]
    pub brightness: f64,
    #[serde(default = "default_sharpness")]
    pub sharpness: f64,
    #[serde(default = "default_frame_width")]
    pub frame_width: u32,
    #[serde(default = "default_frame_height")]
    pub frame_height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectorConfig {
    #[serde(default = "default_cascade_path")]
    pub cascade_path: PathBuf,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    #[serde(default = "default_min_neighbors")]
    pub min_neighbors: i32,
    /// Minimum side length (pixels) of a detected face.
    #[serde(default = "default_min_size")]
    pub min_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    /// A frame is accepted only when its sharpness score is strictly greater.
    #[serde(default = "default_sharpness_threshold")]
    pub sharpness_threshold: f64,
    /// Consecutive failed reads tolerated before giving up. 0 disables the bound.
    #[serde(default = "default_max_read_failures")]
    pub max_read_failures: u32,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareConfig {
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_captured_dir")]
    pub captured_dir: PathBuf,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            autofocus: false,
            focus: default_focus(),
            brightness: default_brightness(),
            sharpness: default_sharpness(),
            frame_width: default_frame_width(),
            frame_height: default_frame_height(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            cascade_path: default_cascade_path(),
            scale_factor: default_scale_factor(),
            min_neighbors: default_min_neighbors(),
            min_size: default_min_size(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sharpness_threshold: default_sharpness_threshold(),
            max_read_failures: default_max_read_failures(),
            timeout_secs: None,
        }
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            captured_dir: default_captured_dir(),
            log_file: default_log_file(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_name.trim().is_empty() {
            return Err(ConfigError::Invalid("bucket_name must not be empty".into()));
        }
        if self.base_face_file.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "base_face_file must not be empty".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.compare.similarity_threshold) {
            return Err(ConfigError::Invalid(format!(
                "compare.similarity_threshold must be within 0..=100, got {}",
                self.compare.similarity_threshold
            )));
        }
        if !(self.detector.scale_factor.is_finite() && self.detector.scale_factor > 1.0) {
            return Err(ConfigError::Invalid(format!(
                "detector.scale_factor must be greater than 1.0, got {}",
                self.detector.scale_factor
            )));
        }
        if self.detector.min_neighbors < 0 {
            return Err(ConfigError::Invalid(format!(
                "detector.min_neighbors must not be negative, got {}",
                self.detector.min_neighbors
            )));
        }
        if i32::try_from(self.detector.min_size).is_err() {
            return Err(ConfigError::Invalid(format!(
                "detector.min_size must be at most {}, got {}",
                i32::MAX,
                self.detector.min_size
            )));
        }
        let sharpness = self.capture.sharpness_threshold;
        if !(sharpness.is_finite() && sharpness >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "capture.sharpness_threshold must be a finite, non-negative number, got {sharpness}"
            )));
        }
        Ok(())
    }

    /// Remote key the time log is uploaded under: the log file's own name.
    pub fn log_object_key(&self) -> String {
        self.paths
            .log_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_LOG_OBJECT_KEY.to_string())
    }
}

pub const DEFAULT_LOG_OBJECT_KEY: &str = "face_capture_time_log.txt";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// Default value functions
fn default_focus() -> f64 {
    360.0
}
fn default_brightness() -> f64 {
    130.0
}
fn default_sharpness() -> f64 {
    125.0
}
fn default_frame_width() -> u32 {
    1280
}
fn default_frame_height() -> u32 {
    720
}
fn default_cascade_path() -> PathBuf {
    "./haarcascade/haarcascade_frontalface_default.xml".into()
}
fn default_scale_factor() -> f64 {
    1.1
}
fn default_min_neighbors() -> i32 {
    5
}
fn default_min_size() -> u32 {
    40
}
fn default_sharpness_threshold() -> f64 {
    30.0
}
fn default_max_read_failures() -> u32 {
    300
}
fn default_similarity_threshold() -> f32 {
    85.0
}
fn default_captured_dir() -> PathBuf {
    "./captured_images".into()
}
fn default_log_file() -> PathBuf {
    format!("./logs/{DEFAULT_LOG_OBJECT_KEY}").into()
}
fn default_log_level() -> String {
    "info".into()
}
