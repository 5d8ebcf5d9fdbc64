use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Append-only text log of capture timestamps, one per line.
#[derive(Debug, Clone)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Append `entry` as a new line, creating the file and its directory if needed.
    pub fn append(&self, entry: &str) -> Result<(), LogError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| LogError::Write(self.path.display().to_string(), e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LogError::Write(self.path.display().to_string(), e))?;
        writeln!(file, "{entry}").map_err(|e| LogError::Write(self.path.display().to_string(), e))?;

        info!(path = %self.path.display(), entry, "logged capture time");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to append to {0}: {1}")]
    Write(String, std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::new(dir.path().join("logs").join("face_capture_time_log.txt"));
        assert!(!log.exists());

        log.append("01-01-2024_00-00-00").unwrap();

        assert!(log.exists());
        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content, "01-01-2024_00-00-00\n");
    }

    #[test]
    fn appends_without_rewriting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face_capture_time_log.txt");
        std::fs::write(&path, "31-12-2023_23-59-59\n").unwrap();
        let log = ResultLog::new(&path);

        log.append("01-01-2024_00-00-00").unwrap();
        log.append("01-01-2024_00-00-01").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "31-12-2023_23-59-59\n01-01-2024_00-00-00\n01-01-2024_00-00-01\n"
        );
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let log = ResultLog::new(dir.path());
        assert!(matches!(log.append("x"), Err(LogError::Write(..))));
    }
}
