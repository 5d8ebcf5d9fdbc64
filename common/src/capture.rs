use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

/// strftime pattern for capture file stems, e.g. `18-10-2026_14-05-09`.
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y_%H-%M-%S";
pub const CAPTURE_EXTENSION: &str = "jpg";

/// File name of a captured picture, derived from the wall-clock time of capture.
///
/// Names have one-second granularity. Two captures within the same second
/// resolve to distinct names through [`CaptureName::with_suffix`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureName {
    file_name: String,
}

impl CaptureName {
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            file_name: format!("{}.{CAPTURE_EXTENSION}", dt.format(TIMESTAMP_FORMAT)),
        }
    }

    pub fn now() -> Self {
        Self::from_datetime(&chrono::Local::now())
    }

    /// Wrap an existing file name as-is.
    pub fn from_file_name(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Same timestamp with `-n` appended to the stem. `n == 0` is the bare name.
    pub fn with_suffix(&self, n: u32) -> Self {
        if n == 0 {
            return self.clone();
        }
        let (stem, rest) = match self.file_name.split_once('.') {
            Some((stem, ext)) => (stem, format!(".{ext}")),
            None => (self.file_name.as_str(), String::new()),
        };
        Self {
            file_name: format!("{stem}-{n}{rest}"),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Object key the picture is uploaded under.
    pub fn object_key(&self) -> &str {
        &self.file_name
    }

    /// Text before the first `.`, written to the time log.
    pub fn log_entry(&self) -> &str {
        self.file_name
            .split('.')
            .next()
            .unwrap_or(&self.file_name)
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.file_name)
    }
}

impl std::fmt::Display for CaptureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn new_year() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn file_name_is_day_month_year() {
        let name = CaptureName::from_datetime(&new_year());
        assert_eq!(name.file_name(), "01-01-2024_00-00-00.jpg");
        assert_eq!(name.object_key(), "01-01-2024_00-00-00.jpg");
    }

    #[test]
    fn log_entry_is_text_before_first_dot() {
        let name = CaptureName::from_datetime(&new_year());
        assert_eq!(name.log_entry(), "01-01-2024_00-00-00");

        let dotted = CaptureName::from_file_name("a.b.jpg");
        assert_eq!(dotted.log_entry(), "a");

        let bare = CaptureName::from_file_name("no-extension");
        assert_eq!(bare.log_entry(), "no-extension");
    }

    #[test]
    fn same_second_names_collide() {
        let a = CaptureName::from_datetime(&new_year());
        let b = CaptureName::from_datetime(&(new_year() + chrono::Duration::milliseconds(999)));
        assert_eq!(a, b);
        let c = CaptureName::from_datetime(&(new_year() + chrono::Duration::seconds(1)));
        assert_ne!(a, c);
    }

    #[test]
    fn suffix_keeps_log_entry_prefix() {
        let name = CaptureName::from_datetime(&new_year());
        assert_eq!(name.with_suffix(0), name);
        let second = name.with_suffix(2);
        assert_eq!(second.file_name(), "01-01-2024_00-00-00-2.jpg");
        assert_eq!(second.log_entry(), "01-01-2024_00-00-00-2");
    }

    #[test]
    fn path_joins_directory() {
        let name = CaptureName::from_datetime(&new_year());
        assert_eq!(
            name.path_in(Path::new("./captured_images")),
            PathBuf::from("./captured_images/01-01-2024_00-00-00.jpg")
        );
    }
}
