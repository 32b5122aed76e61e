use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};

/// A file whose last change is older than the configured threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path relative to the repository root.
    pub path: Utf8PathBuf,

    /// Human readable name derived from the file name.
    pub name: String,

    pub age_days: u32,
    pub last_modified: DateTime<Utc>,
    pub threshold_days: u32,
}

impl FileRecord {
    #[must_use]
    pub fn new(path: Utf8PathBuf, last_modified: DateTime<Utc>, age_days: u32, threshold_days: u32) -> Self {
        Self {
            name: extract_name_from_path(&path),
            path,
            age_days,
            last_modified,
            threshold_days,
        }
    }

    /// Days past the threshold.
    #[must_use]
    pub const fn overdue_days(&self) -> u32 {
        self.age_days.saturating_sub(self.threshold_days)
    }
}

/// Turn `south_korea.py` into `South Korea`.
///
/// Underscores and dashes in the file stem become spaces and every word is title-cased.
#[must_use]
pub fn extract_name_from_path(path: &Utf8Path) -> String {
    let stem = path.file_stem().unwrap_or_else(|| path.as_str());
    let mut name = String::with_capacity(stem.len());
    let mut prev_is_letter = false;

    for c in stem.chars() {
        let c = if matches!(c, '_' | '-') { ' ' } else { c };

        if c.is_alphabetic() {
            if prev_is_letter {
                name.extend(c.to_lowercase());
            } else {
                name.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            name.push(c);
            prev_is_letter = false;
        }
    }

    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_extract_name_from_path() {
        assert_eq!(extract_name_from_path(Utf8Path::new("south_korea.py")), "South Korea");
        assert_eq!(extract_name_from_path(Utf8Path::new("new_zealand.py")), "New Zealand");
        assert_eq!(extract_name_from_path(Utf8Path::new("holidays/countries/united_states.py")), "United States");
    }

    #[test]
    fn test_extract_name_normalizes_case() {
        assert_eq!(extract_name_from_path(Utf8Path::new("NYSE.py")), "Nyse");
        assert_eq!(extract_name_from_path(Utf8Path::new("ice-futures_europe.py")), "Ice Futures Europe");
    }

    #[test]
    fn test_extract_name_digits_break_words() {
        assert_eq!(extract_name_from_path(Utf8Path::new("iso3166x2.py")), "Iso3166X2");
    }

    #[test]
    fn test_file_record_new_and_overdue() {
        let when = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let record = FileRecord::new(Utf8PathBuf::from("holidays/countries/japan.py"), when, 200, 180);

        assert_eq!(record.name, "Japan");
        assert_eq!(record.overdue_days(), 20);
    }

    #[test]
    fn test_overdue_never_negative() {
        let when = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let record = FileRecord::new(Utf8PathBuf::from("a.py"), when, 10, 180);
        assert_eq!(record.overdue_days(), 0);
    }
}
