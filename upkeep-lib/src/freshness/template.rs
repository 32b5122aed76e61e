use super::LOG_TARGET;
use super::record::FileRecord;
use camino::Utf8Path;
use chrono::SecondsFormat;
use regex::{Captures, Regex};
use std::fs;
use std::sync::LazyLock;

/// The issue body used when no template file is configured.
pub const DEFAULT_BODY_TEMPLATE: &str = include_str!("../../issue_body_template.md");

pub const DEFAULT_TITLE_TEMPLATE: &str = "[Data Freshness] Update required: {name}";

/// `{placeholder}` references inside templates
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("invalid regex"));

/// Renders issue titles and bodies for outdated files.
///
/// Titles only see the `{name}` and `{path}` placeholders so that the same file always maps to
/// the same title, which is what makes re-runs find the issue they opened earlier.
#[derive(Debug, Clone)]
pub struct IssueTemplate {
    title: String,

    /// `None` when a configured template file could not be loaded.
    body: Option<String>,
}

impl IssueTemplate {
    #[must_use]
    pub fn new(title: impl Into<String>, body: Option<String>) -> Self {
        Self {
            title: title.into(),
            body,
        }
    }

    /// Build a template, reading the body from `body_path` when given.
    ///
    /// A body file that cannot be read is logged, and bodies fall back to a one-line message.
    #[must_use]
    pub fn load(title: impl Into<String>, body_path: Option<&Utf8Path>) -> Self {
        let body = match body_path {
            None => Some(DEFAULT_BODY_TEMPLATE.to_string()),
            Some(path) => match fs::read_to_string(path) {
                Ok(text) => Some(text),
                Err(e) => {
                    log::error!(target: LOG_TARGET, "Template file not found: {path} ({e})");
                    None
                }
            },
        };

        Self::new(title, body)
    }

    #[must_use]
    pub fn title(&self, record: &FileRecord) -> String {
        render(&self.title, |key| match key {
            "name" => Some(record.name.clone()),
            "path" => Some(record.path.to_string()),
            _ => None,
        })
    }

    #[must_use]
    pub fn body(&self, record: &FileRecord) -> String {
        let formatted_date = record.last_modified.format("%B %d, %Y").to_string();

        let Some(template) = &self.body else {
            return format!("File {} needs updating (last modified: {formatted_date})", record.path);
        };

        render(template, |key| match key {
            "path" => Some(record.path.to_string()),
            "name" => Some(record.name.clone()),
            "formatted_date" => Some(formatted_date.clone()),
            "last_modified" => Some(record.last_modified.to_rfc3339_opts(SecondsFormat::Secs, true)),
            "age_days" => Some(record.age_days.to_string()),
            "threshold_days" => Some(record.threshold_days.to_string()),
            "overdue_days" => Some(record.overdue_days().to_string()),
            _ => None,
        })
    }
}

/// Replace every known `{key}`; unknown keys are left as written.
fn render(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string()))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use chrono::{TimeZone, Utc};

    fn record() -> FileRecord {
        let when = Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap();
        FileRecord::new(Utf8PathBuf::from("holidays/countries/south_korea.py"), when, 200, 180)
    }

    #[test]
    fn test_default_title() {
        let template = IssueTemplate::load(DEFAULT_TITLE_TEMPLATE, None);
        assert_eq!(template.title(&record()), "[Data Freshness] Update required: South Korea");
    }

    #[test]
    fn test_title_ignores_age_placeholders() {
        let template = IssueTemplate::new("{name} is {age_days} days old", None);
        assert_eq!(template.title(&record()), "South Korea is {age_days} days old");
    }

    #[test]
    fn test_title_is_stable_across_ages() {
        let template = IssueTemplate::new("Update {path}", None);
        let mut older = record();
        older.age_days = 400;
        assert_eq!(template.title(&record()), template.title(&older));
    }

    #[test]
    fn test_body_placeholders() {
        let template = IssueTemplate::new(
            "t",
            Some("{name}|{path}|{formatted_date}|{age_days}|{threshold_days}|{overdue_days}|{last_modified}|{unknown}".to_string()),
        );

        assert_eq!(
            template.body(&record()),
            "South Korea|holidays/countries/south_korea.py|January 05, 2024|200|180|20|2024-01-05T10:00:00Z|{unknown}"
        );
    }

    #[test]
    fn test_default_body_mentions_file() {
        let template = IssueTemplate::load(DEFAULT_TITLE_TEMPLATE, None);
        let body = template.body(&record());

        assert!(body.contains("holidays/countries/south_korea.py"));
        assert!(body.contains("January 05, 2024"));
        assert!(body.contains("200"));
        assert!(!body.contains("{path}"));
    }

    #[test]
    fn test_missing_template_file_falls_back() {
        let template = IssueTemplate::load(DEFAULT_TITLE_TEMPLATE, Some(Utf8Path::new("/no/such/template.md")));
        assert_eq!(
            template.body(&record()),
            "File holidays/countries/south_korea.py needs updating (last modified: January 05, 2024)"
        );
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_template_file_is_read() {
        let tmp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().join("body.md")).unwrap();
        fs::write(&path, "Please refresh {name}.").unwrap();

        let template = IssueTemplate::load(DEFAULT_TITLE_TEMPLATE, Some(&path));
        assert_eq!(template.body(&record()), "Please refresh South Korea.");
    }
}
