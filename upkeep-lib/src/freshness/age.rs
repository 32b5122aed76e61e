use super::LOG_TARGET;
use crate::Result;
use camino::Utf8Path;
use chrono::{DateTime, Utc};
use ohno::{IntoAppError, bail};
use serde::Deserialize;
use std::fs;

/// Source of the most recent change to a file, typically version-control history.
pub trait ChangeLog {
    /// Time of the latest recorded change to `relative_path`, or `None` when it has no history.
    fn last_commit_time(&self, relative_path: &Utf8Path) -> impl Future<Output = Result<Option<DateTime<Utc>>>> + Send;
}

/// Where a file's last-changed time is taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AgeSource {
    /// Commit history only; a file without history is an error.
    #[default]
    Git,

    /// Commit history, falling back to the filesystem modification time.
    GitOrMtime,
}

/// Determines how long ago files last changed.
#[derive(Debug, Clone)]
pub struct AgeOracle<L> {
    log: L,
    source: AgeSource,
    now: DateTime<Utc>,
}

impl<L: ChangeLog + Sync> AgeOracle<L> {
    #[must_use]
    pub const fn new(log: L, source: AgeSource, now: DateTime<Utc>) -> Self {
        Self { log, source, now }
    }

    #[must_use]
    pub const fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// When the file at `path` (known to history as `relative_path`) last changed.
    pub async fn last_changed(&self, path: &Utf8Path, relative_path: &Utf8Path) -> Result<DateTime<Utc>> {
        let history = self.log.last_commit_time(relative_path).await;

        match (history, self.source) {
            (Ok(Some(when)), _) => Ok(when),
            (Ok(None), AgeSource::Git) => bail!("no git commit history found for file: {relative_path}"),
            (Err(e), AgeSource::Git) => Err(e),
            (Ok(None), AgeSource::GitOrMtime) => {
                log::warn!(target: LOG_TARGET, "No commit history for {relative_path}, using file modification time");
                modification_time(path)
            }
            (Err(e), AgeSource::GitOrMtime) => {
                log::warn!(target: LOG_TARGET, "Could not read commit history for {relative_path} ({e}), using file modification time");
                modification_time(path)
            }
        }
    }

    /// Whole days elapsed since `last_changed`, truncated, and zero for times in the future.
    #[must_use]
    pub fn age_days(&self, last_changed: DateTime<Utc>) -> u32 {
        let days = (self.now - last_changed).num_days().max(0);
        u32::try_from(days).unwrap_or(u32::MAX)
    }
}

fn modification_time(path: &Utf8Path) -> Result<DateTime<Utc>> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .into_app_err_with(|| format!("could not read modification time of '{path}'"))?;

    Ok(DateTime::<Utc>::from(modified))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use chrono::{Duration, TimeZone};
    use ohno::app_err;
    use std::collections::HashMap;

    /// In-memory history keyed by relative path; `broken` simulates a failing git.
    #[derive(Debug, Default)]
    pub(crate) struct FakeLog {
        pub(crate) commits: HashMap<Utf8PathBuf, DateTime<Utc>>,
        pub(crate) broken: bool,
    }

    impl ChangeLog for FakeLog {
        async fn last_commit_time(&self, relative_path: &Utf8Path) -> Result<Option<DateTime<Utc>>> {
            if self.broken {
                return Err(app_err!("git log failed: fatal: not a git repository"));
            }
            Ok(self.commits.get(relative_path).copied())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_last_changed_from_history() {
        let when = now() - Duration::days(3);
        let log = FakeLog {
            commits: HashMap::from([(Utf8PathBuf::from("a.py"), when)]),
            broken: false,
        };
        let oracle = AgeOracle::new(log, AgeSource::Git, now());

        let last = oracle.last_changed(Utf8Path::new("/repo/a.py"), Utf8Path::new("a.py")).await.unwrap();
        assert_eq!(last, when);
        assert_eq!(oracle.age_days(last), 3);
    }

    #[tokio::test]
    async fn test_strict_policy_without_history_is_error() {
        let oracle = AgeOracle::new(FakeLog::default(), AgeSource::Git, now());
        let result = oracle.last_changed(Utf8Path::new("/repo/a.py"), Utf8Path::new("a.py")).await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("no git commit history"));
    }

    #[tokio::test]
    async fn test_strict_policy_propagates_git_failure() {
        let log = FakeLog {
            broken: true,
            ..FakeLog::default()
        };
        let oracle = AgeOracle::new(log, AgeSource::Git, now());
        assert!(oracle.last_changed(Utf8Path::new("/repo/a.py"), Utf8Path::new("a.py")).await.is_err());
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn test_lenient_policy_falls_back_to_mtime() {
        let tmp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().join("a.py")).unwrap();
        fs::write(&path, "x").unwrap();

        let current = Utc::now();
        let oracle = AgeOracle::new(FakeLog::default(), AgeSource::GitOrMtime, current);
        let last = oracle.last_changed(&path, Utf8Path::new("a.py")).await.unwrap();

        assert_eq!(oracle.age_days(last), 0);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn test_lenient_policy_falls_back_when_git_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().join("a.py")).unwrap();
        fs::write(&path, "x").unwrap();

        let log = FakeLog {
            broken: true,
            ..FakeLog::default()
        };
        let oracle = AgeOracle::new(log, AgeSource::GitOrMtime, Utc::now());
        assert!(oracle.last_changed(&path, Utf8Path::new("a.py")).await.is_ok());
    }

    #[tokio::test]
    async fn test_lenient_policy_missing_file_is_error() {
        let oracle = AgeOracle::new(FakeLog::default(), AgeSource::GitOrMtime, now());
        let result = oracle.last_changed(Utf8Path::new("/definitely/not/here.py"), Utf8Path::new("here.py")).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_age_days_truncates() {
        let oracle = AgeOracle::new(FakeLog::default(), AgeSource::Git, now());
        assert_eq!(oracle.age_days(now() - Duration::hours(47)), 1);
        assert_eq!(oracle.age_days(now() - Duration::days(200)), 200);
    }

    #[test]
    fn test_age_days_future_is_zero() {
        let oracle = AgeOracle::new(FakeLog::default(), AgeSource::Git, now());
        assert_eq!(oracle.age_days(now() + Duration::days(5)), 0);
    }

    #[test]
    fn test_age_source_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            source: AgeSource,
        }

        let lenient: Wrapper = toml::from_str(r#"source = "git-or-mtime""#).unwrap();
        assert_eq!(lenient.source, AgeSource::GitOrMtime);

        let strict: Wrapper = toml::from_str(r#"source = "git""#).unwrap();
        assert_eq!(strict.source, AgeSource::Git);
    }
}
