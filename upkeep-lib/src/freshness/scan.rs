use super::LOG_TARGET;
use super::age::{AgeOracle, ChangeLog};
use super::paths::PathResolver;
use super::record::FileRecord;
use camino::Utf8PathBuf;

/// A file whose age could not be determined.
#[derive(Debug)]
pub struct ScanFailure {
    pub path: Utf8PathBuf,
    pub error: ohno::AppError,
}

/// Result of checking a set of candidate files against the age threshold.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub checked: usize,
    pub outdated: Vec<FileRecord>,
    pub failures: Vec<ScanFailure>,
}

/// Classifies candidate files as outdated when their age exceeds a threshold.
#[derive(Debug)]
pub struct OutdatedSetBuilder<'a, L> {
    resolver: &'a PathResolver,
    oracle: &'a AgeOracle<L>,
    threshold_days: u32,
}

impl<'a, L: ChangeLog + Sync> OutdatedSetBuilder<'a, L> {
    #[must_use]
    pub const fn new(resolver: &'a PathResolver, oracle: &'a AgeOracle<L>, threshold_days: u32) -> Self {
        Self {
            resolver,
            oracle,
            threshold_days,
        }
    }

    /// Resolve `entries` and check every resulting file in order.
    pub async fn scan<S: AsRef<str>>(&self, entries: &[S]) -> ScanOutcome {
        let files = self.resolver.resolve(entries);

        if files.is_empty() {
            log::warn!(target: LOG_TARGET, "No files found to check");
        } else {
            log::info!(target: LOG_TARGET, "Found {} files to check", files.len());
        }

        self.scan_files(files).await
    }

    /// Check already resolved files.
    ///
    /// A failure for one file is recorded and does not stop the remaining files from being checked.
    pub async fn scan_files(&self, files: impl IntoIterator<Item = Utf8PathBuf>) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();

        for path in files {
            outcome.checked += 1;
            let relative = self.resolver.relative(&path).to_path_buf();

            let last_changed = match self.oracle.last_changed(&path, &relative).await {
                Ok(when) => when,
                Err(error) => {
                    log::error!(target: LOG_TARGET, "Error getting last change date for {relative}: {error:#}");
                    outcome.failures.push(ScanFailure { path: relative, error });
                    continue;
                }
            };

            let age_days = self.oracle.age_days(last_changed);
            if age_days > self.threshold_days {
                log::info!(target: LOG_TARGET, "Outdated file found: {relative} ({age_days} days old)");
                outcome
                    .outdated
                    .push(FileRecord::new(relative, last_changed, age_days, self.threshold_days));
            } else {
                log::debug!(target: LOG_TARGET, "{relative} is {age_days} days old, within threshold");
            }
        }

        outcome
    }
}
