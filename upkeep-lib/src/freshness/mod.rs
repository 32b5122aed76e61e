//! Data file freshness checks
//!
//! Finds data files that have not changed for longer than a threshold and makes sure each of
//! them has an open tracking issue.
//!
//! # Implementation Model
//!
//! - [`PathResolver`] expands globs, directories and single files into candidate files,
//!   skipping package-init markers and other excluded names.
//! - [`AgeOracle`] asks a [`ChangeLog`] (normally [`GitLog`]) when each file last changed and
//!   applies the configured [`AgeSource`] policy when there is no history.
//! - [`OutdatedSetBuilder`] turns candidates into [`FileRecord`]s for files past the threshold,
//!   collecting per-file failures instead of aborting.
//! - [`IssuePublisher`] renders an [`IssueTemplate`] and creates issues through an
//!   [`IssueForge`], reusing an open issue with the same title when there is one.
//!
//! [`check_freshness`] runs all of the above once.

mod age;
mod ci_output;
mod forge;
mod git;
mod github;
mod paths;
mod publisher;
mod record;
mod scan;
mod template;

pub use age::{AgeOracle, AgeSource, ChangeLog};
pub use ci_output::write_ci_outputs;
pub use forge::{DisabledForge, Forge, IssueForge, IssueRef, RepoSlug};
pub use git::GitLog;
pub use github::GitHubForge;
pub use paths::PathResolver;
pub use publisher::{IssuePublisher, PublishFailure, PublishOutcome, PublishStats};
pub use record::{FileRecord, extract_name_from_path};
pub use scan::{OutdatedSetBuilder, ScanFailure, ScanOutcome};
pub use template::{DEFAULT_BODY_TEMPLATE, DEFAULT_TITLE_TEMPLATE, IssueTemplate};

pub(crate) const LOG_TARGET: &str = " freshness";

/// Everything a freshness run found and did.
#[derive(Debug)]
pub struct FreshnessRun {
    pub scan: ScanOutcome,
    pub stats: PublishStats,
}

impl FreshnessRun {
    /// Files that could not be checked plus issues that could not be published.
    #[must_use]
    pub fn errors(&self) -> usize {
        self.scan.failures.len() + self.stats.errors()
    }
}

/// Scan `entries`, classify files against `threshold_days`, and publish tracking issues.
pub async fn check_freshness<L, F, S>(
    resolver: &PathResolver,
    oracle: &AgeOracle<L>,
    publisher: &IssuePublisher<F>,
    entries: &[S],
    threshold_days: u32,
) -> FreshnessRun
where
    L: ChangeLog + Sync,
    F: IssueForge + Sync,
    S: AsRef<str>,
{
    log::info!(target: LOG_TARGET, "Starting freshness check with a threshold of {threshold_days} days");

    let scan = OutdatedSetBuilder::new(resolver, oracle, threshold_days).scan(entries).await;
    let stats = publisher.publish_all(&scan.outdated).await;

    log::info!(target: LOG_TARGET, "Freshness check completed:");
    log::info!(target: LOG_TARGET, "  - Issues created: {}", stats.created);
    log::info!(target: LOG_TARGET, "  - Existing issues: {}", stats.existing);
    log::info!(target: LOG_TARGET, "  - Errors: {}", scan.failures.len() + stats.errors());

    FreshnessRun { scan, stats }
}
