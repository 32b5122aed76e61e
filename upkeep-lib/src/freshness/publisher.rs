use super::LOG_TARGET;
use super::forge::{IssueForge, IssueRef};
use super::record::FileRecord;
use super::template::IssueTemplate;
use crate::Result;
use camino::Utf8PathBuf;

/// What happened to one outdated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A new tracking issue was opened.
    Created(IssueRef),

    /// An open issue with the same title already tracks this file.
    Existing(IssueRef),

    /// Dry run: an issue would have been opened.
    DryRun,
}

/// A file whose tracking issue could not be published.
#[derive(Debug)]
pub struct PublishFailure {
    pub path: Utf8PathBuf,
    pub error: ohno::AppError,
}

/// Counters for one publishing run.
#[derive(Debug, Default)]
pub struct PublishStats {
    pub created: usize,
    pub existing: usize,
    pub dry_run: usize,
    pub failures: Vec<PublishFailure>,
}

impl PublishStats {
    #[must_use]
    pub const fn errors(&self) -> usize {
        self.failures.len()
    }
}

/// Ensures one open tracking issue per outdated file.
#[derive(Debug)]
pub struct IssuePublisher<F> {
    forge: F,
    template: IssueTemplate,
    dry_run: bool,
}

impl<F: IssueForge + Sync> IssuePublisher<F> {
    #[must_use]
    pub const fn new(forge: F, template: IssueTemplate, dry_run: bool) -> Self {
        Self { forge, template, dry_run }
    }

    #[must_use]
    pub const fn forge(&self) -> &F {
        &self.forge
    }

    /// Publish the issue for one file.
    ///
    /// A failed search is logged and treated as "no existing issue", so a search outage can
    /// produce a duplicate issue but never hides an outdated file.
    pub async fn publish(&self, record: &FileRecord) -> Result<PublishOutcome> {
        let title = self.template.title(record);

        match self.forge.find_open_issue_by_title(&title).await {
            Ok(Some(issue)) => {
                log::info!(target: LOG_TARGET, "Existing issue found for {}: #{}", record.path, issue.number);
                return Ok(PublishOutcome::Existing(issue));
            }
            Ok(None) => {}
            Err(e) => {
                log::error!(target: LOG_TARGET, "Error searching for existing issues: {e:#}");
            }
        }

        if self.dry_run {
            log::info!(target: LOG_TARGET, "[DRY RUN] Would create issue for: {}", record.path);
            return Ok(PublishOutcome::DryRun);
        }

        let body = self.template.body(record);
        let issue = self.forge.create_issue(&title, &body).await?;
        log::info!(target: LOG_TARGET, "Created issue #{} for {}", issue.number, record.path);

        Ok(PublishOutcome::Created(issue))
    }

    /// Publish issues for all records, counting outcomes and collecting failures.
    pub async fn publish_all(&self, records: &[FileRecord]) -> PublishStats {
        let mut stats = PublishStats::default();

        for record in records {
            match self.publish(record).await {
                Ok(PublishOutcome::Created(_)) => stats.created += 1,
                Ok(PublishOutcome::Existing(_)) => stats.existing += 1,
                Ok(PublishOutcome::DryRun) => stats.dry_run += 1,
                Err(error) => {
                    log::error!(target: LOG_TARGET, "Failed to create issue for {}: {error:#}", record.path);
                    stats.failures.push(PublishFailure {
                        path: record.path.clone(),
                        error,
                    });
                }
            }
        }

        stats
    }
}
