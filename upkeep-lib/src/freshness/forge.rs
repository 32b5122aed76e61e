use super::LOG_TARGET;
use super::github::GitHubForge;
use crate::Result;
use core::fmt;
use core::str::FromStr;
use ohno::{AppError, app_err, bail};

/// A repository on the issue forge, written `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoSlug {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().trim_end_matches(".git");
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(app_err!("invalid repository '{s}', expected 'owner/name'")),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A tracking issue on the forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    pub number: u64,
    pub url: Option<String>,
}

/// The operations needed from an issue tracker.
pub trait IssueForge {
    /// Find an open issue whose title is exactly `title`.
    fn find_open_issue_by_title(&self, title: &str) -> impl Future<Output = Result<Option<IssueRef>>> + Send;

    /// Open a new issue.
    fn create_issue(&self, title: &str, body: &str) -> impl Future<Output = Result<IssueRef>> + Send;
}

/// Stand-in used when no forge client could be set up: finds nothing and refuses to create.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledForge;

impl IssueForge for DisabledForge {
    async fn find_open_issue_by_title(&self, _title: &str) -> Result<Option<IssueRef>> {
        Ok(None)
    }

    async fn create_issue(&self, _title: &str, _body: &str) -> Result<IssueRef> {
        bail!("issue forge is not available (missing token or repository)")
    }
}

/// The forge selected at startup.
#[derive(Debug, Clone)]
pub enum Forge {
    GitHub(GitHubForge),
    Disabled(DisabledForge),
}

impl Forge {
    /// Connect to GitHub when both a token and a repository are known, otherwise disable issue creation.
    #[must_use]
    pub fn connect(token: Option<&str>, repository: Option<&RepoSlug>, api_base: Option<&str>) -> Self {
        let (Some(token), Some(repository)) = (token.filter(|t| !t.trim().is_empty()), repository) else {
            log::warn!(target: LOG_TARGET, "No GitHub token or repository configured, issue creation disabled");
            return Self::Disabled(DisabledForge);
        };

        match GitHubForge::new(token, repository.clone(), api_base) {
            Ok(forge) => Self::GitHub(forge),
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Failed to initialize GitHub client: {e:#}");
                Self::Disabled(DisabledForge)
            }
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::GitHub(_))
    }
}

impl IssueForge for Forge {
    async fn find_open_issue_by_title(&self, title: &str) -> Result<Option<IssueRef>> {
        match self {
            Self::GitHub(forge) => forge.find_open_issue_by_title(title).await,
            Self::Disabled(forge) => forge.find_open_issue_by_title(title).await,
        }
    }

    async fn create_issue(&self, title: &str, body: &str) -> Result<IssueRef> {
        match self {
            Self::GitHub(forge) => forge.create_issue(title, body).await,
            Self::Disabled(forge) => forge.create_issue(title, body).await,
        }
    }
}
