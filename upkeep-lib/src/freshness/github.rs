//! GitHub issue forge
//!
//! Thin wrapper over octocrab's issues API for the one repository being checked.

use super::LOG_TARGET;
use super::forge::{IssueForge, IssueRef, RepoSlug};
use crate::Result;
use octocrab::Octocrab;
use octocrab::models::issues::Issue;
use octocrab::params::State;
use ohno::IntoAppError;

const ISSUE_PAGE_SIZE: u8 = 100;

#[derive(Debug, Clone)]
pub struct GitHubForge {
    octocrab: Octocrab,
    repository: RepoSlug,
}

impl GitHubForge {
    /// Create an authenticated client for `repository`, optionally against a non-default API base URL.
    pub fn new(token: &str, repository: RepoSlug, api_base: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(base) = api_base {
            builder = builder
                .base_uri(base)
                .into_app_err_with(|| format!("invalid GitHub API base URL '{base}'"))?;
        }

        Ok(Self {
            octocrab: builder.build()?,
            repository,
        })
    }
}

impl IssueForge for GitHubForge {
    async fn find_open_issue_by_title(&self, title: &str) -> Result<Option<IssueRef>> {
        let first_page = self
            .octocrab
            .issues(&self.repository.owner, &self.repository.name)
            .list()
            .state(State::Open)
            .per_page(ISSUE_PAGE_SIZE)
            .send()
            .await
            .into_app_err_with(|| format!("listing open issues of {}", self.repository))?;

        let issues = self
            .octocrab
            .all_pages::<Issue>(first_page)
            .await
            .into_app_err_with(|| format!("paging through open issues of {}", self.repository))?;

        log::debug!(target: LOG_TARGET, "Searched {} open issues in {}", issues.len(), self.repository);

        // The issues endpoint also returns pull requests
        Ok(issues
            .into_iter()
            .find(|issue| issue.pull_request.is_none() && issue.title == title)
            .map(|issue| to_issue_ref(&issue)))
    }

    async fn create_issue(&self, title: &str, body: &str) -> Result<IssueRef> {
        let issue = self
            .octocrab
            .issues(&self.repository.owner, &self.repository.name)
            .create(title)
            .body(body)
            .send()
            .await
            .into_app_err_with(|| format!("creating issue '{title}' in {}", self.repository))?;

        Ok(to_issue_ref(&issue))
    }
}

fn to_issue_ref(issue: &Issue) -> IssueRef {
    IssueRef {
        number: issue.number,
        url: Some(issue.html_url.to_string()),
    }
}
