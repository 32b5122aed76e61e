use super::LOG_TARGET;
use super::age::ChangeLog;
use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::{IntoAppError, bail};
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Commit history of a local git work tree.
#[derive(Debug, Clone)]
pub struct GitLog {
    root: Utf8PathBuf,
    timeout: Duration,
}

impl GitLog {
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>, timeout: Duration) -> Self {
        Self {
            root: root.into(),
            timeout,
        }
    }

    /// Whether the root is inside a git work tree that git is willing to operate on.
    pub async fn is_work_tree(&self) -> bool {
        match self.git(&["rev-parse", "--is-inside-work-tree"]).await {
            Ok(output) => output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "true",
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Could not query git work tree: {e:#}");
                false
            }
        }
    }

    /// Register the root in the global `safe.directory` list.
    ///
    /// CI containers often check out the repository as a different user than the one running
    /// git, which makes git refuse to read it.
    pub async fn mark_safe_directory(&self) -> Result<()> {
        let output = run_git_with_timeout(
            &["config", "--global", "--add", "safe.directory", self.root.as_str()],
            self.timeout,
        )
        .await?;

        check_git_output(&output, "git config safe.directory")?;
        log::debug!(target: LOG_TARGET, "Configured git safe directory: {}", self.root);
        Ok(())
    }

    async fn git(&self, args: &[&str]) -> Result<Output> {
        let mut full = vec!["-C", self.root.as_str()];
        full.extend_from_slice(args);
        run_git_with_timeout(&full, self.timeout).await
    }
}

impl ChangeLog for GitLog {
    async fn last_commit_time(&self, relative_path: &Utf8Path) -> Result<Option<DateTime<Utc>>> {
        // %ct = committer date as a unix timestamp
        let output = self.git(&["log", "-1", "--format=%ct", "--", relative_path.as_str()]).await?;
        check_git_output(&output, "git log")?;

        parse_commit_timestamp(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_commit_timestamp(stdout: &str) -> Result<Option<DateTime<Utc>>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let seconds: i64 = trimmed
        .parse::<i64>()
        .into_app_err_with(|| format!("unexpected output from git log: '{trimmed}'"))?;

    DateTime::from_timestamp(seconds, 0)
        .into_app_err_with(|| format!("commit timestamp {seconds} is out of range"))
        .map(Some)
}

fn check_git_output(output: &Output, operation: &str) -> Result<()> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{operation} failed: {}", stderr.trim());
    }
    Ok(())
}

async fn run_git_with_timeout(args: &[&str], timeout: Duration) -> Result<Output> {
    let child = Command::new("git")
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .into_app_err("could not spawn git command")?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(e).into_app_err_with(|| format!("'git {}' failed to run", args.join(" "))),
        Err(_) => {
            bail!("'git {}' timed out after {} seconds", args.join(" "), timeout.as_secs());
        }
    }
}
