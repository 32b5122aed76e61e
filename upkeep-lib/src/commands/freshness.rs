use super::Host;
use super::common::{CommonArgs, init_logging, split_list_values};
use super::config::Config;
use crate::Result;
use crate::freshness::{
    AgeOracle, AgeSource, Forge, FreshnessRun, GitLog, IssuePublisher, IssueTemplate, PathResolver, RepoSlug, check_freshness,
    write_ci_outputs,
};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use clap::{ArgAction, Parser};
use core::fmt::Write as _;
use ohno::{IntoAppError, app_err, bail};
use std::fs;
use std::io::Write;

const LOG_TARGET: &str = "  commands";

#[derive(Parser, Debug)]
pub struct FreshnessArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Globs, directories or files to check, relative to the repository root.
    /// May be repeated, and each value may hold several newline-separated entries
    #[arg(long, value_name = "PATHS")]
    pub paths: Vec<String>,

    /// Report files whose last change is more than this many days ago
    #[arg(long, value_name = "DAYS")]
    pub threshold_days: Option<u32>,

    /// Where a file's last change comes from
    #[arg(long, value_name = "SOURCE")]
    pub age_source: Option<AgeSource>,

    /// Repository that receives tracking issues
    #[arg(long, value_name = "OWNER/NAME", env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// GitHub token used to search and create issues
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Report what would be done without creating issues
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_value = "false", default_missing_value = "true", action = ArgAction::Set)]
    pub dry_run: bool,

    /// Root of the repository to check
    #[arg(long, value_name = "PATH", env = "GITHUB_WORKSPACE", default_value = ".")]
    pub repo_path: Utf8PathBuf,

    /// File receiving `name=value` step outputs
    #[arg(long, value_name = "PATH", env = "GITHUB_OUTPUT")]
    pub github_output: Option<Utf8PathBuf>,

    /// Register the repository root as a git safe directory before scanning
    #[arg(long)]
    pub mark_safe_directory: bool,

    /// Base URL of the GitHub API
    #[arg(long, value_name = "URL", hide = true)]
    pub github_api_url: Option<String>,
}

pub async fn process_freshness<H: Host>(host: &mut H, args: &FreshnessArgs) -> Result<()> {
    init_logging(args.common.log_level);

    match process_freshness_inner(args).await {
        Ok(run) => {
            let outputs = args.github_output.as_deref().map_or(Ok(()), |path| write_run_outputs(path, &run));
            let _ = write!(host.output(), "{}", summary(&run, args.dry_run));

            if let Err(e) = outputs {
                let _ = writeln!(host.error(), "❌ Failed to write step outputs: {e:#}");
                host.exit(1);
                return Err(e);
            }

            if run.errors() > 0 {
                let _ = writeln!(host.error(), "❌ Freshness check finished with {} error(s)", run.errors());
                host.exit(1);
                return Err(app_err!("freshness check finished with {} error(s)", run.errors()));
            }

            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Freshness check failed: {e:#}");
            host.exit(1);
            Err(e)
        }
    }
}

async fn process_freshness_inner(args: &FreshnessArgs) -> Result<FreshnessRun> {
    let root = resolve_root(&args.repo_path)?;
    let config = Config::load(&root, args.common.config.as_ref())?;
    let settings = &config.freshness;

    let entries = if args.paths.is_empty() {
        settings.paths.clone()
    } else {
        split_list_values(&args.paths)
    };
    let threshold_days = args.threshold_days.unwrap_or(settings.threshold_days);
    let age_source = args.age_source.unwrap_or(settings.age_source);
    let repository = match args.repository.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => Some(slug.parse::<RepoSlug>()?),
        _ => settings.repository_slug()?,
    };

    log::debug!(target: LOG_TARGET, "Checking {} path entries under {root}", entries.len());

    let git = GitLog::new(root.clone(), settings.git_timeout());

    if args.mark_safe_directory
        && let Err(e) = git.mark_safe_directory().await
    {
        log::warn!(target: LOG_TARGET, "Failed to configure git safe directory: {e:#}");
    }

    if !git.is_work_tree().await {
        match age_source {
            AgeSource::Git => bail!("'{root}' is not a git work tree, so file ages cannot be determined"),
            AgeSource::GitOrMtime => {
                log::warn!(target: LOG_TARGET, "'{root}' is not a git work tree, using file modification times");
            }
        }
    }

    let api_base = args.github_api_url.as_deref().or(settings.github_api_url.as_deref());
    let forge = Forge::connect(args.github_token.as_deref(), repository.as_ref(), api_base);
    let template = IssueTemplate::load(
        settings.issue_title_template.clone(),
        settings.issue_body_template.as_deref().map(Utf8Path::new),
    );

    let resolver = PathResolver::new(root, settings.extension.clone(), settings.excluded_file_names.clone());
    let oracle = AgeOracle::new(git, age_source, Utc::now());
    let publisher = IssuePublisher::new(forge, template, args.dry_run);

    Ok(check_freshness(&resolver, &oracle, &publisher, &entries, threshold_days).await)
}

fn write_run_outputs(path: &Utf8Path, run: &FreshnessRun) -> Result<()> {
    write_ci_outputs(
        path,
        &[
            ("outdated_files_count", run.scan.outdated.len().to_string()),
            ("issues_created_count", run.stats.created.to_string()),
            ("issues_existing_count", run.stats.existing.to_string()),
            ("errors_count", run.errors().to_string()),
        ],
    )
}

fn resolve_root(repo_path: &Utf8Path) -> Result<Utf8PathBuf> {
    let root = fs::canonicalize(repo_path).into_app_err_with(|| format!("repository path '{repo_path}' does not exist"))?;
    let root = Utf8PathBuf::try_from(root).into_app_err_with(|| format!("repository path '{repo_path}' is not valid UTF-8"))?;

    if !root.is_dir() {
        bail!("repository path '{repo_path}' is not a directory");
    }

    Ok(root)
}

fn summary(run: &FreshnessRun, dry_run: bool) -> String {
    let mut text = String::new();

    let _ = writeln!(text, "Files checked: {}", run.scan.checked);
    let _ = writeln!(text, "Outdated files: {}", run.scan.outdated.len());
    let _ = writeln!(text, "Issues created: {}", run.stats.created);
    let _ = writeln!(text, "Existing issues: {}", run.stats.existing);
    if dry_run {
        let _ = writeln!(text, "Issues that would be created: {}", run.stats.dry_run);
    }
    let _ = writeln!(text, "Errors: {}", run.errors());

    for record in &run.scan.outdated {
        let _ = writeln!(text, "  - {} ({} days old)", record.path, record.age_days);
    }

    for failure in &run.scan.failures {
        let _ = writeln!(text, "  ! {}: {:#}", failure.path, failure.error);
    }

    for failure in &run.stats.failures {
        let _ = writeln!(text, "  ! {}: {:#}", failure.path, failure.error);
    }

    text
}
