use crate::Result;
use crate::freshness::{AgeSource, DEFAULT_TITLE_TEMPLATE, RepoSlug};
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::Deserialize;
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// Name of the configuration file looked up in the base directory
pub const CONFIG_FILE_NAME: &str = "upkeep.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub freshness: FreshnessConfig,

    #[serde(default)]
    pub downloads: DownloadsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FreshnessConfig {
    /// Globs, directories or files to check, relative to the repository root
    #[serde(default = "default_paths")]
    pub paths: Vec<String>,

    /// Files older than this many days are reported
    #[serde(default = "default_threshold_days")]
    pub threshold_days: u32,

    /// Extension of the files to check
    #[serde(default = "default_extension")]
    pub extension: String,

    /// File names that are never checked
    #[serde(default = "default_excluded_file_names")]
    pub excluded_file_names: Vec<String>,

    /// Where a file's last change comes from
    #[serde(default)]
    pub age_source: AgeSource,

    /// Repository receiving tracking issues, as `owner/name`
    #[serde(default)]
    pub repository: Option<String>,

    /// Base URL of the GitHub API, for GitHub Enterprise installations
    #[serde(default)]
    pub github_api_url: Option<String>,

    #[serde(default = "default_issue_title_template")]
    pub issue_title_template: String,

    /// Path of an issue body template file, relative to the configuration file
    #[serde(default)]
    pub issue_body_template: Option<String>,

    /// Upper bound for each git invocation, in seconds
    #[serde(default = "default_git_timeout_secs")]
    pub git_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadsConfig {
    #[serde(default = "default_package")]
    pub package: String,

    /// Statistics endpoint; `{package}` is replaced with the package name
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// Package page; `{package}` is replaced with the package name
    #[serde(default = "default_package_url")]
    pub package_url: String,

    /// Report location
    #[serde(default = "default_output")]
    pub output: String,

    /// Timeout for the statistics request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_paths() -> Vec<String> {
    vec!["holidays/countries/*.py".to_string()]
}

const fn default_threshold_days() -> u32 {
    180
}

fn default_extension() -> String {
    "py".to_string()
}

fn default_excluded_file_names() -> Vec<String> {
    vec!["__init__.py".to_string()]
}

fn default_issue_title_template() -> String {
    DEFAULT_TITLE_TEMPLATE.to_string()
}

const fn default_git_timeout_secs() -> u64 {
    60
}

fn default_package() -> String {
    "holidays".to_string()
}

fn default_api_url() -> String {
    "https://api.pepy.tech/api/v2/projects/{package}".to_string()
}

fn default_source_url() -> String {
    "https://pepy.tech/pepy-api".to_string()
}

fn default_package_url() -> String {
    "https://pepy.tech/projects/{package}".to_string()
}

fn default_output() -> String {
    "badges/downloads/pepy.tech.yaml".to_string()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            paths: default_paths(),
            threshold_days: default_threshold_days(),
            extension: default_extension(),
            excluded_file_names: default_excluded_file_names(),
            age_source: AgeSource::default(),
            repository: None,
            github_api_url: None,
            issue_title_template: default_issue_title_template(),
            issue_body_template: None,
            git_timeout_secs: default_git_timeout_secs(),
        }
    }
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            package: default_package(),
            api_url: default_api_url(),
            source_url: default_source_url(),
            package_url: default_package_url(),
            output: default_output(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl FreshnessConfig {
    #[must_use]
    pub const fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.git_timeout_secs)
    }

    /// The configured repository, parsed.
    pub fn repository_slug(&self) -> Result<Option<RepoSlug>> {
        self.repository.as_deref().map(str::parse::<RepoSlug>).transpose()
    }
}

impl DownloadsConfig {
    #[must_use]
    pub fn api_url_for(&self, package: &str) -> String {
        self.api_url.replace("{package}", package)
    }

    #[must_use]
    pub fn package_url_for(&self, package: &str) -> String {
        self.package_url.replace("{package}", package)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `upkeep.toml` in `base_dir` is used when it exists. Relative
    /// template paths in the file are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds invalid values
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading upkeep configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base_dir.join(CONFIG_FILE_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    // No config file found, use defaults
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading upkeep configuration file '{path}'")),
            }
        };

        let mut config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        if let (Some(template), Some(dir)) = (&config.freshness.issue_body_template, final_path.parent()) {
            config.freshness.issue_body_template = Some(dir.join(template).into_string());
        }

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range or malformed
    pub fn validate(&self) -> Result<()> {
        if self.freshness.extension.trim_start_matches('.').is_empty() {
            return Err(app_err!("freshness.extension must not be empty"));
        }

        if self.freshness.git_timeout_secs == 0 {
            return Err(app_err!("freshness.git_timeout_secs must be greater than 0"));
        }

        let _ = self.freshness.repository_slug()?;

        if self.downloads.package.trim().is_empty() {
            return Err(app_err!("downloads.package must not be empty"));
        }

        if self.downloads.request_timeout_secs == 0 {
            return Err(app_err!("downloads.request_timeout_secs must be greater than 0"));
        }

        Ok(())
    }
}
