use super::Host;
use super::common::{CommonArgs, init_logging};
use super::config::Config;
use crate::Result;
use crate::downloads::{AggregateReport, ReportSource, StatsClient, refresh_report};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use clap::Parser;
use core::fmt::Write as _;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct DownloadsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// API key for the statistics service
    #[arg(long, value_name = "KEY", env = "PEPY_TECH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Package whose downloads are reported
    #[arg(long, value_name = "NAME")]
    pub package: Option<String>,

    /// Report file to write
    #[arg(long, value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,

    /// Statistics endpoint; `{package}` is replaced with the package name
    #[arg(long, value_name = "URL", hide = true)]
    pub api_url: Option<String>,
}

pub async fn process_downloads<H: Host>(host: &mut H, args: &DownloadsArgs) -> Result<()> {
    init_logging(args.common.log_level);

    match process_downloads_inner(args).await {
        Ok((report, output)) => {
            let _ = write!(host.output(), "{}", summary(&report, &output));
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Failed to update download statistics: {e:#}");
            host.exit(1);
            Err(e)
        }
    }
}

async fn process_downloads_inner(args: &DownloadsArgs) -> Result<(AggregateReport, Utf8PathBuf)> {
    let config = Config::load(Utf8Path::new("."), args.common.config.as_ref())?;
    let settings = &config.downloads;

    let package = args.package.as_deref().unwrap_or(&settings.package);
    let output = args.output.clone().unwrap_or_else(|| Utf8PathBuf::from(&settings.output));
    let api_url = args
        .api_url
        .as_deref()
        .map_or_else(|| settings.api_url_for(package), |url| url.replace("{package}", package));
    let package_url = settings.package_url_for(package);

    let client = StatsClient::new(args.api_key.as_deref(), api_url, settings.request_timeout())?;
    let source = ReportSource {
        package,
        source_url: &settings.source_url,
        package_url: &package_url,
    };

    let report = refresh_report(&client, &source, Utc::now(), &output).await?;
    Ok((report, output))
}

fn summary(report: &AggregateReport, output: &Utf8Path) -> String {
    let mut text = String::new();

    let _ = writeln!(text, "Download statistics for {} written to {output}", report.package);
    let _ = writeln!(
        text,
        "Monthly downloads ({} to {}): {} ({})",
        report.monthly_reporting_period.start_date,
        report.monthly_reporting_period.end_date,
        report.monthly_downloads,
        report.monthly_downloads_human
    );
    let _ = writeln!(text, "Last 30 days: {} ({})", report.last_30d_downloads, report.last_30d_downloads_human);
    let _ = writeln!(text, "Last 7 days: {} ({})", report.last_7d_downloads, report.last_7d_downloads_human);

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort")]
    async fn test_missing_api_key_fails_before_fetching() {
        let tmp = tempfile::tempdir().unwrap();
        let output = Utf8PathBuf::try_from(tmp.path().join("report.yaml")).unwrap();
        let args = DownloadsArgs {
            common: CommonArgs {
                config: None,
                log_level: super::super::common::LogLevel::None,
            },
            api_key: Some("   ".to_string()),
            package: None,
            output: Some(output.clone()),
            api_url: Some("http://127.0.0.1:9/{package}".to_string()),
        };

        let mut host = TestHost::new();
        let result = process_downloads(&mut host, &args).await;

        assert!(result.is_err());
        assert_eq!(host.exit_code, Some(1));
        assert!(!output.exists());
    }
}
