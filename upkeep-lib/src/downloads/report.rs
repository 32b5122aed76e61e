use super::LOG_TARGET;
use super::humanize::humanize;
use super::period::PeriodBucket;
use super::series::DownloadSeries;
use crate::Result;
use camino::Utf8Path;
use chrono::{DateTime, SecondsFormat, Utc};
use ohno::IntoAppError;
use serde::Serialize;
use std::fs;

pub const DATA_SOURCE: &str = "pepy.tech_v2";

/// Where the report's figures came from.
#[derive(Debug, Clone)]
pub struct ReportSource<'a> {
    pub package: &'a str,
    pub source_url: &'a str,
    pub package_url: &'a str,
}

/// Window totals computed for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodTotals {
    pub previous_month: u64,
    pub last_30_days: u64,
    pub last_7_days: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportingPeriod {
    pub start_date: String,
    pub end_date: String,
}

/// The download summary document persisted as YAML.
///
/// Field order is the order of keys in the written file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    pub data_source: String,
    pub source: String,
    pub package: String,
    pub package_url: String,
    pub last_updated: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_recent_data_date: Option<String>,

    pub monthly_reporting_period: ReportingPeriod,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_downloads: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_downloads_human: Option<String>,

    pub last_7d_downloads: u64,
    pub last_7d_downloads_human: String,

    pub last_30d_downloads: u64,
    pub last_30d_downloads_human: String,

    pub monthly_downloads: u64,
    pub monthly_downloads_human: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_downloads_all_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_downloads_all_time_human: Option<String>,
}

impl AggregateReport {
    /// Assemble the report from aggregated totals and the raw upstream data.
    #[must_use]
    pub fn new(
        source: &ReportSource<'_>,
        now: DateTime<Utc>,
        month: &PeriodBucket,
        totals: PeriodTotals,
        series: Option<&DownloadSeries>,
        total_downloads: Option<u64>,
    ) -> Self {
        let daily_downloads = series.and_then(DownloadSeries::most_recent_total);

        Self {
            data_source: DATA_SOURCE.to_string(),
            source: source.source_url.to_string(),
            package: source.package.to_string(),
            package_url: source.package_url.to_string(),
            last_updated: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            most_recent_data_date: series.and_then(DownloadSeries::most_recent_date).map(str::to_string),
            monthly_reporting_period: ReportingPeriod {
                start_date: month.start_date(),
                end_date: month.end_date(),
            },
            daily_downloads,
            daily_downloads_human: daily_downloads.map(humanize),
            last_7d_downloads: totals.last_7_days,
            last_7d_downloads_human: humanize(totals.last_7_days),
            last_30d_downloads: totals.last_30_days,
            last_30d_downloads_human: humanize(totals.last_30_days),
            monthly_downloads: totals.previous_month,
            monthly_downloads_human: humanize(totals.previous_month),
            total_downloads_all_time: total_downloads,
            total_downloads_all_time_human: total_downloads.map(humanize),
        }
    }

    /// Serialize the report as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).into_app_err("serializing download report")
    }

    /// Write the report to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent).into_app_err_with(|| format!("could not create directory '{parent}'"))?;
        }

        let yaml = self.to_yaml()?;
        fs::write(path, yaml).into_app_err_with(|| format!("could not write download report to '{path}'"))?;

        log::info!(target: LOG_TARGET, "Successfully saved data to {path}");
        Ok(())
    }
}
