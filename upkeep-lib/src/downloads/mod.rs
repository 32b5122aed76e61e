//! Package download statistics
//!
//! Pulls the daily per-version download series for one package from the statistics API,
//! totals it over three reporting windows and persists a YAML summary used for badges.
//!
//! # Implementation Model
//!
//! - [`StatsClient`] performs the single authenticated request and yields [`StatsResponse`]
//!   or nothing at all when the fetch fails for any reason.
//! - [`PeriodBucket`] describes the previous calendar month and the trailing 30 and 7 day
//!   windows; [`aggregate`] sums a [`DownloadSeries`] over one bucket.
//! - [`humanize`] renders counts as `K`/`M`/`B` strings.
//! - [`AggregateReport`] is the flat output document, written by [`AggregateReport::save`].
//!
//! [`refresh_report`] chains these steps; every step that yields no data aborts the run.

mod client;
mod humanize;
mod period;
mod report;
mod series;

pub use client::{StatsClient, StatsResponse};
pub use humanize::humanize;
pub use period::{PeriodBucket, aggregate};
pub use report::{AggregateReport, DATA_SOURCE, PeriodTotals, ReportSource, ReportingPeriod};
pub use series::{DownloadSeries, daily_total};

use crate::Result;
use camino::Utf8Path;
use chrono::{DateTime, Utc};
use ohno::{IntoAppError, bail};

pub(crate) const LOG_TARGET: &str = " downloads";

/// Fetch statistics, aggregate them over the reporting windows, and write the report to `output`.
pub async fn refresh_report(
    client: &StatsClient,
    source: &ReportSource<'_>,
    now: DateTime<Utc>,
    output: &Utf8Path,
) -> Result<AggregateReport> {
    let Some(response) = client.fetch().await else {
        bail!("failed to fetch download data from {}", client.api_url());
    };

    let report = build_report(&response, source, now)?;
    report.save(output)?;

    Ok(report)
}

/// Aggregate an API response into a report without touching the network or the filesystem.
pub fn build_report(response: &StatsResponse, source: &ReportSource<'_>, now: DateTime<Utc>) -> Result<AggregateReport> {
    let series = response
        .downloads
        .as_ref()
        .into_app_err("no 'downloads' key found in the API response")?;

    let month = PeriodBucket::previous_month(now);
    let totals = PeriodTotals {
        previous_month: window_total(series, &month)?,
        last_30_days: window_total(series, &PeriodBucket::last_30_days(now))?,
        last_7_days: window_total(series, &PeriodBucket::last_7_days(now))?,
    };

    log::info!(target: LOG_TARGET, "Extracted monthly downloads: {}", totals.previous_month);

    Ok(AggregateReport::new(source, now, &month, totals, Some(series), response.total_downloads))
}

fn window_total(series: &DownloadSeries, bucket: &PeriodBucket) -> Result<u64> {
    aggregate(series, bucket).into_app_err_with(|| format!("no download data found for the {bucket}"))
}
