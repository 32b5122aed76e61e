use super::LOG_TARGET;
use super::series::{DATE_FORMAT, DownloadSeries, daily_total};
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use core::fmt;

/// An inclusive range of calendar dates used to aggregate a download series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBucket {
    pub label: &'static str,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodBucket {
    /// The full calendar month preceding the month containing `now`.
    #[must_use]
    pub fn previous_month(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let first_of_month = today.with_day(1).unwrap_or(today);
        let end = first_of_month.pred_opt().unwrap_or(first_of_month);
        let start = end.with_day(1).unwrap_or(end);

        Self {
            label: "previous month",
            start,
            end,
        }
    }

    /// A rolling window of `days` days ending at the start of the day containing `now`.
    #[must_use]
    pub fn trailing_days(label: &'static str, now: DateTime<Utc>, days: u64) -> Self {
        let end = now.date_naive();
        let start = end.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);

        Self { label, start, end }
    }

    #[must_use]
    pub fn last_30_days(now: DateTime<Utc>) -> Self {
        Self::trailing_days("last 30 days", now, 30)
    }

    #[must_use]
    pub fn last_7_days(now: DateTime<Utc>) -> Self {
        Self::trailing_days("last 7 days", now, 7)
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    #[must_use]
    pub fn start_date(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    #[must_use]
    pub fn end_date(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for PeriodBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} to {})", self.label, self.start_date(), self.end_date())
    }
}

/// Sum all per-version downloads for the days of `series` that fall inside `bucket`.
///
/// Date keys that do not parse are skipped, as are days whose counts are not an object.
/// Returns `None` when no day inside the bucket was found, which is distinct from a total of zero.
#[must_use]
pub fn aggregate(series: &DownloadSeries, bucket: &PeriodBucket) -> Option<u64> {
    let mut total = 0u64;
    let mut processed = 0usize;

    for (date_str, counts) in series.days() {
        let Ok(date) = NaiveDate::parse_from_str(date_str, DATE_FORMAT) else {
            log::warn!(target: LOG_TARGET, "Could not parse date '{date_str}', skipping");
            continue;
        };

        if !bucket.contains(date) {
            continue;
        }

        if let Some(day_total) = daily_total(counts) {
            total = total.saturating_add(day_total);
            processed += 1;
        }
    }

    log::info!(target: LOG_TARGET, "Processed {processed} day(s) for the {bucket}");

    if processed == 0 {
        log::warn!(target: LOG_TARGET, "No data found for the {bucket}");
        return None;
    }

    log::info!(target: LOG_TARGET, "Total downloads for the {}: {total}", bucket.label);
    Some(total)
}
