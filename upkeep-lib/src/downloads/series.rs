use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub(super) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Daily per-version download counts keyed by ISO 8601 date (`YYYY-MM-DD`).
///
/// Keys and values are kept as received so that a single malformed entry never prevents
/// the rest of the series from being used.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct DownloadSeries {
    days: BTreeMap<String, Value>,
}

impl DownloadSeries {
    /// Iterate over `(date key, per-version counts)` pairs in key order.
    pub fn days(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.days.iter().map(|(date, counts)| (date.as_str(), counts))
    }

    /// The latest key that parses as a date. Malformed keys are never picked.
    #[must_use]
    pub fn most_recent_date(&self) -> Option<&str> {
        self.most_recent_day().map(|(date, _)| date)
    }

    /// Total downloads recorded under [`Self::most_recent_date`].
    #[must_use]
    pub fn most_recent_total(&self) -> Option<u64> {
        self.most_recent_day().and_then(|(_, counts)| daily_total(counts))
    }

    fn most_recent_day(&self) -> Option<(&str, &Value)> {
        self.days
            .iter()
            .rev()
            .find(|(date, _)| NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok())
            .map(|(date, counts)| (date.as_str(), counts))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for DownloadSeries {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            days: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Sum of the numeric per-version counts for one day.
///
/// Returns `None` when the day's entry is not an object. Non-numeric and negative values
/// inside the object are ignored, fractional values are truncated and the sum saturates.
#[must_use]
pub fn daily_total(counts: &Value) -> Option<u64> {
    let versions = counts.as_object()?;
    Some(versions.values().filter_map(count_value).fold(0, u64::saturating_add))
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "fractional counts are truncated, negatives are filtered out")]
pub(super) fn count_value(value: &Value) -> Option<u64> {
    let Value::Number(number) = value else {
        return None;
    };

    number
        .as_u64()
        .or_else(|| number.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
}
