//! Download statistics API client
//!
//! Minimal client for the pepy.tech v2 project endpoint.

use super::LOG_TARGET;
use super::series::{DownloadSeries, count_value};
use crate::Result;
use core::time::Duration;
use ohno::bail;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const API_KEY_HEADER: &str = "x-api-key";

/// The subset of the project statistics response we consume.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsResponse {
    /// Non-numeric or negative values are dropped rather than failing the whole response
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_downloads: Option<u64>,

    #[serde(default)]
    pub downloads: Option<DownloadSeries>,
}

/// Authenticated client for one statistics endpoint.
#[derive(Debug, Clone)]
pub struct StatsClient {
    client: reqwest::Client,
    api_url: String,
}

impl StatsClient {
    /// Create a client for `api_url` authenticated with `api_key`.
    ///
    /// A missing or blank key is a configuration error: no client is built and no request is made.
    pub fn new(api_key: Option<&str>, api_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) else {
            bail!("an API key is required to fetch download statistics (set PEPY_TECH_API_KEY or pass --api-key)");
        };

        let mut key_val = HeaderValue::from_str(key)?;
        key_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(API_KEY_HEADER, key_val);
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent("upkeep")
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Fetch the project statistics.
    ///
    /// Network failures, non-success statuses and malformed bodies are logged and reported as `None`.
    pub async fn fetch(&self) -> Option<StatsResponse> {
        log::info!(target: LOG_TARGET, "Fetching download data from {}", self.api_url);

        let resp = match self.client.get(&self.api_url).send().await {
            Ok(r) => r,
            Err(e) => {
                log::error!(target: LOG_TARGET, "Failed to fetch data from API: {e}");
                return None;
            }
        };

        let resp = match resp.error_for_status() {
            Ok(r) => r,
            Err(e) => {
                log::error!(target: LOG_TARGET, "Download statistics request was rejected: {e}");
                return None;
            }
        };

        match resp.json::<StatsResponse>().await {
            Ok(data) => {
                log::info!(target: LOG_TARGET, "Successfully fetched download data");
                Some(data)
            }
            Err(e) => {
                log::error!(target: LOG_TARGET, "Failed to parse download statistics response: {e}");
                None
            }
        }
    }
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(30);

    #[test]
    fn test_new_requires_api_key() {
        let result = StatsClient::new(None, "https://api.example.com", TIMEOUT);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key"));
    }

    #[test]
    fn test_new_rejects_blank_api_key() {
        assert!(StatsClient::new(Some("   "), "https://api.example.com", TIMEOUT).is_err());
    }

    #[test]
    fn test_new_with_api_key() {
        let client = StatsClient::new(Some("secret"), "https://api.example.com/v2/projects/demo", TIMEOUT).unwrap();
        assert_eq!(client.api_url(), "https://api.example.com/v2/projects/demo");
    }

    #[test]
    fn test_response_deserialize_full() {
        let json = r#"{
            "id": "demo",
            "total_downloads": 1234,
            "versions": ["1.0"],
            "downloads": {"2024-01-01": {"1.0": 5}}
        }"#;

        let resp: StatsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.total_downloads, Some(1234));
        assert_eq!(resp.downloads.unwrap().most_recent_total(), Some(5));
    }

    #[test]
    fn test_response_deserialize_optional_fields() {
        let resp: StatsResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.total_downloads.is_none());
        assert!(resp.downloads.is_none());
    }

    #[test]
    fn test_response_drops_unusable_total_downloads() {
        let resp: StatsResponse = serde_json::from_str(r#"{"total_downloads": -3, "downloads": {"2024-01-01": {"1.0": 5}}}"#).unwrap();
        assert_eq!(resp.total_downloads, None);
        assert_eq!(resp.downloads.unwrap().most_recent_total(), Some(5));

        let resp: StatsResponse = serde_json::from_str(r#"{"total_downloads": "lots"}"#).unwrap();
        assert_eq!(resp.total_downloads, None);

        let resp: StatsResponse = serde_json::from_str(r#"{"total_downloads": 1234.7}"#).unwrap();
        assert_eq!(resp.total_downloads, Some(1234));
    }

    #[test]
    fn test_response_rejects_non_object_downloads() {
        let result = serde_json::from_str::<StatsResponse>(r#"{"downloads": "not_a_dict"}"#);
        assert!(result.is_err());
    }
}
