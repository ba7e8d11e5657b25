//! Bounded-retry incremental record fetching
//!
//! Record IDs are assigned sequentially by the discovery service, so new
//! records since the last run are found by probing `watermark + 1`,
//! `watermark + 2`, and so on. The loop stops after a configured number of
//! probes or after too many consecutive misses, whichever comes first.
//! Individual misses are expected (deleted or not-yet-visible records) and
//! never abort the run.

use super::provider::Provider;
use super::records::DiscoveryRecord;
use super::DiscoveryError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Configuration for the discovery fetch loop.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string
    pub user_agent: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Maximum ID probes per category per run
    pub max_iterations: u64,
    /// Consecutive misses before giving up early
    pub max_consecutive_failures: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "sitemapper/0.1".to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_iterations: 500,
            max_consecutive_failures: 10,
        }
    }
}

/// Result of one category's fetch phase.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Public site URLs for the fetched records, in ID order.
    pub urls: Vec<String>,
    /// New watermark: the highest ID probed, hit or miss.
    pub latest: u64,
}

/// Envelope the discovery endpoint wraps single-record responses in.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the discovery endpoint.
pub struct DiscoveryClient {
    client: reqwest::Client,
    provider: Provider,
    site: Url,
    config: FetchConfig,
}

impl DiscoveryClient {
    pub fn new(endpoint: Url, site: Url, config: FetchConfig) -> Result<Self, DiscoveryError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            provider: Provider::new(endpoint),
            site,
            config,
        })
    }

    /// Probe for records with IDs above `watermark`, returning their public
    /// URLs in order plus the new watermark.
    ///
    /// Every probe advances the watermark, so a permanently missing ID is
    /// skipped for good rather than re-probed forever. A miss streak of
    /// `max_consecutive_failures` means we have run past the newest record.
    pub async fn fetch_new<R: DiscoveryRecord>(
        &self,
        watermark: u64,
    ) -> Result<FetchOutcome, DiscoveryError> {
        let endpoint = self.provider.endpoint(&self.client).await?;
        let base = endpoint.as_str().trim_end_matches('/');

        let mut urls = Vec::new();
        let mut consecutive_failures = 0;
        let mut iterations = 0;

        while consecutive_failures < self.config.max_consecutive_failures
            && iterations < self.config.max_iterations
        {
            let id = watermark + iterations + 1;
            let request_url = format!("{}{}", base, R::request_path(id));

            match self.fetch_one::<R>(&request_url).await {
                Ok(record) => match record.location(&self.site) {
                    Ok(loc) => {
                        tracing::debug!("fetched {}", request_url);
                        urls.push(loc.into());
                        consecutive_failures = 0;
                    }
                    Err(e) => {
                        tracing::warn!("record {} has no usable location: {e}", id);
                        consecutive_failures += 1;
                    }
                },
                Err(e) => {
                    tracing::debug!("miss at {}: {e}", request_url);
                    consecutive_failures += 1;
                }
            }

            iterations += 1;
        }

        Ok(FetchOutcome {
            urls,
            latest: watermark + iterations,
        })
    }

    async fn fetch_one<R: DeserializeOwned>(&self, url: &str) -> Result<R, DiscoveryError> {
        let response = self.client.get(url).send().await?;
        let envelope: Envelope<R> = response.error_for_status()?.json().await?;

        if let Some(error) = envelope.error {
            return Err(DiscoveryError::MalformedRecord(error));
        }
        envelope.data.into_iter().next().ok_or(DiscoveryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::records::TrackRecord;

    #[test]
    fn test_envelope_missing_fields() {
        let empty: Envelope<TrackRecord> = serde_json::from_str("{}").unwrap();
        assert!(empty.data.is_empty());
        assert!(empty.error.is_none());

        let err: Envelope<TrackRecord> =
            serde_json::from_str(r#"{"error": "not found"}"#).unwrap();
        assert_eq!(err.error.as_deref(), Some("not found"));
    }

    #[test]
    fn test_envelope_with_record() {
        let json = r#"{
            "data": [
                {"track_id": 42, "title": "A Song", "user": {"handle": "artist"}}
            ]
        }"#;
        let envelope: Envelope<TrackRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].track_id, 42);
    }

    #[test]
    fn test_fetch_config_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.max_consecutive_failures, 10);
        assert!(config.max_iterations > 0);
    }
}
