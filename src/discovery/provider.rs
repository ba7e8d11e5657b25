//! One-shot discovery endpoint resolution
//!
//! The endpoint is validated with a single health check the first time a
//! caller needs it; every later call awaits the same initialization and then
//! reuses the resolved handle. Concurrent first callers share one in-flight
//! probe instead of polling a busy flag.

use super::DiscoveryError;
use tokio::sync::OnceCell;
use url::Url;

/// Lazily validated handle to the discovery endpoint.
#[derive(Debug)]
pub struct Provider {
    endpoint: Url,
    resolved: OnceCell<Url>,
}

impl Provider {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            resolved: OnceCell::new(),
        }
    }

    /// Resolve the endpoint, health-checking it on first use.
    pub async fn endpoint(&self, client: &reqwest::Client) -> Result<&Url, DiscoveryError> {
        self.resolved
            .get_or_try_init(|| async {
                let health = self
                    .endpoint
                    .join("health_check")
                    .map_err(|e| DiscoveryError::ProviderUnavailable(e.to_string()))?;

                let response = client.get(health.as_str()).send().await?;
                if !response.status().is_success() {
                    return Err(DiscoveryError::ProviderUnavailable(format!(
                        "{} returned {}",
                        health,
                        response.status()
                    )));
                }

                tracing::info!("discovery provider ready at {}", self.endpoint);
                Ok(self.endpoint.clone())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_provider_errors() {
        // Reserved TEST-NET-1 address, nothing listens there.
        let provider = Provider::new(Url::parse("http://192.0.2.1:9/").unwrap());
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(200))
            .build()
            .unwrap();

        let result = provider.endpoint(&client).await;
        assert!(result.is_err());
    }
}
