//! Best-effort search-engine submission
//!
//! After a successful run the per-category index URLs can be pinged to a
//! search engine so re-crawling starts sooner. Disabled by default; failures
//! are logged and never fatal, since the sitemaps are served either way.

use crate::config::SubmissionConfig;
use crate::sitemap::{Category, PublicLinks};

/// Ping the search engine with each category index URL.
pub async fn submit_indexes(
    client: &reqwest::Client,
    config: &SubmissionConfig,
    links: &PublicLinks,
) {
    if !config.enabled {
        return;
    }

    for category in Category::ALL {
        let sitemap_url = links.category_index(category);
        let result = client
            .get(&config.ping_endpoint)
            .query(&[("sitemap", sitemap_url.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(_) => tracing::info!("submitted {}", sitemap_url),
            Err(e) => tracing::warn!("failed to submit {}: {}", sitemap_url, e),
        }
    }
}
