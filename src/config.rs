//! Configuration for sitemapper

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

fn default_sitemap_prefix() -> String {
    "sitemaps".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./sitemaps")
}

fn default_max_iterations() -> u64 {
    500
}

fn default_max_consecutive_failures() -> u64 {
    10
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    "sitemapper/0.1".to_string()
}

fn default_ping_endpoint() -> String {
    "https://www.google.com/ping".to_string()
}

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Public site the sitemaps describe
    pub site: SiteConfig,
    /// Discovery endpoint and fetch limits
    pub discovery: DiscoveryConfig,
    /// Sitemap output settings
    #[serde(default)]
    pub sitemap: SitemapConfig,
    /// Search-engine submission settings
    #[serde(default)]
    pub submission: SubmissionConfig,
}

/// Public-facing site settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the site (e.g. "https://example.com")
    pub base_url: String,
    /// Path prefix the sitemap tree is served under
    #[serde(default = "default_sitemap_prefix")]
    pub sitemap_prefix: String,
    /// Static routes emitted into the defaults sitemap
    #[serde(default)]
    pub default_routes: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://example.com".to_string(),
            sitemap_prefix: default_sitemap_prefix(),
            default_routes: vec!["/".to_string(), "/trending".to_string()],
        }
    }
}

/// Discovery endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Discovery provider endpoint URL
    pub endpoint: String,
    /// Maximum ID probes per category per run
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,
    /// Consecutive misses before a category's fetch gives up early
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u64,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// User agent for discovery requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://discovery.example.com".to_string(),
            max_iterations: default_max_iterations(),
            max_consecutive_failures: default_max_consecutive_failures(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Sitemap output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapConfig {
    /// Directory the sitemap tree is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// Search-engine submission settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Ping the search engine with the category indexes after a run
    #[serde(default)]
    pub enabled: bool,
    /// Ping endpoint; the sitemap URL is passed as a query parameter
    #[serde(default = "default_ping_endpoint")]
    pub ping_endpoint: String,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ping_endpoint: default_ping_endpoint(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, validating all fields.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the user
    /// can fix everything in one pass.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if let Err(e) = Url::parse(&self.site.base_url) {
            errors.push(format!("site.base_url is not a valid URL: {}", e));
        }
        if self.site.sitemap_prefix.trim_matches('/').is_empty() {
            errors.push("site.sitemap_prefix must not be empty".to_string());
        }

        if let Err(e) = Url::parse(&self.discovery.endpoint) {
            errors.push(format!("discovery.endpoint is not a valid URL: {}", e));
        }
        if self.discovery.max_iterations == 0 {
            errors.push("discovery.max_iterations must be positive".to_string());
        }
        if self.discovery.max_consecutive_failures == 0 {
            errors.push("discovery.max_consecutive_failures must be positive".to_string());
        }
        if self.discovery.timeout_secs == 0 {
            errors.push("discovery.timeout_secs must be positive".to_string());
        }

        if self.submission.enabled {
            if let Err(e) = Url::parse(&self.submission.ping_endpoint) {
                errors.push(format!("submission.ping_endpoint is not a valid URL: {}", e));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("Invalid configuration:\n  - {}", errors.join("\n  - "))
        }
    }

    /// Parsed site base URL. Only valid after `validate()`.
    pub fn site_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.site.base_url)?)
    }

    /// Parsed discovery endpoint URL. Only valid after `validate()`.
    pub fn discovery_endpoint(&self) -> Result<Url> {
        Ok(Url::parse(&self.discovery.endpoint)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = Config::default();
        config.site.base_url = "not a url".to_string();
        config.discovery.max_iterations = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("site.base_url"));
        assert!(err.contains("max_iterations"));
    }

    #[test]
    fn test_minimal_toml_fills_defaults() {
        let toml = r#"
            [site]
            base_url = "https://music.example.com"

            [discovery]
            endpoint = "https://discovery.music.example.com"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.site.sitemap_prefix, "sitemaps");
        assert_eq!(config.discovery.max_consecutive_failures, 10);
        assert!(!config.submission.enabled);
        assert_eq!(config.sitemap.output_dir, PathBuf::from("./sitemaps"));
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let reparsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(reparsed.site.base_url, config.site.base_url);
        assert_eq!(reparsed.discovery.endpoint, config.discovery.endpoint);
    }
}
