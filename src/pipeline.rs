//! Run orchestration
//!
//! One pass of the generator:
//! 1. Bootstrap the output directory tree, root index, and defaults sitemap.
//! 2. Read the watermarks to find where each category left off.
//! 3. Fetch new records for the three categories concurrently (their file
//!    trees are disjoint).
//! 4. Per category, strictly in order: append the new URLs to the numbered
//!    sitemap files, then bring the category index up to date.
//! 5. Persist the new watermarks, only after every category completed its
//!    append and index sync.
//! 6. Optionally ping the search engine with the category indexes.
//!
//! Sitemap and index writes are best-effort; a crash mid-run leaves
//! partially written files that the next run re-parses and resumes from.

use crate::config::Config;
use crate::discovery::{
    CollectionRecord, DiscoveryClient, FetchConfig, FetchOutcome, TrackRecord, UserRecord,
};
use crate::sitemap::{
    append_urls, ensure_root_index, file_number_for, sync_category_index, write_defaults_sitemap,
    Category, OutputLayout, PublicLinks, MAX_SITEMAP_ENTRIES,
};
use crate::submit;
use crate::watermark::Watermarks;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

/// What one run accomplished, per category.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub tracks_added: usize,
    pub collections_added: usize,
    pub users_added: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.tracks_added + self.collections_added + self.users_added
    }
}

/// Execute one full discovery-and-append pass.
///
/// `count` caps the number of ID probes per category for this run,
/// overriding the configured maximum.
pub async fn run_once(config: &Config, count: Option<u64>) -> Result<RunSummary> {
    let site_url = config.site_url()?;
    let layout = OutputLayout::new(&config.sitemap.output_dir);
    let links = PublicLinks::new(&site_url, &config.site.sitemap_prefix);

    layout
        .create_dirs()
        .with_context(|| format!("creating output tree under {}", config.sitemap.output_dir.display()))?;

    ensure_root_index(&layout.root_index(), &links);
    if !layout.defaults_file().exists() {
        write_defaults_sitemap(&layout.defaults_file(), &site_url, &config.site.default_routes);
    }

    let watermarks = Watermarks::load(&layout.watermark_file());
    info!(
        "watermarks: tracks={} collections={} users={}",
        watermarks.track, watermarks.collection, watermarks.user
    );

    let fetch_config = FetchConfig {
        user_agent: config.discovery.user_agent.clone(),
        timeout: Duration::from_secs(config.discovery.timeout_secs),
        connect_timeout: Duration::from_secs(config.discovery.connect_timeout_secs),
        max_iterations: count.unwrap_or(config.discovery.max_iterations),
        max_consecutive_failures: config.discovery.max_consecutive_failures,
    };
    let client = DiscoveryClient::new(config.discovery_endpoint()?, site_url, fetch_config)?;

    let (tracks, collections, users) = tokio::join!(
        client.fetch_new::<TrackRecord>(watermarks.track),
        client.fetch_new::<CollectionRecord>(watermarks.collection),
        client.fetch_new::<UserRecord>(watermarks.user),
    );
    let tracks = tracks.context("fetching tracks")?;
    let collections = collections.context("fetching collections")?;
    let users = users.context("fetching users")?;

    info!(
        "fetched {} new tracks, {} new collections, {} new users",
        tracks.urls.len(),
        collections.urls.len(),
        users.urls.len()
    );

    let summary = RunSummary {
        tracks_added: tracks.urls.len(),
        collections_added: collections.urls.len(),
        users_added: users.urls.len(),
    };

    apply_category(&layout, &links, Category::Tracks, watermarks.track, &tracks);
    apply_category(
        &layout,
        &links,
        Category::Collections,
        watermarks.collection,
        &collections,
    );
    apply_category(&layout, &links, Category::Users, watermarks.user, &users);

    let new_watermarks = Watermarks {
        track: tracks.latest,
        collection: collections.latest,
        user: users.latest,
    };
    new_watermarks
        .save(&layout.watermark_file())
        .context("persisting watermarks")?;
    info!(
        "updated watermarks: tracks={} collections={} users={}",
        new_watermarks.track, new_watermarks.collection, new_watermarks.user
    );

    let submit_client = reqwest::Client::new();
    submit::submit_indexes(&submit_client, &config.submission, &links).await;

    Ok(summary)
}

/// Append one category's new URLs and sync its index, strictly in that
/// order: the index sync needs the file-number range the append produced.
fn apply_category(
    layout: &OutputLayout,
    links: &PublicLinks,
    category: Category,
    old_watermark: u64,
    outcome: &FetchOutcome,
) {
    let starting = file_number_for(old_watermark, MAX_SITEMAP_ENTRIES as u64);
    let newest = append_urls(&outcome.urls, starting, &layout.category_root(category));
    sync_category_index(&layout.category_index(category), links, category, starting, newest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sitemap::{DocumentKind, SitemapDocument};
    use tempfile::TempDir;
    use url::Url;

    fn outcome(urls: &[&str], latest: u64) -> FetchOutcome {
        FetchOutcome {
            urls: urls.iter().map(|u| u.to_string()).collect(),
            latest,
        }
    }

    #[test]
    fn test_apply_category_writes_files_and_index() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        layout.create_dirs().unwrap();
        let links = PublicLinks::new(&Url::parse("https://example.com").unwrap(), "sitemaps");

        apply_category(
            &layout,
            &links,
            Category::Users,
            0,
            &outcome(&["https://example.com/a", "https://example.com/b"], 2),
        );

        let map = SitemapDocument::load(
            &layout.category_root(Category::Users).join("1.xml"),
            DocumentKind::UrlSet,
        );
        assert_eq!(map.len(), 2);

        let index = SitemapDocument::load(
            &layout.category_index(Category::Users),
            DocumentKind::SitemapIndex,
        );
        assert_eq!(
            index.entries(),
            &["https://example.com/sitemaps/users/1.xml".to_string()]
        );
    }

    #[test]
    fn test_apply_category_resumes_mid_file() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        layout.create_dirs().unwrap();
        let links = PublicLinks::new(&Url::parse("https://example.com").unwrap(), "sitemaps");

        apply_category(
            &layout,
            &links,
            Category::Tracks,
            0,
            &outcome(&["https://example.com/t/1"], 1),
        );
        // Second run resumes at watermark 1, still targeting file 1.
        apply_category(
            &layout,
            &links,
            Category::Tracks,
            1,
            &outcome(&["https://example.com/t/2"], 2),
        );

        let map = SitemapDocument::load(
            &layout.category_root(Category::Tracks).join("1.xml"),
            DocumentKind::UrlSet,
        );
        assert_eq!(
            map.entries(),
            &[
                "https://example.com/t/1".to_string(),
                "https://example.com/t/2".to_string(),
            ]
        );

        let index = SitemapDocument::load(
            &layout.category_index(Category::Tracks),
            DocumentKind::SitemapIndex,
        );
        assert_eq!(index.len(), 1);
    }
}
