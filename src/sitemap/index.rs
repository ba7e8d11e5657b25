//! Sitemap index maintenance
//!
//! Each category keeps an `index.xml` listing its numbered sitemap files in
//! ascending order; a root index aggregates the three category indexes plus
//! the defaults sitemap. Index writes go through the same best-effort store
//! as sitemap files.

use super::store::{DocumentKind, SitemapDocument};
use super::{Category, PublicLinks};
use std::path::Path;
use url::Url;

/// Bring the category index at `index_path` up to date after an append run
/// advanced the highest file number from `previous` to `new`.
///
/// An empty (or missing) index is seeded with `previous`'s file first. Each
/// number in `(previous, new]` is then appended, skipping locs the index
/// already lists, so re-running after a failed watermark write cannot
/// double-index a file.
pub fn sync_category_index(
    index_path: &Path,
    links: &PublicLinks,
    category: Category,
    previous: u64,
    new: u64,
) {
    let mut index = SitemapDocument::load(index_path, DocumentKind::SitemapIndex);

    if index.is_empty() {
        index.push(links.sitemap_file(category, previous));
    }

    for number in previous + 1..=new {
        let loc = links.sitemap_file(category, number);
        if !index.contains(&loc) {
            index.push(loc);
        }
    }

    index.save(index_path);
}

/// One-time bootstrap of the root index at `path`.
///
/// If the file is missing or unparseable it is created with exactly four
/// entries, in order: defaults, tracks, collections, users. An existing
/// parseable index is left untouched.
pub fn ensure_root_index(path: &Path, links: &PublicLinks) {
    let existing = SitemapDocument::load(path, DocumentKind::SitemapIndex);
    if !existing.is_empty() {
        return;
    }

    let mut index = SitemapDocument::empty(DocumentKind::SitemapIndex);
    index.push(links.defaults());
    for category in Category::ALL {
        index.push(links.category_index(category));
    }
    index.save(path);

    tracing::info!("created root sitemap index at {}", path.display());
}

/// Write the defaults sitemap: static site routes (e.g. `/`, `/trending`)
/// joined onto the site base URL. Overwrites any existing file.
pub fn write_defaults_sitemap(path: &Path, site_url: &Url, routes: &[String]) {
    let mut map = SitemapDocument::empty(DocumentKind::UrlSet);
    for route in routes {
        match site_url.join(route.trim_start_matches('/')) {
            Ok(loc) => map.push(loc.as_str()),
            Err(e) => tracing::warn!("skipping default route {route:?}: {e}"),
        }
    }
    map.save(path);
}
