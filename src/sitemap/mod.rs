//! Sitemap generation subsystem
//!
//! Key components:
//! - `SitemapDocument`: typed ordered-list model with XML load/save
//! - `append_urls`: paging/append engine with roll-over at the entry cap
//! - `sync_category_index` / `ensure_root_index`: index maintenance
//! - `OutputLayout` / `PublicLinks`: on-disk paths and their public URLs

pub mod index;
pub mod paging;
pub mod store;

pub use index::{ensure_root_index, sync_category_index, write_defaults_sitemap};
pub use paging::{append_urls, file_number_for};
pub use store::{DocumentKind, SitemapDocument};

use std::path::{Path, PathBuf};
use url::Url;

/// Maximum entries a single sitemap file may hold, per the sitemap protocol.
pub const MAX_SITEMAP_ENTRIES: usize = 50_000;

/// Record categories, each owning its own numbered files and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Tracks,
    Collections,
    Users,
}

impl Category {
    /// All categories in root-index order.
    pub const ALL: [Category; 3] = [Category::Tracks, Category::Collections, Category::Users];

    /// Directory name under the output root.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tracks => "tracks",
            Category::Collections => "collections",
            Category::Users => "users",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path of a numbered sitemap file under a category root.
pub fn numbered_file(category_root: &Path, number: u64) -> PathBuf {
    category_root.join(format!("{}.xml", number))
}

/// On-disk layout of the generated sitemap tree.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the output root and the three category directories.
    pub fn create_dirs(&self) -> std::io::Result<()> {
        for category in Category::ALL {
            std::fs::create_dir_all(self.category_root(category))?;
        }
        Ok(())
    }

    pub fn category_root(&self, category: Category) -> PathBuf {
        self.root.join(category.as_str())
    }

    pub fn category_index(&self, category: Category) -> PathBuf {
        self.category_root(category).join("index.xml")
    }

    pub fn root_index(&self) -> PathBuf {
        self.root.join("index.xml")
    }

    pub fn defaults_file(&self) -> PathBuf {
        self.root.join("defaults.xml")
    }

    pub fn watermark_file(&self) -> PathBuf {
        self.root.join("latest.yml")
    }
}

/// Builds the absolute public URLs that mirror `OutputLayout` on the site.
#[derive(Debug, Clone)]
pub struct PublicLinks {
    /// `{site_url}/{prefix}` with no trailing slash.
    base: String,
}

impl PublicLinks {
    pub fn new(site_url: &Url, prefix: &str) -> Self {
        let site = site_url.as_str().trim_end_matches('/');
        let prefix = prefix.trim_matches('/');
        Self {
            base: format!("{}/{}", site, prefix),
        }
    }

    /// Public URL of a numbered sitemap file.
    pub fn sitemap_file(&self, category: Category, number: u64) -> String {
        format!("{}/{}/{}.xml", self.base, category.as_str(), number)
    }

    /// Public URL of a per-category index.
    pub fn category_index(&self, category: Category) -> String {
        format!("{}/{}/index.xml", self.base, category.as_str())
    }

    /// Public URL of the defaults (static routes) sitemap.
    pub fn defaults(&self) -> String {
        format!("{}/defaults.xml", self.base)
    }

    /// Public URL of the root index.
    pub fn root_index(&self) -> String {
        format!("{}/index.xml", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_links() {
        let site = Url::parse("https://example.com/").unwrap();
        let links = PublicLinks::new(&site, "sitemaps");

        assert_eq!(
            links.sitemap_file(Category::Tracks, 3),
            "https://example.com/sitemaps/tracks/3.xml"
        );
        assert_eq!(
            links.category_index(Category::Users),
            "https://example.com/sitemaps/users/index.xml"
        );
        assert_eq!(links.defaults(), "https://example.com/sitemaps/defaults.xml");
        assert_eq!(links.root_index(), "https://example.com/sitemaps/index.xml");
    }

    #[test]
    fn test_layout_paths() {
        let layout = OutputLayout::new("/tmp/sitemaps");
        assert_eq!(
            layout.category_index(Category::Collections),
            PathBuf::from("/tmp/sitemaps/collections/index.xml")
        );
        assert_eq!(
            numbered_file(&layout.category_root(Category::Tracks), 7),
            PathBuf::from("/tmp/sitemaps/tracks/7.xml")
        );
    }
}
