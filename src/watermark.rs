//! Persisted per-category watermarks
//!
//! A watermark is the highest record ID a category has processed across all
//! runs. The three watermarks are stored together in a small YAML file
//! (`latest.yml`) read at the start of a run and overwritten at the end. A
//! missing or unparseable file means "start from zero" for all categories:
//! a full re-scan is safe (URL derivation is idempotent), just expensive.

use crate::sitemap::Category;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Highest record ID processed per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermarks {
    pub track: u64,
    pub collection: u64,
    pub user: u64,
}

/// On-disk shape: `latest: {track, collection, user}`.
#[derive(Debug, Serialize, Deserialize)]
struct WatermarkFile {
    latest: Watermarks,
}

impl Watermarks {
    /// Read watermarks from `path`, falling back to all zeros when the file
    /// is missing or does not parse.
    pub fn load(path: &Path) -> Self {
        let parsed = std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|s| serde_yaml::from_str::<WatermarkFile>(&s).map_err(Into::into));

        match parsed {
            Ok(file) => file.latest,
            Err(e) => {
                tracing::info!(
                    "no usable watermark file at {} ({e:#}), starting from zero",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Overwrite `path` with the current watermarks.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(&WatermarkFile { latest: *self })?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Tracks => self.track,
            Category::Collections => self.collection,
            Category::Users => self.user,
        }
    }

    pub fn set(&mut self, category: Category, value: u64) {
        match category {
            Category::Tracks => self.track = value,
            Category::Collections => self.collection = value,
            Category::Users => self.user = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latest.yml");

        let marks = Watermarks {
            track: 120_500,
            collection: 3_200,
            user: 48_000,
        };
        marks.save(&path).unwrap();

        assert_eq!(Watermarks::load(&path), marks);
    }

    #[test]
    fn test_missing_file_is_zero() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latest.yml");

        assert_eq!(Watermarks::load(&path), Watermarks::default());
    }

    #[test]
    fn test_corrupt_file_is_zero() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latest.yml");
        std::fs::write(&path, "latest: [not, a, map]").unwrap();

        assert_eq!(Watermarks::load(&path), Watermarks::default());
    }

    #[test]
    fn test_category_accessors() {
        let mut marks = Watermarks::default();
        marks.set(Category::Collections, 7);
        assert_eq!(marks.get(Category::Collections), 7);
        assert_eq!(marks.get(Category::Tracks), 0);
    }
}
