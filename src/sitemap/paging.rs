//! Paging and append engine for numbered sitemap files
//!
//! Sitemap files hold at most [`MAX_SITEMAP_ENTRIES`] entries. New URLs are
//! appended to the current numbered file and roll over into freshly numbered
//! files once the cap is reached, keeping file numbers contiguous from 1.

use super::store::{DocumentKind, SitemapDocument};
use super::{numbered_file, MAX_SITEMAP_ENTRIES};
use std::path::Path;

/// File number that the next record should target, given how many records a
/// category has already processed.
///
/// Record index `cumulative_count + 1` lands in file
/// `ceil((cumulative_count + 1) / max_per_file)`, so the first record of a
/// fresh category targets file 1 and record 50,001 targets file 2.
pub fn file_number_for(cumulative_count: u64, max_per_file: u64) -> u64 {
    debug_assert!(max_per_file > 0);
    cumulative_count / max_per_file + 1
}

/// Append `urls` in order to the numbered files under `category_root`,
/// starting at `starting_file_number` and rolling over whenever the current
/// file is full. Every touched file is written back. Returns the highest
/// file number touched.
///
/// An empty input is a no-op: no file is read or written and
/// `starting_file_number` is returned unchanged.
pub fn append_urls(urls: &[String], starting_file_number: u64, category_root: &Path) -> u64 {
    append_with_capacity(urls, starting_file_number, category_root, MAX_SITEMAP_ENTRIES)
}

fn append_with_capacity(
    urls: &[String],
    starting_file_number: u64,
    category_root: &Path,
    capacity: usize,
) -> u64 {
    if urls.is_empty() {
        return starting_file_number;
    }

    let mut number = starting_file_number;
    let mut current_path = numbered_file(category_root, number);
    let mut current = SitemapDocument::load(&current_path, DocumentKind::UrlSet);
    let mut full: Vec<(std::path::PathBuf, SitemapDocument)> = Vec::new();

    for url in urls {
        if current.len() >= capacity {
            number += 1;
            let next_path = numbered_file(category_root, number);
            full.push((
                std::mem::replace(&mut current_path, next_path),
                std::mem::replace(&mut current, SitemapDocument::empty(DocumentKind::UrlSet)),
            ));
        }
        current.push(url.as_str());
    }
    full.push((current_path, current));

    for (path, doc) in &full {
        doc.save(path);
    }

    number
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn urls(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| format!("https://example.com/{}", n)).collect()
    }

    fn load(root: &Path, number: u64) -> SitemapDocument {
        SitemapDocument::load(&numbered_file(root, number), DocumentKind::UrlSet)
    }

    #[test]
    fn test_file_number_boundaries() {
        assert_eq!(file_number_for(0, 50_000), 1);
        assert_eq!(file_number_for(49_999, 50_000), 1);
        assert_eq!(file_number_for(50_000, 50_000), 2);
        assert_eq!(file_number_for(100_000, 50_000), 3);

        // Small capacities behave the same at the boundary.
        assert_eq!(file_number_for(1, 2), 1);
        assert_eq!(file_number_for(2, 2), 2);
    }

    #[test]
    fn test_roll_over_at_capacity() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        let last = append_with_capacity(&urls(&["a", "b", "c"]), 1, root, 2);
        assert_eq!(last, 2);

        assert_eq!(load(root, 1).entries(), &urls(&["a", "b"])[..]);
        assert_eq!(load(root, 2).entries(), &urls(&["c"])[..]);
    }

    #[test]
    fn test_no_entry_lost_across_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        let input = urls(&["a", "b", "c", "d", "e", "f", "g"]);
        let last = append_with_capacity(&input, 1, root, 3);
        assert_eq!(last, 3);

        let mut all = Vec::new();
        for n in 1..=last {
            let doc = load(root, n);
            assert!(doc.len() <= 3);
            all.extend(doc.entries().to_vec());
        }
        assert_eq!(all, input);
    }

    #[test]
    fn test_appends_to_partially_filled_file() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        append_with_capacity(&urls(&["a"]), 1, root, 3);
        let last = append_with_capacity(&urls(&["b", "c", "d"]), 1, root, 3);
        assert_eq!(last, 2);

        assert_eq!(load(root, 1).entries(), &urls(&["a", "b", "c"])[..]);
        assert_eq!(load(root, 2).entries(), &urls(&["d"])[..]);
    }

    #[test]
    fn test_starting_file_already_full() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        append_with_capacity(&urls(&["a", "b"]), 1, root, 2);
        let last = append_with_capacity(&urls(&["c"]), 1, root, 2);
        assert_eq!(last, 2);

        assert_eq!(load(root, 1).entries(), &urls(&["a", "b"])[..]);
        assert_eq!(load(root, 2).entries(), &urls(&["c"])[..]);
    }

    #[test]
    fn test_empty_input_is_noop() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        let last = append_with_capacity(&[], 4, root, 2);
        assert_eq!(last, 4);
        assert!(std::fs::read_dir(root).unwrap().next().is_none());
    }

    #[test]
    fn test_starting_beyond_file_one() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        let last = append_with_capacity(&urls(&["x", "y", "z"]), 5, root, 2);
        assert_eq!(last, 6);
        assert_eq!(load(root, 5).entries(), &urls(&["x", "y"])[..]);
        assert_eq!(load(root, 6).entries(), &urls(&["z"])[..]);
    }
}
