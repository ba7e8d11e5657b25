//! Sitemapper: incremental sitemap generation for a content discovery service
//!
//! Discovers newly created records (tracks, collections, users) from a
//! paginated discovery API and materializes them into paginated sitemap XML
//! files plus hierarchical sitemap indexes:
//! - Sequential ID probing against the discovery endpoint with bounded retries
//! - Paginated sitemap files capped at 50,000 entries each, rolling over into
//!   newly numbered files as needed
//! - Per-category sitemap indexes kept in sync with the generated files
//! - A persisted watermark of the highest record ID so each run resumes where
//!   the last one left off
//!
//! Intended to be run as a cron job against a single output directory.

pub mod config;
pub mod discovery;
pub mod pipeline;
pub mod sitemap;
pub mod submit;
pub mod watermark;

pub use config::Config;
