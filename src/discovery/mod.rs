//! Record discovery subsystem
//!
//! Probes the discovery endpoint for records created since the last run by
//! walking record IDs sequentially from the watermark. Key components:
//! - `DiscoveryRecord`: per-category record shape and public URL derivation
//! - `Provider`: one-shot async resolution of the discovery endpoint
//! - `DiscoveryClient`: bounded-retry incremental fetch loop

pub mod client;
pub mod provider;
pub mod records;

pub use client::{DiscoveryClient, FetchConfig, FetchOutcome};
pub use provider::Provider;
pub use records::{CollectionRecord, DiscoveryRecord, TrackRecord, UserRecord};

use thiserror::Error;

/// Errors that can occur while talking to the discovery endpoint.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("discovery provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("record not found")]
    NotFound,

    #[error("malformed record: {0}")]
    MalformedRecord(String),
}
