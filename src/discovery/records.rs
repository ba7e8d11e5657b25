//! Record shapes returned by the discovery endpoint and their public URLs
//!
//! Each record category maps deterministically to a crawlable site URL built
//! from the owning user's handle, a slug of the title or name, and the
//! numeric record ID. Slugs match the routing rules of the web client, so
//! the emitted locations are real pages.

use super::DiscoveryError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

/// Characters stripped from titles and names before slugging.
const SLUG_STRIP: &[char] = &[
    '!', '%', '#', '$', '&', '\'', '(', ')', '*', '+', ',', '/', ':', ';', '=', '?', '@', '[', ']',
];

/// Format a title or name the way the web client routes it: punctuation
/// stripped, whitespace runs collapsed to a single `-`, lowercased.
pub fn format_url_name(name: &str) -> String {
    let stripped: String = name.chars().filter(|c| !SLUG_STRIP.contains(c)).collect();

    let mut slug = String::with_capacity(stripped.len());
    let mut last_dash = false;
    for c in stripped.chars() {
        if c.is_whitespace() || c == '-' {
            if !last_dash {
                slug.push('-');
                last_dash = true;
            }
        } else {
            slug.extend(c.to_lowercase());
            last_dash = false;
        }
    }
    slug
}

fn site_path(site: &Url, path: &str) -> Result<Url, DiscoveryError> {
    site.join(path)
        .map_err(|e| DiscoveryError::MalformedRecord(format!("bad location {path:?}: {e}")))
}

/// A record category the discovery endpoint can be probed for.
pub trait DiscoveryRecord: DeserializeOwned + Send {
    /// Request path (relative to the provider endpoint) for a single ID.
    fn request_path(id: u64) -> String;

    /// Public site URL for this record.
    fn location(&self, site: &Url) -> Result<Url, DiscoveryError>;
}

/// Owning user embedded in track and collection responses.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub handle: String,
}

impl DiscoveryRecord for UserRecord {
    fn request_path(id: u64) -> String {
        format!("/users?id={}", id)
    }

    fn location(&self, site: &Url) -> Result<Url, DiscoveryError> {
        site_path(site, &self.handle)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackRecord {
    pub track_id: u64,
    pub title: String,
    pub user: UserRecord,
}

impl DiscoveryRecord for TrackRecord {
    fn request_path(id: u64) -> String {
        format!("/tracks?with_users=true&id={}", id)
    }

    fn location(&self, site: &Url) -> Result<Url, DiscoveryError> {
        let path = format!(
            "{}/{}-{}",
            self.user.handle,
            format_url_name(&self.title),
            self.track_id
        );
        site_path(site, &path)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionRecord {
    pub playlist_id: u64,
    pub playlist_name: String,
    pub is_album: bool,
    pub user: UserRecord,
}

impl DiscoveryRecord for CollectionRecord {
    fn request_path(id: u64) -> String {
        format!("/playlists?with_users=true&playlist_id={}", id)
    }

    fn location(&self, site: &Url) -> Result<Url, DiscoveryError> {
        let kind = if self.is_album { "album" } else { "playlist" };
        let path = format!(
            "{}/{}/{}-{}",
            self.user.handle,
            kind,
            format_url_name(&self.playlist_name),
            self.playlist_id
        );
        site_path(site, &path)
    }
}
