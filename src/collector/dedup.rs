//! Cross-run deduplication of article links.

use crate::store::LinkStore;
use sha2::{Digest, Sha256};
use std::error::Error;
use tracing::debug;

/// Stable key for a link: SHA-256 hex of the trimmed, lowercased URL.
pub fn link_key(link: &str) -> String {
    let normalized = link.trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Answers "has this link been processed before?" against a [`LinkStore`].
#[derive(Debug)]
pub struct DedupFilter<S> {
    store: S,
}

impl<S: LinkStore> DedupFilter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn is_new(&self, link: &str) -> bool {
        !self.store.contains(&link_key(link))
    }

    /// Record `link` as processed. Call only after the record is safely written.
    pub async fn mark_seen(&mut self, link: &str) -> Result<(), Box<dyn Error>> {
        let key = link_key(link);
        debug!(%link, %key, "Marking link as seen");
        self.store.insert(key).await
    }

    pub fn known_links(&self) -> usize {
        self.store.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLinkStore;

    #[test]
    fn test_link_key_is_fixed_length_hex() {
        let key = link_key("https://example.com/a");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_link_key_ignores_case_and_surrounding_whitespace() {
        assert_eq!(
            link_key("  https://Example.com/Article \n"),
            link_key("https://example.com/article")
        );
        assert_ne!(link_key("https://example.com/a"), link_key("https://example.com/b"));
    }

    #[tokio::test]
    async fn test_mark_seen_excludes_link() {
        let mut filter = DedupFilter::new(MemoryLinkStore::default());
        assert!(filter.is_new("https://example.com/a"));

        filter.mark_seen("https://example.com/a").await.unwrap();
        assert!(!filter.is_new("https://example.com/a"));
        assert!(!filter.is_new("HTTPS://EXAMPLE.COM/A"));
        assert!(filter.is_new("https://example.com/b"));
    }

    #[tokio::test]
    async fn test_mark_seen_is_idempotent() {
        let mut filter = DedupFilter::new(MemoryLinkStore::default());
        filter.mark_seen("https://example.com/a").await.unwrap();
        filter.mark_seen("https://example.com/a").await.unwrap();
        assert_eq!(filter.known_links(), 1);
    }
}
