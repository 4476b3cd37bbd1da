//! Persistent store of processed-link hashes.
//!
//! Each namespace (one per actor vertical, e.g. `processed-urls-cybersecurity`)
//! is a single JSON object on disk mapping a link hash to the RFC 3339 time it
//! was first marked seen:
//!
//! ```text
//! state_dir/
//! └── processed-urls-cybersecurity.json   {"3f1c…": "2025-05-06T08:00:00Z", …}
//! ```
//!
//! The store is pruned on open and on every insert according to an
//! [`EvictionPolicy`]. There is no locking: one run per namespace at a time.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// A set of opaque keys that survives across runs.
pub trait LinkStore {
    fn contains(&self, key: &str) -> bool;

    /// Add `key`. Inserting a key that is already present is a no-op.
    async fn insert(&mut self, key: String) -> Result<(), Box<dyn Error>>;

    fn len(&self) -> usize;
}

/// Bounds on how much history the store keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionPolicy {
    /// Keys older than this are dropped. `None` keeps keys forever.
    pub ttl: Option<Duration>,
    /// Upper bound on the number of keys; the oldest go first. `None` is unbounded.
    pub max_entries: Option<usize>,
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self {
            ttl: Some(Duration::days(30)),
            max_entries: Some(10_000),
        }
    }
}

impl EvictionPolicy {
    /// Apply the policy to `entries` as of `now`. Returns how many keys were removed.
    ///
    /// `keep` is never chosen for size eviction; it is the key just inserted.
    fn prune(
        &self,
        entries: &mut BTreeMap<String, String>,
        now: DateTime<Utc>,
        keep: Option<&str>,
    ) -> usize {
        let before = entries.len();

        if let Some(ttl) = self.ttl {
            let cutoff = now - ttl;
            entries.retain(|_, seen_at| match parse_timestamp(seen_at) {
                Some(ts) => ts >= cutoff,
                None => true,
            });
        }

        if let Some(max) = self.max_entries {
            if entries.len() > max {
                let mut by_age: Vec<(DateTime<Utc>, String)> = entries
                    .iter()
                    .filter(|(k, _)| Some(k.as_str()) != keep)
                    .map(|(k, v)| (parse_timestamp(v).unwrap_or(now), k.clone()))
                    .collect();
                by_age.sort();
                let overflow = entries.len() - max;
                for (_, key) in by_age.into_iter().take(overflow) {
                    entries.remove(&key);
                }
            }
        }

        before - entries.len()
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// A [`LinkStore`] backed by one JSON file, written through on every insert.
#[derive(Debug)]
pub struct FileLinkStore {
    path: PathBuf,
    policy: EvictionPolicy,
    entries: BTreeMap<String, String>,
}

impl FileLinkStore {
    /// Open (or create) the namespace under `dir`, pruning expired keys.
    pub async fn open(
        dir: &Path,
        namespace: &str,
        policy: EvictionPolicy,
    ) -> Result<Self, Box<dyn Error>> {
        Self::open_at(dir, namespace, policy, Utc::now()).await
    }

    #[instrument(level = "info", skip(dir, policy, now), fields(dir = %dir.display()))]
    pub async fn open_at(
        dir: &Path,
        namespace: &str,
        policy: EvictionPolicy,
        now: DateTime<Utc>,
    ) -> Result<Self, Box<dyn Error>> {
        fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{namespace}.json"));

        let mut entries = match fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Link store is unreadable; starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        let pruned = policy.prune(&mut entries, now, None);
        info!(path = %path.display(), keys = entries.len(), pruned, "Opened link store");

        Ok(Self {
            path,
            policy,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) -> Result<(), Box<dyn Error>> {
        let json = serde_json::to_string(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), keys = self.entries.len(), "Persisted link store");
        Ok(())
    }
}

impl LinkStore for FileLinkStore {
    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    async fn insert(&mut self, key: String) -> Result<(), Box<dyn Error>> {
        if self.entries.contains_key(&key) {
            return Ok(());
        }
        let now = Utc::now();
        self.entries.insert(key.clone(), format_timestamp(now));
        self.policy.prune(&mut self.entries, now, Some(&key));
        self.persist().await
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// In-memory [`LinkStore`] for unit tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryLinkStore {
    pub keys: std::collections::HashSet<String>,
}

#[cfg(test)]
impl LinkStore for MemoryLinkStore {
    fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    async fn insert(&mut self, key: String) -> Result<(), Box<dyn Error>> {
        self.keys.insert(key);
        Ok(())
    }

    fn len(&self) -> usize {
        self.keys.len()
    }
}
