//! Fair multi-source article collection.
//!
//! A run moves through four phases:
//!
//! ```text
//! FETCHING ──► FILTERING ──► (RECYCLING if underfilled) ──► READY
//! ```
//!
//! - **Fetching**: every source URL is read once, in configuration order.
//!   Failures are logged and the source is skipped.
//! - **Filtering**: the round-robin pool is split into new entries and
//!   entries already in the [`DedupFilter`].
//! - **Recycling**: see [`recycle::backfill`].
//! - **Ready**: the ordered [`Batch`] is handed to enrichment.

pub mod dedup;
pub mod recycle;
pub mod scheduler;

use crate::feeds::FeedReader;
use crate::models::{Candidate, FeedEntry};
use crate::store::LinkStore;
use dedup::{link_key, DedupFilter};
use scheduler::{RoundRobin, SourceCursor};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetching,
    Filtering,
    Recycling,
    Ready,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Fetching => "FETCHING",
            Phase::Filtering => "FILTERING",
            Phase::Recycling => "RECYCLING",
            Phase::Ready => "READY",
        };
        f.write_str(name)
    }
}

/// How many articles a run wants and how it may reach that number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionPlan {
    /// Number of articles to hand to enrichment.
    pub quota: usize,
    /// Number of entries to pull round-robin before filtering. Never below `quota`.
    pub pool_size: usize,
    /// Whether previously seen entries may fill an underfilled batch.
    pub recycle: bool,
}

/// The finalized, ordered output of a collection run.
#[derive(Debug, Default)]
pub struct Batch {
    pub candidates: Vec<Candidate>,
    pub fetched: usize,
    pub new_count: usize,
    pub recycled_count: usize,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Read every source once; sources that fail or are empty are left out.
#[instrument(level = "info", skip_all, fields(sources = urls.len()))]
pub async fn fetch_sources<R: FeedReader>(reader: &R, urls: &[String]) -> Vec<SourceCursor> {
    let mut cursors = Vec::with_capacity(urls.len());

    for url in urls {
        info!(%url, "Parsing feed");
        match reader.read(url).await {
            Ok(doc) if doc.entries.is_empty() => {
                warn!(%url, "Feed returned no entries");
            }
            Ok(doc) => {
                let label = doc
                    .title
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| format!("Unknown ({url})"));
                cursors.push(SourceCursor::new(label, doc.entries));
            }
            Err(e) => {
                warn!(%url, error = %e, "Failed to read feed; skipping source");
            }
        }
    }

    info!(live = cursors.len(), configured = urls.len(), "Fetched sources");
    cursors
}

/// Split `pool` into up to `quota` new candidates and the previously seen
/// entries, suppressing links repeated across feeds within this run.
fn filter_pool<S: LinkStore>(
    pool: &[FeedEntry],
    dedup: &DedupFilter<S>,
    quota: usize,
) -> (Vec<Candidate>, Vec<FeedEntry>) {
    let mut batch = Vec::new();
    let mut seen = Vec::new();
    let mut in_run = HashSet::new();

    for entry in pool {
        if !in_run.insert(link_key(&entry.link)) {
            continue;
        }
        if dedup.is_new(&entry.link) {
            if batch.len() < quota {
                batch.push(Candidate {
                    entry: entry.clone(),
                    recycled: false,
                });
            }
        } else {
            seen.push(entry.clone());
        }
    }

    (batch, seen)
}

/// Run FETCHING → FILTERING → (RECYCLING) → READY for one set of sources.
#[instrument(level = "info", skip_all, fields(quota = plan.quota, pool_size = plan.pool_size))]
pub async fn collect_batch<R: FeedReader, S: LinkStore>(
    reader: &R,
    urls: &[String],
    dedup: &DedupFilter<S>,
    plan: CollectionPlan,
) -> Batch {
    info!(phase = %Phase::Fetching, "Collection phase");
    let cursors = fetch_sources(reader, urls).await;
    let round_robin = RoundRobin::new(cursors);
    debug!(live_sources = round_robin.live_sources(), "Starting round-robin collection");
    let pool = round_robin.collect(plan.pool_size.max(plan.quota));
    info!(fetched = pool.len(), "Collected candidate pool; checking for duplicates");

    info!(phase = %Phase::Filtering, "Collection phase");
    let (mut candidates, seen) = filter_pool(&pool, dedup, plan.quota);
    let new_count = candidates.len();
    info!(new = new_count, previously_seen = seen.len(), "Filtered candidate pool");

    let mut recycled_count = 0;
    if candidates.len() < plan.quota && plan.recycle {
        info!(phase = %Phase::Recycling, "Collection phase");
        recycled_count = recycle::backfill(&mut candidates, &seen, plan.quota);
    }

    info!(
        phase = %Phase::Ready,
        total = candidates.len(),
        new = new_count,
        recycled = recycled_count,
        "Collection phase"
    );

    Batch {
        candidates,
        fetched: pool.len(),
        new_count,
        recycled_count,
    }
}
