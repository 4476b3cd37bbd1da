//! Backfilling an underfilled batch with already-processed entries.
//!
//! Stale feeds would otherwise produce empty runs. Recycled entries are
//! flagged so downstream consumers can tell them apart; their enrichment is
//! recomputed.

use crate::models::{Candidate, FeedEntry};
use tracing::warn;

/// Top `batch` up to `quota`.
///
/// Only previously seen entries are recycled, in pool order. When there are
/// fewer of them than needed they are cycled again from the start, so a seen
/// entry may repeat; entries new in this run never do. No seen entries means
/// no backfill.
///
/// Returns the number of recycled candidates appended.
pub fn backfill(batch: &mut Vec<Candidate>, seen: &[FeedEntry], quota: usize) -> usize {
    if batch.len() >= quota || seen.is_empty() {
        return 0;
    }
    let needed = quota - batch.len();
    let fresh = batch.len();

    let refill = seen.iter().cycle().take(needed).cloned();
    batch.extend(refill.map(|entry| Candidate {
        entry,
        recycled: true,
    }));

    let recycled = batch.len() - fresh;
    if recycled > 0 {
        warn!(
            new = fresh,
            recycled,
            quota,
            "Too few new articles; reusing previously processed ones to reach the quota"
        );
    }
    recycled
}
