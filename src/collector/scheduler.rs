//! Round-robin scheduling across feed sources.

use crate::models::{FeedEntry, RawEntry};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// The remaining entries of one source, plus the label its entries carry.
#[derive(Debug)]
pub struct SourceCursor {
    label: String,
    entries: std::vec::IntoIter<RawEntry>,
}

impl SourceCursor {
    pub fn new(label: impl Into<String>, entries: Vec<RawEntry>) -> Self {
        Self {
            label: label.into(),
            entries: entries.into_iter(),
        }
    }
}

/// Visits sources in configuration order, one entry per visit.
///
/// A source goes back to the end of the queue after yielding an entry and is
/// dropped when it runs out or yields an entry that fails validation. Nothing
/// ever blocks on a source.
#[derive(Debug, Default)]
pub struct RoundRobin {
    queue: VecDeque<SourceCursor>,
}

impl RoundRobin {
    pub fn new(sources: Vec<SourceCursor>) -> Self {
        Self {
            queue: sources.into(),
        }
    }

    pub fn live_sources(&self) -> usize {
        self.queue.len()
    }

    /// Collect up to `max_total` entries, interleaved across sources.
    pub fn collect(mut self, max_total: usize) -> Vec<FeedEntry> {
        let mut out = Vec::with_capacity(max_total);

        while out.len() < max_total {
            let Some(mut cursor) = self.queue.pop_front() else {
                break;
            };

            match cursor.entries.next() {
                Some(raw) => match FeedEntry::from_raw(raw, &cursor.label) {
                    Ok(entry) => {
                        out.push(entry);
                        self.queue.push_back(cursor);
                    }
                    Err(e) => {
                        warn!(source = %cursor.label, error = %e, "Invalid entry; dropping source for this run");
                    }
                },
                None => {
                    debug!(source = %cursor.label, "Source exhausted");
                }
            }
        }

        debug!(
            collected = out.len(),
            remaining_sources = self.queue.len(),
            "Round-robin collection finished"
        );
        out
    }
}
