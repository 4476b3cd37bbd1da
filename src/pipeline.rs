//! One run of the collector: collect a batch, enrich it, persist the results.
//!
//! Links are marked seen only after their record reaches the dataset, one
//! record at a time after fan-in, so a failed write leaves the link eligible
//! for the next run.

use crate::api::{AskAsync, LlmClient};
use crate::catalog::Vertical;
use crate::collector::{self, dedup::DedupFilter};
use crate::config::RunConfig;
use crate::enrich::Enricher;
use crate::feeds::FeedReader;
use crate::models::{EnrichedRecord, RunReport};
use crate::outputs::dataset::DatasetWriter;
use crate::store::LinkStore;
use chrono::Local;
use std::fmt;
use tracing::{error, info, instrument, warn};

const CANNED_SUMMARY: &str =
    "This is a test summary generated from canned data for a recent news event.";

/// Summariser and analyst replies used in test mode.
pub fn canned_llm_clients(vertical: &Vertical) -> (LlmClient, LlmClient) {
    let analysis = serde_json::json!({
        "sentiment": vertical.default_sentiment,
        "category": vertical.categories.first().copied().unwrap_or("N/A"),
        "key_entities": ["Example Corp", "Jane Doe"],
    });
    (
        LlmClient::Canned(CANNED_SUMMARY.to_string()),
        LlmClient::Canned(analysis.to_string()),
    )
}

/// Append each successful result to the dataset, then mark its link seen.
///
/// Returns the records that were written.
pub async fn persist_records<S: LinkStore>(
    dataset: &DatasetWriter,
    dedup: &mut DedupFilter<S>,
    results: Vec<Option<EnrichedRecord>>,
) -> Vec<EnrichedRecord> {
    let mut records = Vec::new();
    for result in results.into_iter().flatten() {
        if let Err(e) = dataset.push(&result).await {
            error!(url = %result.url, error = %e, "Dataset write failed; link stays unseen");
            continue;
        }
        if let Err(e) = dedup.mark_seen(&result.url).await {
            error!(url = %result.url, error = %e, "Failed to persist seen link");
        }
        records.push(result);
    }
    records
}

/// Collect, enrich and persist one batch. `None` when nothing was collected.
#[instrument(level = "info", skip_all, fields(actor = config.vertical.name, source = %config.selector))]
pub async fn run_batch<R, S, L>(
    config: &RunConfig,
    reader: &R,
    dedup: &mut DedupFilter<S>,
    enricher: &Enricher<L>,
) -> Option<RunReport>
where
    R: FeedReader,
    S: LinkStore,
    L: AskAsync<Response = String> + fmt::Debug,
{
    info!(known_links = dedup.known_links(), "Dedup filter ready");
    let batch = collector::collect_batch(reader, &config.feed_urls, dedup, config.plan).await;
    if batch.is_empty() {
        warn!(fetched = batch.fetched, "No articles to process; nothing to do");
        return None;
    }

    let width = config.width_for(batch.candidates.len());
    let results = enricher.enrich_all(&batch.candidates, width).await;

    let dataset = DatasetWriter::new(&config.dataset_dir, config.vertical.name);
    let records = persist_records(&dataset, dedup, results).await;

    let processed = records.len();
    let failed = batch.candidates.len() - processed;
    info!(
        total = batch.candidates.len(),
        processed,
        failed,
        path = %dataset.path().display(),
        "Completed article processing"
    );

    let now = Local::now();
    Some(RunReport {
        actor: config.vertical.name.to_string(),
        source: config.selector.to_string(),
        local_date: now.date_naive().to_string(),
        local_time: now.time().format("%H:%M:%S").to_string(),
        requested: config.plan.quota,
        fetched: batch.fetched,
        new_count: batch.new_count,
        recycled_count: batch.recycled_count,
        processed,
        failed,
        records,
    })
}
