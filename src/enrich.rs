//! Per-article enrichment: a summary plus LLM analysis.
//!
//! Each article is handled independently. A failure to produce any summary
//! skips that article; a failed analysis degrades to [`Analysis::failed`].
//! Articles run concurrently but results come back in input order.

use crate::api::{AskAsync, RetryAsk};
use crate::catalog::Vertical;
use crate::models::{Analysis, Candidate, EnrichedRecord, FeedEntry};
use crate::search::{snippets_for_prompt, NewsSearch};
use crate::utils::{looks_truncated, strip_html_tags, truncate_for_log};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, error, info, instrument, warn};

/// Shortest stripped feed summary accepted as a fallback.
const MIN_FEED_SUMMARY_CHARS: usize = 50;
/// Shorter summaries are not sent to the analyst.
const MIN_ANALYSIS_CHARS: usize = 20;
const MAX_KEY_ENTITIES: usize = 3;

/// Where summaries come from.
#[derive(Debug)]
pub enum SummaryMode {
    /// Search the title (quoted, then loose) and summarise the snippets.
    Search(NewsSearch),
    /// Summarise the feed entry's own title and description.
    Llm,
    /// Use the HTML-stripped feed description as is.
    Feed,
}

impl fmt::Display for SummaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryMode::Search(_) => f.write_str("search"),
            SummaryMode::Llm => f.write_str("llm"),
            SummaryMode::Feed => f.write_str("feed"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    sentiment: Option<Value>,
    category: Option<Value>,
    key_entities: Option<Value>,
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Slice out the outermost JSON object, ignoring code fences or chatter around it.
fn json_object_slice(reply: &str) -> &str {
    match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if end > start => &reply[start..=end],
        (Some(start), _) => &reply[start..],
        _ => reply,
    }
}

/// Parse and normalize an analyst reply against `vertical`'s vocabulary.
fn parse_analysis(reply: &str, vertical: &Vertical) -> Result<Analysis, serde_json::Error> {
    let raw: RawAnalysis = serde_json::from_str(json_object_slice(reply))?;

    let sentiment = raw
        .sentiment
        .as_ref()
        .map(value_to_string)
        .unwrap_or_default();
    let category = raw
        .category
        .as_ref()
        .map(value_to_string)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "N/A".to_string());
    let key_entities = match raw.key_entities {
        Some(Value::Array(items)) => items.iter().map(value_to_string).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(scalar) => vec![value_to_string(&scalar)],
    };

    Ok(Analysis {
        sentiment: vertical.normalize_sentiment(&sentiment),
        category,
        key_entities: key_entities
            .into_iter()
            .filter(|e: &String| !e.is_empty())
            .unique()
            .take(MAX_KEY_ENTITIES)
            .collect(),
    })
}

fn analysis_prompt(vertical: &Vertical, summary: &str) -> String {
    format!(
        "Analyze the following {} news summary: \"{}\"\n\n\
         Sentiment options: {}\n\
         Categories: {}\n\n\
         Return a single JSON object with \"sentiment\", \"category\" and \"key_entities\" (up to {} items).",
        vertical.topic,
        summary,
        vertical.sentiment_options.join(", "),
        vertical.categories.join(", "),
        MAX_KEY_ENTITIES
    )
}

fn snippet_summary_prompt(snippets: &str) -> String {
    format!(
        "Based on the following raw search result snippets, write a concise, neutral, one-paragraph summary of the main news event.\n\nSnippets:\n---\n{snippets}\n---"
    )
}

fn entry_summary_prompt(entry: &FeedEntry) -> String {
    let description = entry
        .summary
        .as_deref()
        .map(strip_html_tags)
        .unwrap_or_default();
    format!(
        "Write a concise, neutral, one-paragraph summary of this news article.\n\nTitle: {}\nSource: {}\nDescription: {}",
        entry.title, entry.source_label, description
    )
}

/// The stripped feed description, when it is long enough to stand in for a summary.
fn feed_summary(entry: &FeedEntry) -> Option<String> {
    entry
        .summary
        .as_deref()
        .map(strip_html_tags)
        .filter(|s| s.chars().count() >= MIN_FEED_SUMMARY_CHARS)
}

pub struct Enricher<L> {
    vertical: &'static Vertical,
    mode: SummaryMode,
    summarizer: RetryAsk<L>,
    analyst: RetryAsk<L>,
}

impl<L> Enricher<L>
where
    L: AskAsync<Response = String> + fmt::Debug,
{
    pub fn new(
        vertical: &'static Vertical,
        mode: SummaryMode,
        summarizer: RetryAsk<L>,
        analyst: RetryAsk<L>,
    ) -> Self {
        Self {
            vertical,
            mode,
            summarizer,
            analyst,
        }
    }

    async fn ask_summarizer(&self, prompt: &str) -> Option<String> {
        match self.summarizer.ask(prompt).await {
            Ok(reply) if !reply.trim().is_empty() => Some(reply.trim().to_string()),
            Ok(_) => {
                warn!("Summariser returned an empty reply");
                None
            }
            Err(e) => {
                warn!(error = %e, "Summariser call failed");
                None
            }
        }
    }

    async fn summary_from_search(&self, search: &NewsSearch, entry: &FeedEntry) -> Option<String> {
        let loose = entry.title.replace('"', "").trim().to_string();
        if loose.is_empty() {
            return None;
        }
        let strict = format!("\"{loose}\"");

        for query in [strict, loose] {
            match search.search(&query).await {
                Ok(snippets) => {
                    let text = snippets_for_prompt(&snippets);
                    if text.is_empty() {
                        warn!(query = %truncate_for_log(&query, 60), "No usable snippets");
                        continue;
                    }
                    if let Some(summary) = self.ask_summarizer(&snippet_summary_prompt(&text)).await {
                        return Some(summary);
                    }
                }
                Err(e) => {
                    warn!(query = %truncate_for_log(&query, 60), error = %e, "Search failed");
                }
            }
        }
        None
    }

    /// Produce a summary for `entry`, falling back to the feed description.
    #[instrument(level = "debug", skip_all, fields(link = %entry.link, mode = %self.mode))]
    pub async fn summarize(&self, entry: &FeedEntry) -> Option<String> {
        let generated = match &self.mode {
            SummaryMode::Search(search) => self.summary_from_search(search, entry).await,
            SummaryMode::Llm => self.ask_summarizer(&entry_summary_prompt(entry)).await,
            SummaryMode::Feed => None,
        };

        generated.or_else(|| {
            let fallback = feed_summary(entry);
            if fallback.is_some() && !matches!(self.mode, SummaryMode::Feed) {
                warn!(link = %entry.link, "Falling back to the feed summary");
            }
            fallback
        })
    }

    /// Classify a summary. Never fails: problems degrade the labels instead.
    #[instrument(level = "debug", skip_all)]
    pub async fn analyze(&self, summary: &str) -> Analysis {
        if summary.chars().count() < MIN_ANALYSIS_CHARS {
            warn!("Summary too short for analysis; skipping LLM call");
            return Analysis::not_applicable();
        }

        let prompt = analysis_prompt(self.vertical, summary);
        let reply = match self.analyst.ask(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Analyst call failed");
                return Analysis::failed();
            }
        };

        let mut parsed = parse_analysis(&reply, self.vertical);
        if let Err(e) = &parsed {
            if looks_truncated(e) {
                warn!(error = %e, "EOF while parsing analysis; re-asking once");
                match self.analyst.ask(&prompt).await {
                    Ok(second) => parsed = parse_analysis(&second, self.vertical),
                    Err(e2) => warn!(error = %e2, "Re-ask failed"),
                }
            }
        }

        match parsed {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(
                    error = %e,
                    response_preview = %truncate_for_log(&reply, 300),
                    "Analyst returned non-conforming JSON"
                );
                Analysis::failed()
            }
        }
    }

    /// Enrich one candidate, or `None` when no summary could be produced.
    pub async fn enrich(&self, index: usize, candidate: &Candidate) -> Option<EnrichedRecord> {
        let entry = &candidate.entry;
        debug!(index, link = %entry.link, recycled = candidate.recycled, "Enriching article");

        let Some(summary) = self.summarize(entry).await else {
            error!(index, link = %entry.link, "No summary could be generated; skipping article");
            return None;
        };
        let analysis = self.analyze(&summary).await;

        info!(
            index,
            title = %truncate_for_log(&entry.title, 50),
            sentiment = %analysis.sentiment,
            category = %analysis.category,
            "Enriched article"
        );
        Some(EnrichedRecord::new(candidate, summary, analysis))
    }

    /// Enrich every candidate with up to `width` in flight; output order matches input order.
    #[instrument(level = "info", skip_all, fields(articles = candidates.len(), width = width))]
    pub async fn enrich_all(&self, candidates: &[Candidate], width: usize) -> Vec<Option<EnrichedRecord>> {
        stream::iter(candidates.iter().enumerate())
            .map(|(i, candidate)| self.enrich(i, candidate))
            .buffered(width.max(1))
            .collect()
            .await
    }
}
