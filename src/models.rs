//! Data models shared by the collection, enrichment and output stages.
//!
//! - [`RawEntry`] / [`FeedDocument`]: untyped output of the feed parser
//! - [`FeedEntry`]: a validated article reference, immutable once built
//! - [`Candidate`]: an entry selected for this run, flagged when recycled
//! - [`Analysis`] / [`EnrichedRecord`]: LLM output and the dataset record
//! - [`RunReport`]: summary of one run, written as JSON

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use url::Url;

/// One entry exactly as the feed parser found it.
///
/// Every field is optional because feeds in the wild omit all of them at
/// some point. Validation happens in [`FeedEntry::from_raw`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub summary: Option<String>,
}

/// A parsed feed: its own title (used as the source label) and its entries
/// in feed-native order.
#[derive(Debug, Clone, Default)]
pub struct FeedDocument {
    pub title: Option<String>,
    pub entries: Vec<RawEntry>,
}

/// Reasons a [`RawEntry`] cannot become a [`FeedEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    MissingLink,
    InvalidLink(String),
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryError::MissingLink => write!(f, "entry has no link"),
            EntryError::InvalidLink(link) => write!(f, "entry link is not an http(s) URL: {link}"),
        }
    }
}

impl Error for EntryError {}

/// A validated article reference read from a feed.
///
/// The `link` is the article's identity: deduplication and the dataset
/// record both key on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub source_label: String,
    /// Publication timestamp as the feed wrote it. Formats vary and are not normalized.
    pub published: Option<String>,
    pub summary: Option<String>,
}

impl FeedEntry {
    /// Validate a raw entry and attach the label of the source it came from.
    ///
    /// The link must be an absolute `http` or `https` URL. A missing title
    /// becomes an empty string.
    pub fn from_raw(raw: RawEntry, source_label: &str) -> Result<Self, EntryError> {
        let link = raw
            .link
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .ok_or(EntryError::MissingLink)?;

        match Url::parse(&link) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => return Err(EntryError::InvalidLink(link)),
        }

        Ok(FeedEntry {
            title: raw.title.unwrap_or_default(),
            link,
            source_label: source_label.to_string(),
            published: raw.published,
            summary: raw.summary,
        })
    }
}

/// An entry selected for processing in this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub entry: FeedEntry,
    /// `true` when the entry was already processed by an earlier run and was
    /// only added to fill the quota.
    pub recycled: bool,
}

/// Structured labels produced by the analyst LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub sentiment: String,
    pub category: String,
    pub key_entities: Vec<String>,
}

impl Analysis {
    /// Returned when the summary is too short to be worth an LLM call.
    pub fn not_applicable() -> Self {
        Analysis {
            sentiment: "N/A".to_string(),
            category: "N/A".to_string(),
            key_entities: Vec::new(),
        }
    }

    /// Returned when the analyst call or its JSON failed.
    pub fn failed() -> Self {
        Analysis {
            sentiment: "Error".to_string(),
            category: "Error".to_string(),
            key_entities: Vec::new(),
        }
    }
}

/// One dataset record: the feed metadata plus enrichment fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub source: String,
    pub title: String,
    pub url: String,
    pub published: Option<String>,
    pub summary: String,
    pub sentiment: String,
    pub category: String,
    pub key_entities: Vec<String>,
    pub recycled: bool,
}

impl EnrichedRecord {
    pub fn new(candidate: &Candidate, summary: String, analysis: Analysis) -> Self {
        let entry = &candidate.entry;
        EnrichedRecord {
            source: entry.source_label.clone(),
            title: entry.title.clone(),
            url: entry.link.clone(),
            published: entry.published.clone(),
            summary,
            sentiment: analysis.sentiment,
            category: analysis.category,
            key_entities: analysis.key_entities,
            recycled: candidate.recycled,
        }
    }
}

/// Summary of a single run, written next to the dataset as a JSON document.
#[derive(Debug, Deserialize, Serialize)]
pub struct RunReport {
    pub actor: String,
    pub source: String,
    /// The date of the run in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The local time of the run in `HH:MM:SS` format.
    pub local_time: String,
    pub requested: usize,
    pub fetched: usize,
    pub new_count: usize,
    pub recycled_count: usize,
    pub processed: usize,
    pub failed: usize,
    pub records: Vec<EnrichedRecord>,
}
