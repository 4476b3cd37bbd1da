//! Run configuration: a YAML input file merged with CLI overrides.
//!
//! Everything here is resolved and validated once at startup; the resulting
//! [`RunConfig`] is passed by reference to the stages that need it.

use crate::catalog::{self, SourceSelector, Vertical};
use crate::cli::Cli;
use crate::collector::CollectionPlan;
use crate::retry::RetryPolicy;
use crate::store::EvictionPolicy;
use clap::ValueEnum;
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

/// Which collaborator produces article summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SummaryKind {
    #[default]
    Search,
    Llm,
    Feed,
}

impl fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryKind::Search => f.write_str("search"),
            SummaryKind::Llm => f.write_str("llm"),
            SummaryKind::Feed => f.write_str("feed"),
        }
    }
}

/// Seen-link retention as written in the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DedupSettings {
    /// `0` keeps keys forever.
    pub ttl_days: i64,
    /// `0` means unbounded.
    pub max_entries: usize,
}

impl Default for DedupSettings {
    fn default() -> Self {
        Self {
            ttl_days: 30,
            max_entries: 10_000,
        }
    }
}

impl DedupSettings {
    pub fn policy(&self) -> EvictionPolicy {
        EvictionPolicy {
            ttl: (self.ttl_days > 0).then(|| chrono::Duration::days(self.ttl_days)),
            max_entries: (self.max_entries > 0).then_some(self.max_entries),
        }
    }
}

/// The YAML input file. Every field is optional.
///
/// Existing actor inputs use camelCase keys (`maxArticles`, `runTestMode`, ...);
/// both spellings are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActorInput {
    pub actor: String,
    pub source: String,
    #[serde(alias = "customFeedUrl")]
    pub custom_feed_url: Option<String>,
    #[serde(alias = "maxArticles")]
    pub max_articles: usize,
    pub candidate_pool: Option<usize>,
    #[serde(alias = "runTestMode")]
    pub run_test_mode: bool,
    pub region: String,
    #[serde(alias = "timeLimit")]
    pub time_limit: String,
    pub summary_mode: SummaryKind,
    pub allow_recycling: bool,
    pub concurrency: Option<usize>,
    pub http_timeout_secs: u64,
    pub retry: RetryPolicy,
    pub dedup: DedupSettings,
}

impl Default for ActorInput {
    fn default() -> Self {
        Self {
            actor: "world-news".to_string(),
            source: "all".to_string(),
            custom_feed_url: None,
            max_articles: 20,
            candidate_pool: None,
            run_test_mode: false,
            region: "wt-wt".to_string(),
            time_limit: "any".to_string(),
            summary_mode: SummaryKind::default(),
            allow_recycling: true,
            concurrency: None,
            http_timeout_secs: 30,
            retry: RetryPolicy::default(),
            dedup: DedupSettings::default(),
        }
    }
}

impl ActorInput {
    pub fn from_yaml(raw: &str) -> Result<Self, Box<dyn Error>> {
        Ok(serde_yaml::from_str(raw)?)
    }

    #[instrument(level = "info")]
    pub async fn load(path: &str) -> Result<Self, Box<dyn Error>> {
        let raw = fs::read_to_string(path).await?;
        let input = Self::from_yaml(&raw)?;
        info!(path, actor = %input.actor, "Loaded input file");
        Ok(input)
    }

    /// Overlay the options given on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(actor) = &cli.actor {
            self.actor = actor.clone();
        }
        if let Some(source) = &cli.source {
            self.source = source.clone();
        }
        if let Some(url) = &cli.custom_feed_url {
            self.custom_feed_url = Some(url.clone());
        }
        if let Some(max) = cli.max_articles {
            self.max_articles = max;
        }
        if let Some(mode) = cli.summary_mode {
            self.summary_mode = mode;
        }
        if cli.test_mode {
            self.run_test_mode = true;
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub vertical: &'static Vertical,
    pub selector: SourceSelector,
    pub feed_urls: Vec<String>,
    pub plan: CollectionPlan,
    pub test_mode: bool,
    pub summary_kind: SummaryKind,
    pub region: String,
    pub time_limit: String,
    pub concurrency: Option<usize>,
    pub http_timeout: Duration,
    pub retry: RetryPolicy,
    pub eviction: EvictionPolicy,
    pub dataset_dir: PathBuf,
    pub json_output_dir: String,
    pub state_dir: PathBuf,
    pub llm_config: Option<String>,
}

impl RunConfig {
    /// Validate `input` and resolve the vertical and its feed URLs.
    ///
    /// # Errors
    ///
    /// Fails on an unknown vertical or source, `custom` without a feed URL,
    /// a zero article count, concurrency or HTTP timeout.
    pub fn resolve(input: ActorInput, cli: &Cli) -> Result<Self, Box<dyn Error>> {
        if input.max_articles == 0 {
            return Err("max_articles must be at least 1".into());
        }
        if input.concurrency == Some(0) {
            return Err("concurrency must be at least 1".into());
        }
        if input.http_timeout_secs == 0 {
            return Err("http_timeout_secs must be at least 1".into());
        }

        let vertical = catalog::vertical(&input.actor)?;
        let selector = SourceSelector::parse(&input.source, input.custom_feed_url.as_deref())?;
        let feed_urls = vertical.resolve(&selector)?;

        let plan = CollectionPlan {
            quota: input.max_articles,
            pool_size: input
                .candidate_pool
                .unwrap_or(input.max_articles)
                .max(input.max_articles),
            recycle: input.allow_recycling,
        };

        // Canned data has nothing to search for.
        let summary_kind = if input.run_test_mode {
            SummaryKind::Llm
        } else {
            input.summary_mode
        };

        Ok(Self {
            vertical,
            selector,
            feed_urls,
            plan,
            test_mode: input.run_test_mode,
            summary_kind,
            region: input.region,
            time_limit: input.time_limit,
            concurrency: input.concurrency,
            http_timeout: Duration::from_secs(input.http_timeout_secs),
            retry: input.retry,
            eviction: input.dedup.policy(),
            dataset_dir: PathBuf::from(&cli.dataset_dir),
            json_output_dir: cli.json_output_dir.clone(),
            state_dir: PathBuf::from(&cli.state_dir),
            llm_config: cli.llm_config.clone(),
        })
    }

    /// Fan-out width for a batch of `batch_len` articles.
    pub fn width_for(&self, batch_len: usize) -> usize {
        self.concurrency.unwrap_or(batch_len).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["news_intel"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_defaults_from_empty_yaml() {
        let input = ActorInput::from_yaml("{}").unwrap();
        assert_eq!(input.source, "all");
        assert_eq!(input.max_articles, 20);
        assert_eq!(input.summary_mode, SummaryKind::Search);
        assert!(input.allow_recycling);
        assert_eq!(input.retry, RetryPolicy::default());
        assert_eq!(input.dedup.policy(), EvictionPolicy::default());
    }

    #[test]
    fn test_yaml_fields_and_nested_sections() {
        let yaml = r#"
actor: cybersecurity
source: custom
custom_feed_url: https://example.com/feed.xml
max_articles: 5
candidate_pool: 15
summary_mode: feed
retry:
  max_retries: 1
dedup:
  ttl_days: 0
  max_entries: 50
"#;
        let input = ActorInput::from_yaml(yaml).unwrap();
        assert_eq!(input.actor, "cybersecurity");
        assert_eq!(input.summary_mode, SummaryKind::Feed);
        assert_eq!(input.retry.max_retries, 1);
        assert_eq!(input.retry.base_delay_ms, RetryPolicy::default().base_delay_ms);

        let policy = input.dedup.policy();
        assert_eq!(policy.ttl, None);
        assert_eq!(policy.max_entries, Some(50));
    }

    #[test]
    fn test_camel_case_actor_input_loads() {
        let yaml = r#"
source: custom
customFeedUrl: https://example.com/feed.xml
maxArticles: 7
runTestMode: true
region: us-en
timeLimit: d
"#;
        let input = ActorInput::from_yaml(yaml).unwrap();
        assert_eq!(input.custom_feed_url.as_deref(), Some("https://example.com/feed.xml"));
        assert_eq!(input.max_articles, 7);
        assert!(input.run_test_mode);
        assert_eq!(input.region, "us-en");
        assert_eq!(input.time_limit, "d");
    }

    #[test]
    fn test_cli_overrides_input() {
        let mut input = ActorInput::from_yaml("actor: luxury\nmax_articles: 3\n").unwrap();
        input
            .apply_cli(&cli(&["--actor", "foodtech", "--summary-mode", "LLM"]));
        assert_eq!(input.actor, "foodtech");
        assert_eq!(input.max_articles, 3);
        assert_eq!(input.summary_mode, SummaryKind::Llm);
    }

    #[test]
    fn test_resolve_builds_plan() {
        let args = cli(&[]);
        let mut input = ActorInput::default();
        input.actor = "cybersecurity".to_string();
        input.max_articles = 10;
        input.candidate_pool = Some(4);

        let config = RunConfig::resolve(input, &args).unwrap();
        assert_eq!(config.plan.quota, 10);
        assert_eq!(config.plan.pool_size, 10);
        assert!(config.plan.recycle);
        assert!(!config.feed_urls.is_empty());
        assert_eq!(config.width_for(7), 7);
    }

    #[test]
    fn test_test_mode_forces_llm_summaries() {
        let args = cli(&["--test-mode"]);
        let mut input = ActorInput::default();
        input.apply_cli(&args);

        let config = RunConfig::resolve(input, &args).unwrap();
        assert!(config.test_mode);
        assert_eq!(config.summary_kind, SummaryKind::Llm);
    }

    #[test]
    fn test_resolve_rejects_bad_input() {
        let args = cli(&[]);

        let mut unknown = ActorInput::default();
        unknown.actor = "astrology".to_string();
        assert!(RunConfig::resolve(unknown, &args).is_err());

        let mut custom = ActorInput::default();
        custom.source = "custom".to_string();
        assert!(RunConfig::resolve(custom, &args).is_err());

        let mut zero = ActorInput::default();
        zero.max_articles = 0;
        assert!(RunConfig::resolve(zero, &args).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_summary_mode() {
        assert!(Cli::try_parse_from(["news_intel", "--summary-mode", "telepathy"]).is_err());
    }
}
