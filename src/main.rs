//! # News Intel
//!
//! A fair multi-source article collector. For one topical vertical it reads a
//! set of RSS/Atom feeds, picks articles round-robin so no single feed
//! dominates, drops links processed by earlier runs, tops up an underfilled
//! batch with previously seen articles, and enriches each article with a
//! summary and an LLM analysis (sentiment, category, key entities).
//!
//! ## Usage
//!
//! ```sh
//! news_intel --actor cybersecurity --max-articles 10
//! news_intel -i ./input.yaml --test-mode
//! ```
//!
//! ## Architecture
//!
//! 1. **Collection**: FETCHING → FILTERING → RECYCLING → READY
//! 2. **Enrichment**: summary + analysis per article, concurrently, in order
//! 3. **Output**: append to the JSONL dataset, mark links seen, write a run report

use awful_aj::{config as aj_config, config_dir, template};
use clap::Parser;
use reqwest::Client;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod catalog;
mod cli;
mod collector;
mod config;
mod enrich;
mod feeds;
mod models;
mod outputs;
mod pipeline;
mod retry;
mod search;
mod store;
mod utils;

use api::{LlmClient, RetryAsk};
use cli::Cli;
use collector::dedup::DedupFilter;
use config::{ActorInput, RunConfig, SummaryKind};
use enrich::{Enricher, SummaryMode};
use feeds::reader::{CannedFeedReader, HttpFeedReader};
use feeds::FeedReader;
use outputs::json;
use search::NewsSearch;
use store::FileLinkStore;
use utils::ensure_writable_dir;

const USER_AGENT: &str = concat!("news_intel/", env!("CARGO_PKG_VERSION"));

/// Summariser and analyst clients: canned in test mode, `awful_aj` otherwise.
async fn llm_clients(config: &RunConfig) -> Result<(LlmClient, LlmClient), Box<dyn Error>> {
    if config.test_mode {
        return Ok(pipeline::canned_llm_clients(config.vertical));
    }

    let conf_file = match &config.llm_config {
        Some(path) => PathBuf::from(path),
        None => config_dir()?.join("config.yaml"),
    };
    let config_path = conf_file
        .to_str()
        .ok_or("LLM config path is not valid UTF-8")?;
    let llm_config = Arc::new(aj_config::load_config(config_path)?);
    info!(config_path, "Loaded LLM configuration");

    let summarizer = Arc::new(template::load_template("news_summarizer").await?);
    let analyst = Arc::new(template::load_template("news_analyst").await?);
    info!("Loaded templates: news_summarizer, news_analyst");

    Ok((
        LlmClient::Live {
            config: Arc::clone(&llm_config),
            template: summarizer,
        },
        LlmClient::Live {
            config: llm_config,
            template: analyst,
        },
    ))
}

/// Open the link store, run one batch from `reader` and write its report.
async fn run<R: FeedReader>(
    config: &RunConfig,
    reader: &R,
    enricher: &Enricher<LlmClient>,
) -> Result<(), Box<dyn Error>> {
    let store =
        FileLinkStore::open(&config.state_dir, &config.vertical.store_namespace(), config.eviction)
            .await?;
    debug!(path = %store.path().display(), "Using link store");
    let mut dedup = DedupFilter::new(store);

    let Some(report) = pipeline::run_batch(config, reader, &mut dedup, enricher).await else {
        return Ok(());
    };
    if let Err(e) = json::write_run_report(&report, &config.json_output_dir).await {
        error!(error = %e, "Failed to write run report");
    }

    Ok(())
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_intel starting up");

    // Parse CLI and merge with the input file
    let args = Cli::parse();
    debug!(?args.input, ?args.actor, ?args.source, "Parsed CLI arguments");

    let mut input = match &args.input {
        Some(path) => ActorInput::load(path).await?,
        None => ActorInput::default(),
    };
    input.apply_cli(&args);
    let config = match RunConfig::resolve(input, &args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e);
        }
    };
    info!(
        actor = config.vertical.name,
        topic = config.vertical.topic,
        source = %config.selector,
        feeds = config.feed_urls.len(),
        quota = config.plan.quota,
        summary_mode = %config.summary_kind,
        test_mode = config.test_mode,
        "Resolved run configuration"
    );

    // Early check: output directories must be writable
    for dir in [
        config.dataset_dir.to_string_lossy().into_owned(),
        config.json_output_dir.clone(),
        config.state_dir.to_string_lossy().into_owned(),
    ] {
        if let Err(e) = ensure_writable_dir(&dir).await {
            error!(
                path = %dir,
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    if config.test_mode {
        warn!("Test mode: using canned feeds and canned LLM replies");
    }
    let (summarizer, analyst) = match llm_clients(&config).await {
        Ok(clients) => clients,
        Err(e) => {
            error!(error = %e, "Failed to load LLM configuration or templates");
            return Err(e);
        }
    };

    let client = Client::builder()
        .timeout(config.http_timeout)
        .user_agent(USER_AGENT)
        .build()?;

    let mode = match config.summary_kind {
        SummaryKind::Search => SummaryMode::Search(NewsSearch::new(
            client.clone(),
            config.retry,
            &config.region,
            &config.time_limit,
        )),
        SummaryKind::Llm => SummaryMode::Llm,
        SummaryKind::Feed => SummaryMode::Feed,
    };
    let enricher = Enricher::new(
        config.vertical,
        mode,
        RetryAsk::new(summarizer, config.retry),
        RetryAsk::new(analyst, config.retry),
    );

    if config.test_mode {
        run(&config, &CannedFeedReader::default(), &enricher).await?;
    } else {
        run(&config, &HttpFeedReader::new(client), &enricher).await?;
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
