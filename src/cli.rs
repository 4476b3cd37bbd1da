//! Command-line interface definitions for the collector.
//!
//! Every option can also come from an environment variable. Options given
//! here override the matching field of the YAML input file.

use crate::config::SummaryKind;
use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Run the cybersecurity vertical against every catalog feed
/// news_intel --actor cybersecurity --max-articles 10
///
/// # Read settings from a file, then override the source
/// news_intel -i ./input.yaml --source bleepingcomputer
///
/// # Offline run with canned feeds and canned LLM replies
/// news_intel --actor world-news --test-mode
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML input file
    #[arg(short, long, env = "COLLECTOR_INPUT")]
    pub input: Option<String>,

    /// Vertical to run (e.g. cybersecurity, world-news)
    #[arg(short, long, env = "COLLECTOR_ACTOR")]
    pub actor: Option<String>,

    /// Source selector: `all`, a named source, or `custom`
    #[arg(short, long, env = "COLLECTOR_SOURCE")]
    pub source: Option<String>,

    /// Feed URL used when the source is `custom`
    #[arg(long, env = "COLLECTOR_CUSTOM_FEED_URL")]
    pub custom_feed_url: Option<String>,

    /// Number of articles to process
    #[arg(short, long, env = "COLLECTOR_MAX_ARTICLES")]
    pub max_articles: Option<usize>,

    /// Summary source
    #[arg(long, env = "COLLECTOR_SUMMARY_MODE", value_enum, ignore_case = true)]
    pub summary_mode: Option<SummaryKind>,

    /// Use canned feeds and canned LLM replies; no network calls
    #[arg(long, env = "COLLECTOR_TEST_MODE")]
    pub test_mode: bool,

    /// Output directory for the JSON Lines dataset
    #[arg(short, long, env = "COLLECTOR_DATASET_DIR", default_value = "./storage/datasets")]
    pub dataset_dir: String,

    /// Output directory for JSON run reports
    #[arg(short, long, env = "COLLECTOR_JSON_OUTPUT_DIR", default_value = "./storage/runs")]
    pub json_output_dir: String,

    /// Directory holding the seen-link stores
    #[arg(long, env = "COLLECTOR_STATE_DIR", default_value = "./storage/state")]
    pub state_dir: String,

    /// Optional path to the LLM config.yaml (defaults to the awful_aj config dir)
    #[arg(short = 'c', long, env = "COLLECTOR_LLM_CONFIG")]
    pub llm_config: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "news_intel",
            "--actor",
            "cybersecurity",
            "--max-articles",
            "10",
            "--json-output-dir",
            "./json",
        ]);

        assert_eq!(cli.actor.as_deref(), Some("cybersecurity"));
        assert_eq!(cli.max_articles, Some(10));
        assert_eq!(cli.json_output_dir, "./json");
        assert_eq!(cli.dataset_dir, "./storage/datasets");
        assert!(!cli.test_mode);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "news_intel",
            "-i",
            "/tmp/input.yaml",
            "-s",
            "custom",
            "--custom-feed-url",
            "https://example.com/feed.xml",
            "--test-mode",
        ]);

        assert_eq!(cli.input.as_deref(), Some("/tmp/input.yaml"));
        assert_eq!(cli.source.as_deref(), Some("custom"));
        assert_eq!(
            cli.custom_feed_url.as_deref(),
            Some("https://example.com/feed.xml")
        );
        assert!(cli.test_mode);
    }
}
