//! News search collaborator: DuckDuckGo's HTML endpoint.
//!
//! Only the result titles and snippets are used; they ground the summariser
//! LLM in what is currently being reported about an article.
//!
//! # URL Pattern
//!
//! `https://html.duckduckgo.com/html/?q=<query>&kl=<region>&df=<d|w|m|y>`
//!
//! `kl` and `df` are omitted for the "any" values (`wt-wt`, `any`).

use crate::retry::{is_retryable_status, RetryPolicy};
use crate::utils::truncate_for_log;
use reqwest::Client;
use scraper::{Html, Selector};
use std::error::Error;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

const SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const MAX_RESULTS: usize = 5;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub title: String,
    pub snippet: String,
}

/// Render snippets as the block of text handed to the summariser.
pub fn snippets_for_prompt(snippets: &[Snippet]) -> String {
    snippets
        .iter()
        .filter(|s| !s.snippet.is_empty())
        .map(|s| format!("Title: {}\nSnippet: {}", s.title, s.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone)]
pub struct NewsSearch {
    client: Client,
    policy: RetryPolicy,
    region: Option<String>,
    time_limit: Option<String>,
}

impl NewsSearch {
    pub fn new(client: Client, policy: RetryPolicy, region: &str, time_limit: &str) -> Self {
        let region = Some(region.trim())
            .filter(|r| !r.is_empty() && !r.eq_ignore_ascii_case("wt-wt"))
            .map(str::to_string);
        let time_limit = Some(time_limit.trim())
            .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("any"))
            .map(str::to_string);
        Self {
            client,
            policy,
            region,
            time_limit,
        }
    }

    /// Build the request URL for `query`.
    pub fn url_for(&self, query: &str) -> String {
        let mut url = format!("{SEARCH_ENDPOINT}?q={}", urlencoding::encode(query));
        if let Some(region) = &self.region {
            url.push_str(&format!("&kl={}", urlencoding::encode(region)));
        }
        if let Some(time_limit) = &self.time_limit {
            url.push_str(&format!("&df={}", urlencoding::encode(time_limit)));
        }
        url
    }

    /// Search for `query`, retrying on 403/429/5xx per the retry policy.
    ///
    /// Returns at most five snippets; an empty result is not an error.
    #[instrument(level = "info", skip(self), fields(query = %truncate_for_log(query, 60)))]
    pub async fn search(&self, query: &str) -> Result<Vec<Snippet>, Box<dyn Error>> {
        let url = self.url_for(query);
        let mut attempt = 0usize;

        loop {
            let response = self.client.get(&url).send().await?;
            let status = response.status();

            if status.is_success() {
                let body = response.text().await?;
                let snippets = parse_results(&body)?;
                info!(count = snippets.len(), "Collected search snippets");
                return Ok(snippets);
            }

            attempt += 1;
            if !is_retryable_status(status) || attempt > self.policy.max_retries {
                return Err(format!("search returned HTTP {status} after {attempt} attempt(s)").into());
            }

            let delay = self.policy.delay_for(attempt);
            warn!(%status, attempt, ?delay, "Search blocked or unavailable; retrying");
            sleep(delay).await;
        }
    }
}

/// Extract result titles and snippets from a DuckDuckGo HTML results page.
pub fn parse_results(html: &str) -> Result<Vec<Snippet>, Box<dyn Error>> {
    let document = Html::parse_document(html);
    let result_selector = Selector::parse(".result")?;
    let title_selector = Selector::parse(".result__a")?;
    let snippet_selector = Selector::parse(".result__snippet")?;

    let text_of = |element: scraper::ElementRef<'_>| {
        element
            .text()
            .collect::<Vec<_>>()
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    };

    let snippets: Vec<Snippet> = document
        .select(&result_selector)
        .filter_map(|result| {
            let title = result.select(&title_selector).next().map(text_of)?;
            let snippet = result
                .select(&snippet_selector)
                .next()
                .map(text_of)
                .unwrap_or_default();
            Some(Snippet { title, snippet })
        })
        .take(MAX_RESULTS)
        .collect();

    debug!(count = snippets.len(), "Parsed search results");
    Ok(snippets)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS: &str = r#"
<html><body>
  <div class="result results_links">
    <h2 class="result__title"><a class="result__a" href="https://a.example.com">Ransomware hits <b>hospital</b></a></h2>
    <a class="result__snippet" href="https://a.example.com">A ransomware   attack disrupted services.</a>
  </div>
  <div class="result results_links">
    <h2 class="result__title"><a class="result__a" href="https://b.example.com">No snippet here</a></h2>
  </div>
  <div class="result results_links"><a class="result__a">3</a><a class="result__snippet">s3</a></div>
  <div class="result results_links"><a class="result__a">4</a><a class="result__snippet">s4</a></div>
  <div class="result results_links"><a class="result__a">5</a><a class="result__snippet">s5</a></div>
  <div class="result results_links"><a class="result__a">6</a><a class="result__snippet">s6</a></div>
</body></html>"#;

    #[test]
    fn test_parse_results_extracts_titles_and_snippets() {
        let snippets = parse_results(RESULTS).unwrap();
        assert_eq!(snippets.len(), MAX_RESULTS);
        assert_eq!(snippets[0].title, "Ransomware hits hospital");
        assert_eq!(snippets[0].snippet, "A ransomware attack disrupted services.");
        assert_eq!(snippets[1].snippet, "");
    }

    #[test]
    fn test_parse_results_empty_page() {
        assert!(parse_results("<html><body>No results.</body></html>")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_snippets_for_prompt_skips_empty_snippets() {
        let snippets = parse_results(RESULTS).unwrap();
        let prompt = snippets_for_prompt(&snippets);
        assert!(prompt.starts_with("Title: Ransomware hits hospital\nSnippet: A ransomware"));
        assert!(!prompt.contains("No snippet here"));
    }

    #[test]
    fn test_url_for_omits_any_filters() {
        let search = NewsSearch::new(Client::new(), RetryPolicy::default(), "wt-wt", "any");
        assert_eq!(
            search.url_for("\"Patch Tuesday\""),
            "https://html.duckduckgo.com/html/?q=%22Patch%20Tuesday%22"
        );

        let search = NewsSearch::new(Client::new(), RetryPolicy::default(), "us-en", "w");
        assert_eq!(
            search.url_for("rust"),
            "https://html.duckduckgo.com/html/?q=rust&kl=us-en&df=w"
        );
    }
}
