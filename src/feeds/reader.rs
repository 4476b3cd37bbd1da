//! Feed readers: the live HTTP reader and the canned reader used in test mode.

use super::parser::parse_feed;
use super::FeedReader;
use crate::models::{FeedDocument, RawEntry};
use reqwest::Client;
use std::error::Error;
use tracing::{debug, info, instrument};
use url::Url;

/// Fetches a feed over HTTP and parses it.
///
/// The [`Client`] carries the per-request timeout configured at startup;
/// this reader never retries.
#[derive(Debug, Clone)]
pub struct HttpFeedReader {
    client: Client,
}

impl HttpFeedReader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl FeedReader for HttpFeedReader {
    #[instrument(level = "info", skip(self))]
    async fn read(&self, url: &str) -> Result<FeedDocument, Box<dyn Error>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("feed request returned HTTP {status}").into());
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Downloaded feed body");
        let doc = parse_feed(&body)?;
        info!(entries = doc.entries.len(), title = ?doc.title, "Read feed");
        Ok(doc)
    }
}

/// Serves deterministic feeds without touching the network.
///
/// Each URL yields `entries_per_feed` entries whose links are derived from
/// the feed URL, so repeated runs see the same links and exercise
/// deduplication.
#[derive(Debug, Clone)]
pub struct CannedFeedReader {
    entries_per_feed: usize,
}

impl CannedFeedReader {
    pub fn new(entries_per_feed: usize) -> Self {
        Self { entries_per_feed }
    }
}

impl Default for CannedFeedReader {
    fn default() -> Self {
        Self::new(5)
    }
}

impl FeedReader for CannedFeedReader {
    async fn read(&self, url: &str) -> Result<FeedDocument, Box<dyn Error>> {
        let host = Url::parse(url)?
            .host_str()
            .unwrap_or("feed.invalid")
            .to_string();

        let entries = (1..=self.entries_per_feed)
            .map(|i| RawEntry {
                title: Some(format!("Test article {i} from {host}")),
                link: Some(format!("https://example.com/test/{host}/{i}")),
                published: Some("Mon, 06 May 2025 08:00:00 GMT".to_string()),
                summary: Some(format!(
                    "<p>Canned summary for test article {i} from {host}, long enough to be used as a fallback summary.</p>"
                )),
            })
            .collect();

        Ok(FeedDocument {
            title: Some(format!("Test Feed ({host})")),
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_reader_is_deterministic() {
        let reader = CannedFeedReader::new(3);
        let a = reader.read("https://krebsonsecurity.com/feed/").await.unwrap();
        let b = reader.read("https://krebsonsecurity.com/feed/").await.unwrap();

        assert_eq!(a.title.as_deref(), Some("Test Feed (krebsonsecurity.com)"));
        assert_eq!(a.entries.len(), 3);
        assert_eq!(a.entries, b.entries);
        assert_eq!(
            a.entries[0].link.as_deref(),
            Some("https://example.com/test/krebsonsecurity.com/1")
        );
    }

    /// Serve one canned HTTP response on a local port and return the URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/rss+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/feed.xml")
    }

    #[tokio::test]
    async fn test_http_reader_parses_success_body() {
        let url = serve_once(
            "200 OK",
            r#"<rss version="2.0"><channel><title>Local</title><item><title>A</title><link>https://example.com/a</link></item></channel></rss>"#,
        )
        .await;

        let doc = HttpFeedReader::new(Client::new()).read(&url).await.unwrap();
        assert_eq!(doc.title.as_deref(), Some("Local"));
        assert_eq!(doc.entries[0].link.as_deref(), Some("https://example.com/a"));
    }

    #[tokio::test]
    async fn test_http_reader_fails_on_error_status() {
        let url = serve_once("503 Service Unavailable", "").await;

        let err = HttpFeedReader::new(Client::new()).read(&url).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_canned_reader_rejects_invalid_url() {
        let reader = CannedFeedReader::default();
        assert!(reader.read("not a url").await.is_err());
    }
}
