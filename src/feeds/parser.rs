//! RSS/Atom parsing with `feed-rs`.
//!
//! `feed-rs` detects RSS 0.9x/2.0, RSS 1.0 (RDF), Atom and JSON Feed, honours
//! the encoding in the XML prolog, and keeps namespaced extensions
//! (`media:title`, `itunes:summary`, ...) out of the core fields. This module
//! only flattens its model into [`RawEntry`] values:
//! - link: first alternate link, else the first link, else an http(s) `guid`/`id`
//! - published: `published`, else `updated`
//! - summary: `summary`, else `content`

use crate::models::{FeedDocument, RawEntry};
use feed_rs::model::{Entry, Link};
use std::error::Error;
use tracing::{debug, instrument};

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(s: &str) -> Option<String> {
    Some(collapse_whitespace(s)).filter(|s| !s.is_empty())
}

fn is_alternate(link: &Link) -> bool {
    matches!(link.rel.as_deref(), None | Some("alternate"))
}

fn entry_link(entry: &Entry) -> Option<String> {
    entry
        .links
        .iter()
        .find(|link| is_alternate(link))
        .or_else(|| entry.links.first())
        .map(|link| link.href.trim().to_string())
        .filter(|href| !href.is_empty())
        .or_else(|| {
            let id = entry.id.trim();
            (id.starts_with("http://") || id.starts_with("https://")).then(|| id.to_string())
        })
}

fn raw_entry(entry: &Entry) -> RawEntry {
    let summary = entry
        .summary
        .as_ref()
        .and_then(|text| non_empty(&text.content))
        .or_else(|| {
            entry
                .content
                .as_ref()
                .and_then(|content| content.body.as_deref())
                .and_then(non_empty)
        });

    RawEntry {
        title: entry.title.as_ref().and_then(|text| non_empty(&text.content)),
        link: entry_link(entry),
        published: entry
            .published
            .or(entry.updated)
            .map(|timestamp| timestamp.to_rfc3339()),
        summary,
    }
}

/// Parse a syndication document into a [`FeedDocument`].
///
/// # Errors
///
/// Returns an error for malformed XML or a payload that is not a feed (an
/// HTML error page, for instance).
#[instrument(level = "debug", skip_all, fields(bytes = raw.len()))]
pub fn parse_feed(raw: &[u8]) -> Result<FeedDocument, Box<dyn Error>> {
    let feed = feed_rs::parser::parse(raw)?;
    let doc = FeedDocument {
        title: feed.title.as_ref().and_then(|text| non_empty(&text.content)),
        entries: feed.entries.iter().map(raw_entry).collect(),
    };
    debug!(title = ?doc.title, entries = doc.entries.len(), "Parsed feed document");
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Krebs on Security</title>
    <link>https://krebsonsecurity.com</link>
    <item>
      <title>Patch Tuesday &amp; You</title>
      <link>https://krebsonsecurity.com/2025/05/patch-tuesday/</link>
      <pubDate>Tue, 13 May 2025 18:00:00 +0000</pubDate>
      <description><![CDATA[<p>Microsoft fixed <b>72</b> flaws.</p>]]></description>
    </item>
    <item>
      <title>No link here</title>
      <guid isPermaLink="true">https://krebsonsecurity.com/?p=1</guid>
      <content:encoded>Body only</content:encoded>
    </item>
  </channel>
</rss>"#;

    const MEDIA_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>World</title>
    <item>
      <media:title>Photo: a stock image</media:title>
      <title>Real headline</title>
      <link>https://example.com/world/1</link>
      <media:description>caption text</media:description>
      <description>Real body</description>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="text">Schneier on Security</title>
  <id>https://www.schneier.com/</id>
  <updated>2025-05-06T10:00:00Z</updated>
  <entry>
    <title>Entry One</title>
    <id>tag:schneier.com,2025:one</id>
    <link rel="replies" href="https://www.schneier.com/comments/1"/>
    <link rel="alternate" href="https://www.schneier.com/blog/archives/2025/05/one.html"/>
    <updated>2025-05-06T10:00:00Z</updated>
    <summary>First   summary
      spanning lines</summary>
  </entry>
  <entry>
    <title>Entry Two</title>
    <id>tag:schneier.com,2025:two</id>
    <link href="https://www.schneier.com/blog/archives/2025/05/two.html"/>
    <published>2025-05-05T09:00:00Z</published>
    <updated>2025-05-06T09:00:00Z</updated>
  </entry>
</feed>"#;

    const RDF: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns="http://purl.org/rss/1.0/">
  <channel rdf:about="https://example.org/">
    <title>RDF Example</title>
    <link>https://example.org/</link>
    <description>Example</description>
  </channel>
  <item rdf:about="https://example.org/a">
    <title>RDF Item</title>
    <link>https://example.org/a</link>
  </item>
</rdf:RDF>"#;

    #[test]
    fn test_parse_rss_channel_and_items() {
        let doc = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(doc.title.as_deref(), Some("Krebs on Security"));
        assert_eq!(doc.entries.len(), 2);

        let first = &doc.entries[0];
        assert_eq!(first.title.as_deref(), Some("Patch Tuesday & You"));
        assert_eq!(
            first.link.as_deref(),
            Some("https://krebsonsecurity.com/2025/05/patch-tuesday/")
        );
        assert_eq!(first.published.as_deref(), Some("2025-05-13T18:00:00+00:00"));
        assert!(first.summary.as_deref().unwrap().contains("Microsoft fixed"));
    }

    #[test]
    fn test_parse_rss_guid_and_content_fallbacks() {
        let doc = parse_feed(RSS.as_bytes()).unwrap();
        let second = &doc.entries[1];
        assert_eq!(second.link.as_deref(), Some("https://krebsonsecurity.com/?p=1"));
        assert_eq!(second.summary.as_deref(), Some("Body only"));
        assert_eq!(second.published, None);
    }

    #[test]
    fn test_parse_rss_ignores_media_extension_fields() {
        let doc = parse_feed(MEDIA_RSS.as_bytes()).unwrap();
        let entry = &doc.entries[0];
        assert_eq!(entry.title.as_deref(), Some("Real headline"));
        assert_eq!(entry.summary.as_deref(), Some("Real body"));
    }

    #[test]
    fn test_parse_atom_prefers_alternate_link() {
        let doc = parse_feed(ATOM.as_bytes()).unwrap();
        assert_eq!(doc.title.as_deref(), Some("Schneier on Security"));
        assert_eq!(doc.entries.len(), 2);
        assert_eq!(
            doc.entries[0].link.as_deref(),
            Some("https://www.schneier.com/blog/archives/2025/05/one.html")
        );
        assert_eq!(
            doc.entries[0].published.as_deref(),
            Some("2025-05-06T10:00:00+00:00")
        );
        assert_eq!(
            doc.entries[0].summary.as_deref(),
            Some("First summary spanning lines")
        );
        assert_eq!(
            doc.entries[1].published.as_deref(),
            Some("2025-05-05T09:00:00+00:00")
        );
    }

    #[test]
    fn test_parse_rdf_items_outside_channel() {
        let doc = parse_feed(RDF.as_bytes()).unwrap();
        assert_eq!(doc.title.as_deref(), Some("RDF Example"));
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.entries[0].link.as_deref(), Some("https://example.org/a"));
    }

    #[test]
    fn test_parse_rejects_html() {
        let html = "<html><head><title>403 Forbidden</title></head><body></body></html>";
        assert!(parse_feed(html.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_rejects_non_xml() {
        assert!(parse_feed(b"service unavailable").is_err());
    }

    #[test]
    fn test_parse_empty_channel() {
        let doc = parse_feed(
            br#"<rss version="2.0"><channel><title>Empty</title></channel></rss>"#,
        )
        .unwrap();
        assert_eq!(doc.title.as_deref(), Some("Empty"));
        assert!(doc.entries.is_empty());
    }
}
