//! Feed reading: fetch a syndication source and turn it into entries.
//!
//! # Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`parser`] | RSS 2.0 / RSS 1.0 / Atom parsing with `feed-rs` |
//! | [`reader`] | [`HttpFeedReader`](reader::HttpFeedReader) and the test-mode [`CannedFeedReader`](reader::CannedFeedReader) |
//!
//! A reader returns the whole feed in native order on every call. It does
//! not retry: a source that fails is simply absent from the run.

pub mod parser;
pub mod reader;

use crate::models::FeedDocument;
use std::error::Error;

/// A source of syndicated entries.
pub trait FeedReader {
    /// Fetch and parse the feed at `url`. Each call is a fresh fetch.
    async fn read(&self, url: &str) -> Result<FeedDocument, Box<dyn Error>>;
}
