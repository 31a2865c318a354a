// src/parser/mod.rs
// =============================================================================
// This module defines the page-parsing capability the crawl engine depends on.
//
// Submodules:
// - html: Fetches a page over HTTP and parses words and links out of the HTML
//
// The engine only sees the PageParser trait. A parser is stateless and safe to
// call from many tasks at once; a failing page is reported as an error so the
// owning crawl branch can skip it without aborting the crawl.
// =============================================================================

mod html;

pub use html::HtmlPageParser;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

// What parsing a single page produces: the page's own word counts plus the
// outbound locators found on it, in document order
#[derive(Debug, Clone, Default)]
pub struct PageData {
    pub word_counts: HashMap<String, u64>,
    pub links: Vec<String>,
}

// Errors a parser can report for a single page
#[derive(Debug, Error)]
pub enum ParseError {
    /// The request itself failed (connection, DNS, timeout, ...)
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

// The page-parsing capability
//
// Given a locator, produce the word counts for that single page and the list
// of outbound locators found on it.
#[async_trait]
pub trait PageParser: Send + Sync {
    async fn parse(&self, locator: &str) -> Result<PageData, ParseError>;
}
