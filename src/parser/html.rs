// src/parser/html.rs
// =============================================================================
// This module implements the page-parsing capability over real HTTP.
//
// How it works:
// 1. Fetch the page with a shared reqwest client
// 2. Parse the HTML with the scraper crate
// 3. Count the words in the visible text (script/style content is skipped)
// 4. Collect all <a href> targets, resolved to absolute http(s) URLs
//
// Words are lowercased runs of alphanumeric characters, so "Rust," and "rust"
// tally as the same word.
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Node, Selector};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use super::{PageData, PageParser, ParseError};

// Parses pages fetched over HTTP
#[derive(Debug, Clone)]
pub struct HtmlPageParser {
    client: Client,
}

impl HtmlPageParser {
    // Creates a parser with its own HTTP client
    //
    // The client is reused for every request (connection pooling), with the
    // given per-request timeout.
    pub fn new(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> Result<String, ParseError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ParseError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ParseError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| ParseError::Fetch {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl PageParser for HtmlPageParser {
    async fn parse(&self, locator: &str) -> Result<PageData, ParseError> {
        let html = self.fetch(locator).await?;
        Ok(PageData {
            word_counts: count_words(&html),
            links: extract_links(&html, locator),
        })
    }
}

// Counts the words in the visible text of an HTML document
//
// Parameters:
//   html: the HTML content to parse
//
// Returns: word -> occurrence count for this single page
fn count_words(html: &str) -> HashMap<String, u64> {
    let document = Html::parse_document(html);
    let mut counts = HashMap::new();

    for node in document.tree.nodes() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        // Skip text that lives inside <script> or <style>
        let inside_non_visible = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .map(|element| matches!(element.name(), "script" | "style"))
            .unwrap_or(false);
        if inside_non_visible {
            continue;
        }

        for token in text.split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            *counts.entry(token.to_lowercase()).or_insert(0) += 1;
        }
    }

    counts
}

// Extracts all outbound links from HTML content
//
// Parameters:
//   html: the HTML content to parse
//   base_url: the URL of the current page (for resolving relative links)
//
// Returns: Vec of absolute http(s) URLs in document order
fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    let mut links = Vec::new();

    let document = Html::parse_document(html);

    // The selector is a constant and known to be valid
    let selector = Selector::parse("a[href]").unwrap();

    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(_) => {
            // Without a valid base we cannot resolve relative links
            return links;
        }
    };

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(absolute_url) = resolve_url(&base, href) {
                if is_crawlable_link(&absolute_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

// Resolves a possibly-relative URL to an absolute URL
//
// Returns: Some(absolute_url) or None if the href cannot be resolved
fn resolve_url(base: &Url, href: &str) -> Option<String> {
    match Url::parse(href) {
        Ok(url) => Some(url.to_string()),
        Err(_) => base.join(href).map(|url| url.to_string()).ok(),
    }
}

// Only http(s) targets are worth crawling; mailto:, tel:, javascript: and
// data: links are skipped
fn is_crawlable_link(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
