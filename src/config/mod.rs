// src/config/mod.rs
// =============================================================================
// This module loads crawl configuration from a JSON file.
//
// The file uses camelCase keys, for example:
//
//   {
//     "startPages": ["https://example.com"],
//     "ignoredUrls": [".*\\.pdf$"],
//     "maxDepth": 2,
//     "timeoutSeconds": 10,
//     "parallelism": 8,
//     "popularWordCount": 10,
//     "resultPath": "crawl-results.json",
//     "profileOutputPath": "profile-data.txt"
//   }
//
// Every key is optional; missing keys fall back to defaults. Ignore patterns
// are compiled up front so a bad regex fails at load time, not mid-crawl.
// =============================================================================

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::crawl::CrawlOptions;

// The crawl configuration as it appears on disk
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlerConfig {
    /// Locators the crawl starts from
    pub start_pages: Vec<String>,
    /// Regex patterns for locators that must not be crawled
    pub ignored_urls: Vec<String>,
    /// How many link hops from a start page may be followed
    pub max_depth: usize,
    /// Wall-clock bound for the whole crawl, in seconds
    pub timeout_seconds: u64,
    /// Requested parallelism (clamped to the hardware at crawl time)
    pub parallelism: usize,
    /// How many of the most popular words the result keeps
    pub popular_word_count: usize,
    /// Where to append the crawl result as JSON (optional)
    pub result_path: Option<PathBuf>,
    /// Where to append the profiling report (optional; enables profiling)
    pub profile_output_path: Option<PathBuf>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_pages: Vec::new(),
            ignored_urls: Vec::new(),
            max_depth: 1,
            timeout_seconds: 10,
            parallelism: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            popular_word_count: 10,
            result_path: None,
            profile_output_path: None,
        }
    }
}

impl CrawlerConfig {
    // Turns the on-disk configuration into crawl options
    //
    // Fails if any ignore pattern is not a valid regex.
    pub fn crawl_options(&self) -> Result<CrawlOptions> {
        let ignored = IgnorePatterns::compile(&self.ignored_urls)
            .context("invalid pattern in ignoredUrls")?;

        Ok(CrawlOptions {
            max_depth: self.max_depth,
            timeout: Duration::from_secs(self.timeout_seconds),
            parallelism: self.parallelism,
            popular_word_count: self.popular_word_count,
            ignored,
        })
    }
}

// Loads configuration from a JSON file
pub fn load(path: &Path) -> Result<CrawlerConfig> {
    let file = File::open(path)
        .with_context(|| format!("failed to open config file {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

// The compiled ignore-pattern list
//
// A pattern must match the whole locator, the same way the configuration file
// has always been interpreted.
#[derive(Debug, Clone, Default)]
pub struct IgnorePatterns {
    patterns: Vec<Regex>,
}

impl IgnorePatterns {
    // Compiles the pattern sources, anchoring each to the full locator
    pub fn compile(sources: &[String]) -> Result<Self, regex::Error> {
        let patterns = sources
            .iter()
            .map(|source| Regex::new(&format!("^(?:{})$", source)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    // True when the locator matches any ignore pattern
    pub fn matches(&self, locator: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(locator))
    }
}
