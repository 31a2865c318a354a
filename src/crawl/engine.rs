// src/crawl/engine.rs
// =============================================================================
// This module orchestrates a whole crawl.
//
// The engine owns the configuration and the page parser. For each crawl
// invocation it:
// 1. Short-circuits to an empty report when there are no starting locators
// 2. Creates the shared registry, tally, deadline and parallelism gate
// 3. Runs one root task per starting locator concurrently
// 4. Waits for the fork/join tree, bounded by the configured timeout
// 5. Ranks the accumulated counts and reports them with the visited total
//
// A timeout is not an error: whatever was merged before the deadline becomes
// a partial, valid result.
// =============================================================================

use futures::future::join_all;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

use super::ranking::rank;
use super::tally::WordTally;
use super::task::{CrawlContext, CrawlTask};
use super::visited::VisitedRegistry;
use crate::config::IgnorePatterns;
use crate::parser::PageParser;

// Everything a crawl invocation is configured with
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// How many link hops from a starting locator may be followed
    pub max_depth: usize,
    /// Wall-clock bound for the whole crawl
    pub timeout: Duration,
    /// Requested parallelism; clamped to the hardware at crawl time
    pub parallelism: usize,
    /// How many of the most popular words the result keeps
    pub popular_word_count: usize,
    /// Locators matching any of these patterns are never crawled
    pub ignored: IgnorePatterns,
}

// The immutable outcome of one crawl invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// The top words in rank order
    pub word_counts: Vec<(String, u64)>,
    /// How many distinct locators were visited
    pub urls_visited: usize,
}

impl CrawlReport {
    pub fn empty() -> Self {
        Self {
            word_counts: Vec::new(),
            urls_visited: 0,
        }
    }
}

// Serialized as {"wordCounts": {...}, "urlsVisited": n} with the word map
// emitted in rank order
impl Serialize for CrawlReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct RankedCounts<'a>(&'a [(String, u64)]);

        impl Serialize for RankedCounts<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (word, count) in self.0 {
                    map.serialize_entry(word, count)?;
                }
                map.end()
            }
        }

        let mut state = serializer.serialize_struct("CrawlReport", 2)?;
        state.serialize_field("wordCounts", &RankedCounts(&self.word_counts))?;
        state.serialize_field("urlsVisited", &self.urls_visited)?;
        state.end()
    }
}

// Runs crawls against a page parser
pub struct CrawlEngine {
    parser: Arc<dyn PageParser>,
    options: CrawlOptions,
}

impl CrawlEngine {
    pub fn new(parser: Arc<dyn PageParser>, options: CrawlOptions) -> Self {
        Self { parser, options }
    }

    // The configured parallelism clamped to the hardware, never below 1
    fn effective_parallelism(&self) -> usize {
        let hardware = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.options.parallelism.min(hardware).max(1)
    }

    // Crawls everything reachable from the starting locators
    //
    // Parameters:
    //   starting_locators: the root locators, one task each
    //
    // Returns: the ranked word counts and the distinct visited total
    pub async fn crawl(&self, starting_locators: &[String]) -> CrawlReport {
        if starting_locators.is_empty() {
            return CrawlReport::empty();
        }

        let parallelism = self.effective_parallelism();
        info!(
            parallelism,
            max_depth = self.options.max_depth,
            timeout_ms = self.options.timeout.as_millis() as u64,
            roots = starting_locators.len(),
            "starting crawl"
        );

        let ctx = Arc::new(CrawlContext {
            visited: VisitedRegistry::new(),
            tally: WordTally::new(),
            ignored: self.options.ignored.clone(),
            parser: Arc::clone(&self.parser),
            deadline: Instant::now() + self.options.timeout,
            gate: Semaphore::new(parallelism),
        });

        let roots = starting_locators.iter().map(|locator| {
            CrawlTask::new(locator.clone(), self.options.max_depth, Arc::clone(&ctx)).run()
        });

        // Tasks check the deadline themselves; the timeout here is the hard
        // stop for anything still stuck inside a fetch when it expires
        if tokio::time::timeout(self.options.timeout, join_all(roots))
            .await
            .is_err()
        {
            info!("crawl deadline reached, keeping partial results");
        }

        let counts = ctx.tally.snapshot();
        let word_counts = if counts.is_empty() {
            Vec::new()
        } else {
            rank(&counts, self.options.popular_word_count)
        };

        let urls_visited = ctx.visited.len();
        info!(
            urls_visited,
            distinct_words = counts.len(),
            "crawl finished"
        );

        CrawlReport {
            word_counts,
            urls_visited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{PageData, PageParser, ParseError};
    use async_trait::async_trait;
    use std::collections::HashMap;

    // An in-memory page graph; any locator not in the graph fails to parse
    struct StubParser {
        pages: HashMap<String, PageData>,
    }

    impl StubParser {
        fn new(pages: &[(&str, &[(&str, u64)], &[&str])]) -> Self {
            let pages = pages
                .iter()
                .map(|(locator, words, links)| {
                    (
                        locator.to_string(),
                        PageData {
                            word_counts: words
                                .iter()
                                .map(|(w, c)| (w.to_string(), *c))
                                .collect(),
                            links: links.iter().map(|l| l.to_string()).collect(),
                        },
                    )
                })
                .collect();
            Self { pages }
        }
    }

    #[async_trait]
    impl PageParser for StubParser {
        async fn parse(&self, locator: &str) -> Result<PageData, ParseError> {
            self.pages
                .get(locator)
                .cloned()
                .ok_or_else(|| ParseError::Status {
                    url: locator.to_string(),
                    status: 404,
                })
        }
    }

    // A parser that stalls forever on designated locators
    struct SlowParser {
        inner: StubParser,
        slow: Vec<String>,
    }

    #[async_trait]
    impl PageParser for SlowParser {
        async fn parse(&self, locator: &str) -> Result<PageData, ParseError> {
            if self.slow.iter().any(|s| s == locator) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            self.inner.parse(locator).await
        }
    }

    fn options(max_depth: usize, top: usize) -> CrawlOptions {
        CrawlOptions {
            max_depth,
            timeout: Duration::from_secs(5),
            parallelism: 4,
            popular_word_count: top,
            ignored: IgnorePatterns::default(),
        }
    }

    fn engine(parser: impl PageParser + 'static, options: CrawlOptions) -> CrawlEngine {
        CrawlEngine::new(Arc::new(parser), options)
    }

    fn starts(locators: &[&str]) -> Vec<String> {
        locators.iter().map(|l| l.to_string()).collect()
    }

    #[tokio::test]
    async fn test_reference_graph() {
        // A links to B and C; B and C each say "y" once
        let parser = StubParser::new(&[
            ("A", &[("x", 1)], &["B", "C"]),
            ("B", &[("y", 1)], &[]),
            ("C", &[("y", 1)], &[]),
        ]);

        let report = engine(parser, options(2, 10)).crawl(&starts(&["A"])).await;

        assert_eq!(report.urls_visited, 3);
        assert_eq!(
            report.word_counts,
            vec![("y".to_string(), 2), ("x".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_empty_start_list_schedules_nothing() {
        let parser = StubParser::new(&[("A", &[("x", 1)], &[])]);
        let report = engine(parser, options(2, 10)).crawl(&[]).await;
        assert_eq!(report, CrawlReport::empty());
    }

    #[tokio::test]
    async fn test_depth_zero_yields_empty_report() {
        let parser = StubParser::new(&[("A", &[("x", 1)], &[])]);
        let report = engine(parser, options(0, 10)).crawl(&starts(&["A"])).await;
        assert_eq!(report, CrawlReport::empty());
    }

    #[tokio::test]
    async fn test_diamond_counts_shared_page_once() {
        // B and C both link to D; D's words must tally exactly once
        let parser = StubParser::new(&[
            ("A", &[], &["B", "C"]),
            ("B", &[], &["D"]),
            ("C", &[], &["D"]),
            ("D", &[("z", 1)], &[]),
        ]);

        let report = engine(parser, options(3, 10)).crawl(&starts(&["A"])).await;

        assert_eq!(report.urls_visited, 4);
        assert_eq!(report.word_counts, vec![("z".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_ignored_locator_is_neither_visited_nor_counted() {
        let parser = StubParser::new(&[
            ("A", &[("x", 1)], &["https://example.com/private/B"]),
            ("https://example.com/private/B", &[("secret", 9)], &[]),
        ]);

        let mut opts = options(2, 10);
        opts.ignored = IgnorePatterns::compile(&[".*/private/.*".to_string()]).unwrap();

        let report = engine(parser, opts).crawl(&starts(&["A"])).await;

        assert_eq!(report.urls_visited, 1);
        assert_eq!(report.word_counts, vec![("x".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_failing_page_is_isolated() {
        // "missing" is not in the graph, so it parses with an error
        let parser = StubParser::new(&[
            ("A", &[("x", 1)], &["missing", "B"]),
            ("B", &[("y", 1)], &[]),
        ]);

        let report = engine(parser, options(2, 10)).crawl(&starts(&["A"])).await;

        // The failed page is claimed in the registry but contributes no words
        assert_eq!(report.urls_visited, 3);
        let counts: HashMap<_, _> = report.word_counts.into_iter().collect();
        assert_eq!(counts.get("x"), Some(&1));
        assert_eq!(counts.get("y"), Some(&1));
    }

    #[tokio::test]
    async fn test_multiple_roots_share_one_registry() {
        let parser = StubParser::new(&[
            ("A", &[("x", 1)], &["C"]),
            ("B", &[("x", 1)], &["C"]),
            ("C", &[("y", 1)], &[]),
        ]);

        let report = engine(parser, options(2, 10))
            .crawl(&starts(&["A", "B"]))
            .await;

        assert_eq!(report.urls_visited, 3);
        let counts: HashMap<_, _> = report.word_counts.into_iter().collect();
        assert_eq!(counts.get("x"), Some(&2));
        assert_eq!(counts.get("y"), Some(&1));
    }

    #[tokio::test]
    async fn test_popular_word_count_trims_result() {
        let parser = StubParser::new(&[("A", &[("x", 3), ("y", 2), ("z", 1)], &[])]);

        let report = engine(parser, options(1, 2)).crawl(&starts(&["A"])).await;

        assert_eq!(
            report.word_counts,
            vec![("x".to_string(), 3), ("y".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn test_timeout_returns_partial_result() {
        let parser = SlowParser {
            inner: StubParser::new(&[
                ("A", &[("x", 1)], &["B"]),
                ("B", &[("y", 1)], &[]),
            ]),
            slow: vec!["B".to_string()],
        };

        let mut opts = options(2, 10);
        opts.timeout = Duration::from_millis(250);

        let started = Instant::now();
        let report = engine(parser, opts).crawl(&starts(&["A"])).await;

        // The crawl comes back around the deadline with A's words kept
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(report.word_counts, vec![("x".to_string(), 1)]);
    }

    #[test]
    fn test_report_serializes_in_rank_order() {
        let report = CrawlReport {
            word_counts: vec![("the".to_string(), 10), ("crab".to_string(), 4)],
            urls_visited: 3,
        };

        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"wordCounts":{"the":10,"crab":4},"urlsVisited":3}"#);
    }
}
