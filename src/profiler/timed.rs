// src/profiler/timed.rs
// =============================================================================
// This module decorates the page-parsing capability with timing.
//
// The decorator implements the same PageParser trait as the delegate it wraps.
// Its timed operation records wall-clock elapsed time into the shared
// profiling state on every exit path: a delegate error is handed back to the
// caller unchanged, after the duration has been recorded.
//
// Which operations are timed is a static marking on the capability, declared
// next to the decorator rather than discovered at runtime.
// =============================================================================

use async_trait::async_trait;
use std::time::Instant;

use super::{CapabilityProfile, OperationRecorder};
use crate::parser::{PageData, PageParser, ParseError};

// The PageParser capability marks its parse operation as timed
pub(crate) const PAGE_PARSER_PROFILE: CapabilityProfile = CapabilityProfile {
    interface: "PageParser",
    timed_operations: &["parse"],
};

// A PageParser that times every parse call of its delegate
pub struct TimedParser<P> {
    inner: P,
    /// Concrete type name of the delegate, used as the report key
    target: &'static str,
    recorder: OperationRecorder,
}

impl<P: PageParser> TimedParser<P> {
    pub(crate) fn new(inner: P, recorder: OperationRecorder) -> Self {
        Self {
            inner,
            target: std::any::type_name::<P>(),
            recorder,
        }
    }
}

#[async_trait]
impl<P: PageParser> PageParser for TimedParser<P> {
    async fn parse(&self, locator: &str) -> Result<PageData, ParseError> {
        let started = Instant::now();
        let result = self.inner.parse(locator).await;
        // Recorded whether the delegate succeeded or failed; the result then
        // passes through untouched
        self.recorder.record(self.target, "parse", started.elapsed());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::Profiler;
    use std::collections::HashMap;

    struct FixedParser;

    #[async_trait]
    impl PageParser for FixedParser {
        async fn parse(&self, _locator: &str) -> Result<PageData, ParseError> {
            Ok(PageData {
                word_counts: HashMap::from([("word".to_string(), 1)]),
                links: Vec::new(),
            })
        }
    }

    struct BrokenParser;

    #[async_trait]
    impl PageParser for BrokenParser {
        async fn parse(&self, locator: &str) -> Result<PageData, ParseError> {
            Err(ParseError::Status {
                url: locator.to_string(),
                status: 503,
            })
        }
    }

    #[tokio::test]
    async fn test_successful_call_is_timed_and_forwarded() {
        let profiler = Profiler::new();
        let wrapped = profiler.wrap_parser(FixedParser).unwrap();

        let page = wrapped.parse("https://example.com").await.unwrap();
        assert_eq!(page.word_counts.get("word"), Some(&1));

        let target = std::any::type_name::<FixedParser>();
        assert!(profiler.state().total_for(target, "parse").is_some());
    }

    #[tokio::test]
    async fn test_failed_call_is_timed_and_error_passes_through_unchanged() {
        let profiler = Profiler::new();
        let wrapped = profiler.wrap_parser(BrokenParser).unwrap();

        let error = wrapped.parse("https://example.com").await.unwrap_err();
        assert!(matches!(
            error,
            ParseError::Status { ref url, status: 503 } if url == "https://example.com"
        ));

        let target = std::any::type_name::<BrokenParser>();
        assert!(profiler.state().total_for(target, "parse").is_some());
    }

    #[tokio::test]
    async fn test_calls_accumulate_per_operation() {
        let profiler = Profiler::new();
        let wrapped = profiler.wrap_parser(FixedParser).unwrap();

        wrapped.parse("https://example.com/a").await.unwrap();
        wrapped.parse("https://example.com/b").await.unwrap();

        let target = std::any::type_name::<FixedParser>();
        let first = profiler.state().total_for(target, "parse").unwrap();
        wrapped.parse("https://example.com/c").await.unwrap();
        let second = profiler.state().total_for(target, "parse").unwrap();
        assert!(second >= first);
    }
}
