// src/crawl/visited.rs
// =============================================================================
// This module tracks which locators have already been crawled.
//
// The registry is shared by every task in a crawl, so the check and the insert
// must happen as one atomic step: when two branches race for the same locator,
// exactly one of them may win the right to crawl it.
//
// Lifetime: created empty when a crawl starts, discarded when it completes.
// =============================================================================

use dashmap::DashSet;

// A thread-safe set of visited locators
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    locators: DashSet<String>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self {
            locators: DashSet::new(),
        }
    }

    // Atomically records the locator if it has not been seen before
    //
    // Returns: true iff the locator was absent and is now recorded.
    // Two concurrent calls with the same locator never both get true.
    pub fn try_visit(&self, locator: &str) -> bool {
        self.locators.insert(locator.to_string())
    }

    // Number of distinct locators recorded so far
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }
}
