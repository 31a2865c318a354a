// src/crawl/tally.rs
// =============================================================================
// This module accumulates word counts across every crawled page.
//
// All tasks merge into one shared tally. The merge is a per-word sum, which is
// commutative and associative, so the final totals come out the same no matter
// how the concurrent merges interleave.
// =============================================================================

use dashmap::DashMap;
use std::collections::HashMap;

// The shared word -> count accumulator for one crawl
#[derive(Debug, Default)]
pub struct WordTally {
    counts: DashMap<String, u64>,
}

impl WordTally {
    pub fn new() -> Self {
        Self {
            counts: DashMap::new(),
        }
    }

    // Merges one page's word counts into the shared tally
    //
    // Each word is incremented atomically, so concurrent merges never lose
    // an update.
    pub fn merge(&self, page_counts: HashMap<String, u64>) {
        for (word, count) in page_counts {
            *self.counts.entry(word).or_insert(0) += count;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    // Copies the current totals into a plain map for ranking
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}
