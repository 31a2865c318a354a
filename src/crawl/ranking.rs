// src/crawl/ranking.rs
// =============================================================================
// This module ranks the tallied words and keeps the most popular ones.
//
// Ordering rules:
// 1. Higher count first
// 2. Ties broken by longer word first
// 3. Remaining ties broken alphabetically
//
// The function is pure: it borrows the counts, never mutates them, and always
// produces the same output for the same input.
// =============================================================================

use std::collections::HashMap;

// Ranks word counts and keeps the top `n` entries
//
// Parameters:
//   counts: the accumulated word -> count mapping
//   n: how many of the most popular words to keep
//
// Returns: Vec of (word, count) pairs in rank order, at most `n` long
// (fewer if the input has fewer distinct words; empty when n == 0)
pub fn rank(counts: &HashMap<String, u64>, n: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = counts
        .iter()
        .map(|(word, count)| (word.clone(), *count))
        .collect();

    entries.sort_by(|(a_word, a_count), (b_word, b_count)| {
        b_count
            .cmp(a_count)
            .then_with(|| b_word.len().cmp(&a_word.len()))
            .then_with(|| a_word.cmp(b_word))
    });

    entries.truncate(n);
    entries
}
