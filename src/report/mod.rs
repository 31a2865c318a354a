// src/report/mod.rs
// =============================================================================
// This module writes crawl results out.
//
// Two destinations:
// - stdout: a human-readable table or pretty JSON (--json)
// - a result file: one JSON document per crawl, appended so earlier runs at
//   the same path are kept
//
// The JSON shape is {"wordCounts": {...}, "urlsVisited": n} with the word map
// in rank order.
// =============================================================================

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::crawl::CrawlReport;

// Prints the report either as a table or JSON
//
// Parameters:
//   report: the finished crawl report
//   json: whether to output JSON format
pub fn print_results(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print_table(report);
    }
    Ok(())
}

// Prints the report as a human-readable table in the terminal
fn print_table(report: &CrawlReport) {
    println!("{:<40} {:>10}", "WORD", "COUNT");
    println!("{}", "=".repeat(51));

    for (word, count) in &report.word_counts {
        // Truncate very long words so the table stays aligned
        let word_display = if word.len() > 37 {
            format!("{}...", &word[..37])
        } else {
            word.clone()
        };
        println!("{:<40} {:>10}", word_display, count);
    }

    println!();
    println!("📊 Summary:");
    println!("   🔤 Popular words: {}", report.word_counts.len());
    println!("   📄 Pages visited: {}", report.urls_visited);
}

// Appends the report as one JSON line to the given file
//
// Pre-existing content at the path is kept; the file is created when absent.
pub fn append_json(report: &CrawlReport, path: &Path) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open result file {}", path.display()))?;

    serde_json::to_writer(&mut file, report)?;
    writeln!(file)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn report() -> CrawlReport {
        CrawlReport {
            word_counts: vec![("the".to_string(), 10), ("crab".to_string(), 4)],
            urls_visited: 3,
        }
    }

    #[test]
    fn test_append_json_keeps_earlier_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawl-results.json");

        append_json(&report(), &path).unwrap();
        append_json(&report(), &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"wordCounts":{"the":10,"crab":4},"urlsVisited":3}"#
        );
        assert_eq!(lines[0], lines[1]);
    }

    #[test]
    fn test_append_json_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.json");

        append_json(&report(), &path).unwrap();
        assert!(path.exists());
    }
}
