// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "crawl-tally",
    version = "0.1.0",
    about = "A CLI tool to crawl websites in parallel and tally the most popular words",
    long_about = "crawl-tally crawls every page reachable from a set of starting URLs, up to a \
                  configurable depth, and reports the most popular words across all of them \
                  together with how many distinct pages were visited."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

// This enum defines our subcommands (config, site)
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a crawl described by a JSON configuration file
    ///
    /// Example: crawl-tally config crawl.json
    Config {
        /// Path to the JSON configuration file
        config_path: PathBuf,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Crawl a single website from command-line flags
    ///
    /// Example: crawl-tally site https://example.com --max-depth 2 --top 20
    Site {
        /// Website URL to start crawling from
        website_url: String,

        /// Maximum crawl depth (1 = just the starting page)
        #[arg(long, default_value_t = 1)]
        max_depth: usize,

        /// How many of the most popular words to keep
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Wall-clock bound for the whole crawl, in seconds
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,

        /// Maximum number of pages parsed at once
        #[arg(long, default_value_t = 8)]
        parallelism: usize,

        /// Regex pattern for URLs to skip (repeatable)
        #[arg(long = "ignore")]
        ignored: Vec<String>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        /// Append the crawl result to this file as JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Time page parsing and print a profiling report afterwards
        #[arg(long)]
        profile: bool,
    },
}
