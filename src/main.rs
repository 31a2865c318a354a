// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Dispatch to the appropriate subcommand handler
// 3. Run the crawl and print / write the results
// 4. Exit with proper code (0 = success, 2 = error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config/ - JSON configuration loading
mod crawl; // src/crawl/ - the parallel crawl engine
mod parser; // src/parser/ - the page-parsing capability
mod profiler; // src/profiler/ - call timing for designated operations
mod report; // src/report/ - result printing and file sinks

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use cli::{Cli, Commands};
use crawl::{CrawlEngine, CrawlOptions};
use parser::{HtmlPageParser, PageParser};
use profiler::Profiler;

#[tokio::main]
async fn main() {
    // Engine internals log through tracing; RUST_LOG controls what is shown
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = crawl completed
//   Err = unexpected error (reported as exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config { config_path, json } => handle_config_crawl(&config_path, json).await,
        Commands::Site {
            website_url,
            max_depth,
            top,
            timeout_secs,
            parallelism,
            ignored,
            json,
            output,
            profile,
        } => {
            let options = CrawlOptions {
                max_depth,
                timeout: Duration::from_secs(timeout_secs),
                parallelism,
                popular_word_count: top,
                ignored: config::IgnorePatterns::compile(&ignored)?,
            };
            run_crawl(
                &[website_url],
                options,
                json,
                output.as_deref(),
                None,
                profile,
            )
            .await
        }
    }
}

// Handles the 'config' subcommand
//
// Parameters:
//   config_path: path to the JSON configuration file
//   json: whether to output JSON format
async fn handle_config_crawl(config_path: &Path, json: bool) -> Result<i32> {
    println!("🔍 Loading configuration: {}", config_path.display());

    let config = config::load(config_path)?;
    let options = config.crawl_options()?;

    run_crawl(
        &config.start_pages,
        options,
        json,
        config.result_path.as_deref(),
        config.profile_output_path.as_deref(),
        false,
    )
    .await
}

// Runs one crawl end to end: parser, optional profiling, engine, sinks
//
// Parameters:
//   start_pages: the locators the crawl starts from
//   options: the crawl options (depth, timeout, parallelism, top-N, ignores)
//   json: whether stdout gets JSON instead of a table
//   result_path: where to append the result JSON, if anywhere
//   profile_path: where to append the profiling report, if anywhere
//   profile_stdout: whether to print the profiling report to stdout
async fn run_crawl(
    start_pages: &[String],
    options: CrawlOptions,
    json: bool,
    result_path: Option<&Path>,
    profile_path: Option<&Path>,
    profile_stdout: bool,
) -> Result<i32> {
    println!("🕸️  Crawling from {} starting page(s)...", start_pages.len());

    let profiling = profile_path.is_some() || profile_stdout;
    let profiler = Profiler::new();

    let html_parser = HtmlPageParser::new(Duration::from_secs(10))?;
    let page_parser: Arc<dyn PageParser> = if profiling {
        profiler.wrap_parser(html_parser)?
    } else {
        Arc::new(html_parser)
    };

    let engine = CrawlEngine::new(page_parser, options);
    let crawl_report = engine.crawl(start_pages).await;

    println!("📄 Visited {} page(s)\n", crawl_report.urls_visited);
    report::print_results(&crawl_report, json)?;

    if let Some(path) = result_path {
        report::append_json(&crawl_report, path)?;
        println!("💾 Result appended to {}", path.display());
    }

    if let Some(path) = profile_path {
        profiler.write_report_to(path)?;
        println!("⏱️  Profiling report appended to {}", path.display());
    }

    if profile_stdout {
        println!();
        let mut stdout = std::io::stdout();
        profiler.write_report(&mut stdout)?;
    }

    Ok(0)
}
