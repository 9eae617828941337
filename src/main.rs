//! Sitegraph main entry point
//!
//! Command-line interface for the sitegraph crawler: crawls the given
//! address and prints the resulting site map.

use clap::Parser;
use sitegraph::crawler::{Crawler, CrawlerOptions};
use sitegraph::output::print_site_map;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Sitegraph: a concurrent site-graph crawler
#[derive(Parser, Debug)]
#[command(name = "sitegraph")]
#[command(version)]
#[command(about = "Crawl a website and map its pages, links, and assets", long_about = None)]
struct Cli {
    /// The address to be crawled
    #[arg(value_name = "ADDRESS")]
    address: String,

    /// Number of workers processing the crawled pages
    #[arg(short, long, default_value_t = 10)]
    workers: usize,

    /// Number of retries for each page
    #[arg(short, long, default_value_t = 2)]
    retries: u32,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!(
        "Params: (Address: {}), (Workers: {}), (Retries: {})",
        cli.address,
        cli.workers,
        cli.retries
    );

    let options = CrawlerOptions::new()
        .with_max_workers(cli.workers)
        .with_max_retries(cli.retries)
        .with_on_discover(Arc::new(|url| {
            tracing::info!("Crawling: {url}");
        }));

    let mut crawler = Crawler::with_options(&cli.address, options)?;
    let (done, mut errors) = crawler.start();

    tokio::spawn(async move {
        while let Some(err) = errors.recv().await {
            tracing::warn!("Error: {err}");
        }
    });

    let _ = done.await;

    println!("\nResults:\n");
    print_site_map(&crawler.site_map());

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitegraph=info,warn"),
            1 => EnvFilter::new("sitegraph=debug,info"),
            2 => EnvFilter::new("sitegraph=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
