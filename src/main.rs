use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, warn};

use ebay_listing_scraper_lib::application::ListingCrawler;
use ebay_listing_scraper_lib::infrastructure::{
    AppConfig, ConfigManager, bootstrap_dispatch, init_logging_with_config,
};

#[derive(Parser, Debug)]
#[command(
    name = "ebay-listing-scraper",
    about = "Scrape an eBay seller's listings and save the ones matching a condition"
)]
struct Cli {
    /// Condition to keep: new, brand new, nuevo, totalmente nuevo, open box,
    /// caja abierta, de segunda mano, usado, pre-owned, used. Empty keeps all.
    #[arg(default_value = "")]
    condition: String,

    /// Directory receiving one JSON file per listing.
    #[arg(long, env = "EBAY_SCRAPER_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Search results page to scrape.
    #[arg(long, env = "EBAY_SCRAPER_URL")]
    url: Option<String>,

    /// Configuration file; defaults to the per-user config directory.
    #[arg(long, env = "EBAY_SCRAPER_CONFIG")]
    config: Option<PathBuf>,

    /// Log level override (error, warn, info, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

async fn load_config(cli: &Cli) -> Result<AppConfig> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut config = manager.load_config().await?;

    if let Some(dir) = &cli.output_dir {
        config.scraper.output_dir = dir.clone();
    }
    if let Some(url) = &cli.url {
        config.scraper.target_url = url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<bool> {
    // Configuration warnings go to the console until the configured subscriber exists
    let config = {
        let _bootstrap = tracing::dispatcher::set_default(&bootstrap_dispatch());
        load_config(&cli).await?
    };
    init_logging_with_config(config.logging.clone())?;

    let crawler = ListingCrawler::from_config(&config).context("Failed to set up crawler")?;
    let report = crawler.crawl(&cli.condition).await?;

    for (identifier, err) in report.failures() {
        warn!("Listing '{}' failed: {}", identifier, err);
    }

    println!(
        "{} listings found, {} matched '{}', {} saved to {}",
        report.extracted,
        report.accepted,
        report.filter,
        report.saved_count(),
        crawler.settings().output_dir.display()
    );

    Ok(report.failed_count() == 0)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
