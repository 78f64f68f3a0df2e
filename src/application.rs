//! Application layer module
//!
//! Use cases that orchestrate the domain logic over the infrastructure.

pub mod listing_crawler;

pub use listing_crawler::{CrawlReport, CrawlSettings, ListingCrawler, PersistOutcome};
