//! eBay listing scraper
//!
//! Fetches a seller's search results page, keeps the listings whose condition
//! matches a filter, and writes each one to its own JSON file.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{CrawlReport, ListingCrawler};
pub use domain::{ConditionFilter, CrawlError, Listing, normalize_condition};
