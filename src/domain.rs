//! Domain module - listings, condition filtering and crawl errors

pub mod condition;
pub mod errors;
pub mod listing;

pub use condition::{ConditionFilter, accepts, normalize_condition};
pub use errors::{CrawlError, CrawlResult};
pub use listing::Listing;
