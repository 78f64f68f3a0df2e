//! Crawl-level error types
//!
//! Directory, parameter and fetch errors abort a crawl before or during the
//! fetch. Persistence kinds are scoped to a single listing and are collected
//! into the crawl report instead of aborting sibling writes.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrawlError {
    #[error("Failed to create output directory {path}: {reason}")]
    DirectoryCreationFailed { path: String, reason: String },

    #[error("Parameter is not valid: '{input}'")]
    InvalidParameter { input: String },

    #[error("Failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Failed to serialize listing '{identifier}': {reason}")]
    SerializationFailed { identifier: String, reason: String },

    #[error("Failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Persistence task for listing '{identifier}' did not complete: {reason}")]
    TaskFailed { identifier: String, reason: String },
}

impl CrawlError {
    /// Create an invalid parameter error carrying the rejected input
    pub fn invalid_parameter(input: &str) -> Self {
        Self::InvalidParameter {
            input: input.to_string(),
        }
    }
}

pub type CrawlResult<T> = Result<T, CrawlError>;
