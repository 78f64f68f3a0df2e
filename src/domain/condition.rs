//! Listing condition filter
//!
//! Maps the locale variants eBay prints for an item condition (English and
//! Spanish storefronts) onto one canonical spelling that listings are compared
//! against.

use std::fmt;

use super::errors::{CrawlError, CrawlResult};

/// Normalize a user supplied condition to its canonical filter value.
///
/// The open box variants are returned exactly as given rather than folded to
/// one spelling. An empty input is the accept-all filter.
pub fn normalize_condition(input: &str) -> CrawlResult<String> {
    match input.to_lowercase().as_str() {
        "nuevo" | "totalmente nuevo" => Ok("totalmente nuevo".to_string()),
        "new" | "brand new" => Ok("brand new".to_string()),
        "open box" | "caja abierta" => Ok(input.to_string()),
        "de segunda mano" | "usado" => Ok("de segunda mano".to_string()),
        "pre-owned" | "used" => Ok("pre-owned".to_string()),
        "" => Ok(String::new()),
        _ => Err(CrawlError::invalid_parameter(input)),
    }
}

/// Case-insensitive condition match; an empty filter accepts every listing.
pub fn accepts(condition: &str, filter: &str) -> bool {
    filter.is_empty() || condition.to_lowercase() == filter.to_lowercase()
}

/// Canonical condition filter, fixed for the lifetime of one crawl
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConditionFilter {
    canonical: String,
}

impl ConditionFilter {
    pub fn parse(input: &str) -> CrawlResult<Self> {
        Ok(Self {
            canonical: normalize_condition(input)?,
        })
    }

    /// Filter that accepts every listing
    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    pub fn is_accept_all(&self) -> bool {
        self.canonical.is_empty()
    }

    pub fn accepts(&self, condition: &str) -> bool {
        accepts(condition, &self.canonical)
    }
}

impl fmt::Display for ConditionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_accept_all() {
            write!(f, "<all>")
        } else {
            write!(f, "{}", self.canonical)
        }
    }
}
