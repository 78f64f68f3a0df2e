//! Parsing context for a single fetched page

/// Context information for parsing operations
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// URL the page was fetched from
    pub page_url: String,

    /// Listing URLs must start with this prefix to yield an identifier
    pub item_url_prefix: String,
}

impl ParseContext {
    /// Create new parse context
    pub fn new(page_url: impl Into<String>, item_url_prefix: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
            item_url_prefix: item_url_prefix.into(),
        }
    }
}

impl Default for ParseContext {
    fn default() -> Self {
        use crate::infrastructure::config::ebay;

        Self::new(ebay::SEARCH_PAGE_URL, ebay::ITEM_URL_PREFIX)
    }
}
