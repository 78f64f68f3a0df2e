use serde::{Deserialize, Serialize};

use crate::infrastructure::config::ebay;

/// One product listing scraped from a search results page.
///
/// Fields are serialized in declaration order, which is also the on-disk order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(rename = "id")]
    identifier: String,
    title: String,
    url: String,
    condition: String,
}

impl Listing {
    /// Build a listing, deriving its identifier from `url` against the default item prefix
    pub fn new(title: String, url: String, condition: String) -> Self {
        Self::with_item_prefix(title, url, condition, ebay::ITEM_URL_PREFIX)
    }

    /// Build a listing, deriving its identifier from `url` against `item_prefix`
    pub fn with_item_prefix(title: String, url: String, condition: String, item_prefix: &str) -> Self {
        let identifier = derive_identifier(&url, item_prefix);
        Self {
            identifier,
            title,
            url,
            condition,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw condition label as printed on the page
    pub fn condition(&self) -> &str {
        &self.condition
    }
}

/// Strip `item_prefix` from `url` and cut at the first `?`.
///
/// Returns an empty string when `url` does not start with the prefix.
pub fn derive_identifier(url: &str, item_prefix: &str) -> String {
    match url.strip_prefix(item_prefix) {
        Some(rest) => rest.split('?').next().unwrap_or_default().to_string(),
        None => String::new(),
    }
}
