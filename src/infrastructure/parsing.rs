//! HTML parsing infrastructure
//!
//! Trait-based parsing of fetched pages into listings.

pub mod context;
pub mod error;
pub mod listing_list_parser;

pub use context::ParseContext;
pub use error::{ParsingError, ParsingResult};
pub use listing_list_parser::ListingListParser;

use scraper::Html;

/// Parser that needs per-page context to produce its output
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse an already built document with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> Self::Output;

    /// Parse raw HTML text with contextual information
    fn parse_str_with_context(&self, body: &str, context: &Self::Context) -> Self::Output {
        let html = Html::parse_document(body);
        self.parse_with_context(&html, context)
    }
}
