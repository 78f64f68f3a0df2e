//! Search results parser
//!
//! Extraction runs as an explicit pipeline: the document is searched for the
//! results container, every item node inside it becomes a candidate, and each
//! candidate is mapped to one [`Listing`]. Missing sub-elements produce empty
//! fields rather than errors, so a malformed item never aborts the page.

#![allow(clippy::uninlined_format_args)]

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{ContextualParser, ParseContext, ParsingError, ParsingResult};
use crate::domain::Listing;
use crate::infrastructure::config::ListingSelectors;

/// Parser for extracting listings from a search results page
#[derive(Debug)]
pub struct ListingListParser {
    container_selector: Selector,
    item_selector: Selector,
    title_selector: Selector,
    link_selector: Selector,
    condition_selector: Selector,
}

impl ListingListParser {
    /// Create a new parser with the default eBay selectors
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ListingSelectors::default())
    }

    /// Create parser with custom selector configuration
    pub fn with_config(selectors: &ListingSelectors) -> ParsingResult<Self> {
        Ok(Self {
            container_selector: Self::compile_selector("results_container", &selectors.results_container)?,
            item_selector: Self::compile_selector("item", &selectors.item)?,
            title_selector: Self::compile_selector("title", &selectors.title)?,
            link_selector: Self::compile_selector("link", &selectors.link)?,
            condition_selector: Self::compile_selector("condition", &selectors.condition)?,
        })
    }

    fn compile_selector(field: &str, selector: &str) -> ParsingResult<Selector> {
        if selector.trim().is_empty() {
            return Err(ParsingError::configuration(field, "selector must not be empty"));
        }
        Selector::parse(selector)
            .map_err(|e| ParsingError::invalid_selector(field, selector, &e.to_string()))
    }

    /// Every item node found inside the results container(s).
    ///
    /// A page without the container yields no candidates.
    pub fn candidate_nodes<'a>(&self, html: &'a Html) -> Vec<ElementRef<'a>> {
        html.select(&self.container_selector)
            .flat_map(|container| container.select(&self.item_selector))
            .collect()
    }

    /// Map one item node to a listing
    pub fn extract_listing(&self, item: &ElementRef, context: &ParseContext) -> Listing {
        let title = Self::child_text(item, &self.title_selector);
        let url = Self::child_attr(item, &self.link_selector, "href");
        let condition = Self::child_text(item, &self.condition_selector);

        Listing::with_item_prefix(title, url, condition, &context.item_url_prefix)
    }

    /// Concatenated text of every matching descendant, trimmed
    fn child_text(element: &ElementRef, selector: &Selector) -> String {
        element
            .select(selector)
            .flat_map(|e| e.text())
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Attribute of the first matching descendant that carries it
    fn child_attr(element: &ElementRef, selector: &Selector, attr: &str) -> String {
        element
            .select(selector)
            .find_map(|e| e.value().attr(attr))
            .unwrap_or_default()
            .to_string()
    }
}

impl ContextualParser for ListingListParser {
    type Output = Vec<Listing>;
    type Context = ParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> Self::Output {
        let candidates = self.candidate_nodes(html);
        debug!("Found {} candidate items on {}", candidates.len(), context.page_url);

        let listings: Vec<Listing> = candidates
            .iter()
            .map(|item| self.extract_listing(item, context))
            .collect();

        debug!("Extracted {} listings from {}", listings.len(), context.page_url);
        listings
    }
}
