//! Crawl orchestration
//!
//! One crawl = ensure the output directory, normalize the condition, fetch the
//! target page once, extract listings, and persist every accepted listing on
//! its own task. `crawl` returns only after every spawned task has finished.

#![allow(clippy::uninlined_format_args)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::domain::{ConditionFilter, CrawlError, CrawlResult, Listing};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http_client::{HttpClient, HttpClientConfig, PageFetcher};
use crate::infrastructure::listing_store::{JsonFileWriter, ListingWriter};
use crate::infrastructure::parsing::{ContextualParser, ListingListParser, ParseContext};

/// Settings for a single crawl invocation
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub target_url: String,
    pub item_url_prefix: String,
    pub output_dir: PathBuf,
}

impl From<&AppConfig> for CrawlSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            target_url: config.scraper.target_url.clone(),
            item_url_prefix: config.scraper.item_url_prefix.clone(),
            output_dir: config.scraper.output_dir.clone(),
        }
    }
}

/// Outcome of one persistence task
#[derive(Debug, Clone)]
pub struct PersistOutcome {
    pub identifier: String,
    pub result: CrawlResult<PathBuf>,
}

/// What a crawl did; persistence failures are listed, not raised
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub page_url: String,
    pub filter: ConditionFilter,
    pub extracted: usize,
    pub accepted: usize,
    pub outcomes: Vec<PersistOutcome>,
    pub duration_ms: u64,
}

impl CrawlReport {
    pub fn saved_paths(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(PathBuf::as_path))
            .collect()
    }

    pub fn failures(&self) -> Vec<(&str, &CrawlError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.identifier.as_str(), e)))
            .collect()
    }

    pub fn saved_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.saved_count()
    }

    pub fn rejected(&self) -> usize {
        self.extracted - self.accepted
    }
}

/// Single-page listing crawler
pub struct ListingCrawler {
    settings: CrawlSettings,
    fetcher: Arc<dyn PageFetcher>,
    writer: Arc<dyn ListingWriter>,
    parser: Arc<ListingListParser>,
}

impl ListingCrawler {
    pub fn new(
        settings: CrawlSettings,
        fetcher: Arc<dyn PageFetcher>,
        writer: Arc<dyn ListingWriter>,
        parser: ListingListParser,
    ) -> Self {
        Self {
            settings,
            fetcher,
            writer,
            parser: Arc::new(parser),
        }
    }

    /// Wire the HTTP client, JSON writer and parser described by `config`
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let settings = CrawlSettings::from(config);
        let fetcher = HttpClient::new(HttpClientConfig::from(config.scraper.clone()))?;
        let writer = JsonFileWriter::new(settings.output_dir.clone());
        let parser = ListingListParser::with_config(&config.selectors)?;

        Ok(Self::new(settings, Arc::new(fetcher), Arc::new(writer), parser))
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Run one crawl filtered by `raw_condition` (empty accepts everything)
    pub async fn crawl(&self, raw_condition: &str) -> CrawlResult<CrawlReport> {
        let started = Instant::now();

        ensure_output_dir(&self.settings.output_dir).await?;
        let filter = ConditionFilter::parse(raw_condition)?;

        info!("Visiting {}", self.settings.target_url);
        let body = self.fetcher.fetch(&self.settings.target_url).await?;

        let listings = self.extract_listings(&body);
        let extracted = listings.len();

        let accepted: Vec<Listing> = listings
            .into_iter()
            .filter(|listing| filter.accepts(listing.condition()))
            .collect();
        debug!(
            "{} of {} listings match filter {}",
            accepted.len(),
            extracted,
            filter
        );

        let accepted_count = accepted.len();
        let outcomes = self.persist_all(accepted).await;

        let report = CrawlReport {
            page_url: self.settings.target_url.clone(),
            filter,
            extracted,
            accepted: accepted_count,
            outcomes,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        info!(
            "Crawl finished: {} extracted, {} accepted, {} saved, {} failed in {}ms",
            report.extracted,
            report.accepted,
            report.saved_count(),
            report.failed_count(),
            report.duration_ms
        );
        Ok(report)
    }

    /// Parse → candidate nodes → listings; the DOM never outlives this call
    fn extract_listings(&self, body: &str) -> Vec<Listing> {
        let context = ParseContext::new(
            self.settings.target_url.clone(),
            self.settings.item_url_prefix.clone(),
        );
        self.parser.parse_str_with_context(body, &context)
    }

    /// Spawn one task per listing and wait for all of them
    async fn persist_all(&self, listings: Vec<Listing>) -> Vec<PersistOutcome> {
        let mut identifiers = Vec::with_capacity(listings.len());
        let mut tasks = Vec::with_capacity(listings.len());

        for listing in listings {
            let writer = Arc::clone(&self.writer);
            identifiers.push(listing.identifier().to_string());
            tasks.push(tokio::spawn(async move { writer.persist(&listing).await }));
        }

        let results = futures::future::join_all(tasks).await;

        identifiers
            .into_iter()
            .zip(results)
            .map(|(identifier, joined)| {
                let result = match joined {
                    Ok(result) => result,
                    Err(e) => Err(CrawlError::TaskFailed {
                        identifier: identifier.clone(),
                        reason: e.to_string(),
                    }),
                };
                if let Err(e) = &result {
                    warn!("❌ Listing '{}' was not saved: {}", identifier, e);
                }
                PersistOutcome { identifier, result }
            })
            .collect()
    }
}

/// Create the output directory; an existing directory is fine
pub async fn ensure_output_dir(path: &Path) -> CrawlResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| CrawlError::DirectoryCreationFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct StaticPage(String);

    #[async_trait]
    impl PageFetcher for StaticPage {
        async fn fetch(&self, _url: &str) -> CrawlResult<String> {
            Ok(self.0.clone())
        }
    }

    struct CountingFetcher(AtomicUsize);

    #[async_trait]
    impl PageFetcher for CountingFetcher {
        async fn fetch(&self, _url: &str) -> CrawlResult<String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(String::new())
        }
    }

    struct UnreachablePage;

    #[async_trait]
    impl PageFetcher for UnreachablePage {
        async fn fetch(&self, url: &str) -> CrawlResult<String> {
            Err(CrawlError::FetchFailed {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    struct FailingWriter;

    #[async_trait]
    impl ListingWriter for FailingWriter {
        async fn persist(&self, listing: &Listing) -> CrawlResult<PathBuf> {
            if listing.identifier() == "2" {
                return Err(CrawlError::WriteFailed {
                    path: "2.json".to_string(),
                    reason: "disk full".to_string(),
                });
            }
            Ok(PathBuf::from(format!("{}.json", listing.identifier())))
        }
    }

    fn item(id: &str, condition: &str) -> String {
        format!(
            r#"<div class="s-item__info">
                 <a class="s-item__link" href="https://www.ebay.com/itm/{id}?hash=x">
                   <span role="heading">Item {id}</span>
                 </a>
                 <span class="SECONDARY_INFO">{condition}</span>
               </div>"#
        )
    }

    fn page(items: &[String]) -> String {
        format!(r#"<html><body><ul class="srp-river-results">{}</ul></body></html>"#, items.concat())
    }

    fn settings(output_dir: &Path) -> CrawlSettings {
        CrawlSettings {
            target_url: "https://www.ebay.com/sch/test/m.html".to_string(),
            item_url_prefix: "https://www.ebay.com/itm/".to_string(),
            output_dir: output_dir.to_path_buf(),
        }
    }

    #[tokio::test]
    async fn test_invalid_condition_stops_before_fetch() {
        let dir = tempdir().unwrap();
        let fetcher = Arc::new(CountingFetcher(AtomicUsize::new(0)));
        let crawler = ListingCrawler::new(
            settings(dir.path()),
            fetcher.clone(),
            Arc::new(JsonFileWriter::new(dir.path())),
            ListingListParser::new().unwrap(),
        );

        let err = crawler.crawl("like new").await.unwrap_err();
        assert_eq!(err, CrawlError::invalid_parameter("like new"));
        assert_eq!(fetcher.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_directory_failure_stops_before_fetch() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();

        let fetcher = Arc::new(CountingFetcher(AtomicUsize::new(0)));
        let crawler = ListingCrawler::new(
            settings(&blocker.join("out")),
            fetcher.clone(),
            Arc::new(JsonFileWriter::new(blocker.join("out"))),
            ListingListParser::new().unwrap(),
        );

        let err = crawler.crawl("new").await.unwrap_err();
        assert!(matches!(err, CrawlError::DirectoryCreationFailed { .. }));
        assert_eq!(fetcher.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_crawl() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("data");
        let crawler = ListingCrawler::new(
            settings(&output),
            Arc::new(UnreachablePage),
            Arc::new(JsonFileWriter::new(&output)),
            ListingListParser::new().unwrap(),
        );

        let err = crawler.crawl("").await.unwrap_err();
        assert_eq!(
            err,
            CrawlError::FetchFailed {
                url: "https://www.ebay.com/sch/test/m.html".to_string(),
                reason: "connection refused".to_string(),
            }
        );
        // The directory is prepared before fetching but receives nothing
        assert_eq!(std::fs::read_dir(&output).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_existing_directory_is_accepted() {
        let dir = tempdir().unwrap();
        ensure_output_dir(dir.path()).await.unwrap();
        ensure_output_dir(dir.path()).await.unwrap();
    }

    #[tokio::test]
    async fn test_write_failure_does_not_stop_siblings() {
        let dir = tempdir().unwrap();
        let body = page(&[item("1", "Used"), item("2", "Used"), item("3", "Used")]);
        let crawler = ListingCrawler::new(
            settings(dir.path()),
            Arc::new(StaticPage(body)),
            Arc::new(FailingWriter),
            ListingListParser::new().unwrap(),
        );

        let report = crawler.crawl("").await.unwrap();
        assert_eq!(report.accepted, 3);
        assert_eq!(report.saved_count(), 2);
        assert_eq!(report.failed_count(), 1);

        let failures = report.failures();
        assert_eq!(failures[0].0, "2");
        assert!(matches!(failures[0].1, CrawlError::WriteFailed { .. }));
    }

    #[tokio::test]
    async fn test_empty_page_saves_nothing() {
        let dir = tempdir().unwrap();
        let crawler = ListingCrawler::new(
            settings(dir.path()),
            Arc::new(StaticPage("<html><body>No results</body></html>".to_string())),
            Arc::new(JsonFileWriter::new(dir.path())),
            ListingListParser::new().unwrap(),
        );

        let report = crawler.crawl("").await.unwrap();
        assert_eq!(report.extracted, 0);
        assert!(report.outcomes.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_listings_counted() {
        let dir = tempdir().unwrap();
        let body = page(&[item("1", "Pre-Owned"), item("2", "Brand New")]);
        let crawler = ListingCrawler::new(
            settings(dir.path()),
            Arc::new(StaticPage(body)),
            Arc::new(JsonFileWriter::new(dir.path())),
            ListingListParser::new().unwrap(),
        );

        let report = crawler.crawl("used").await.unwrap();
        assert_eq!(report.extracted, 2);
        assert_eq!(report.accepted, 1);
        assert_eq!(report.rejected(), 1);
        assert_eq!(report.filter.as_str(), "pre-owned");
        assert_eq!(report.saved_paths(), vec![dir.path().join("1.json").as_path()]);
    }
}
