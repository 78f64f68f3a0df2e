//! End-to-end crawl tests with an in-memory page and real or slow writers
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ebay_listing_scraper_lib::application::{CrawlSettings, ListingCrawler};
use ebay_listing_scraper_lib::domain::{CrawlError, CrawlResult, Listing};
use ebay_listing_scraper_lib::infrastructure::{JsonFileWriter, ListingListParser, ListingWriter, PageFetcher};
use tempfile::tempdir;

struct StaticPage(String);

#[async_trait]
impl PageFetcher for StaticPage {
    async fn fetch(&self, _url: &str) -> CrawlResult<String> {
        Ok(self.0.clone())
    }
}

/// Sleeps before "writing" so completion has to be awaited
struct SlowWriter {
    delay: Duration,
    completed: AtomicUsize,
}

#[async_trait]
impl ListingWriter for SlowWriter {
    async fn persist(&self, listing: &Listing) -> CrawlResult<PathBuf> {
        tokio::time::sleep(self.delay).await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(PathBuf::from(format!("{}.json", listing.identifier())))
    }
}

fn item(id: &str, title: &str, condition: &str) -> String {
    format!(
        r#"<li class="s-item">
             <div class="s-item__info">
               <a class="s-item__link" href="https://www.ebay.com/itm/{id}?hash=item{id}">
                 <div class="s-item__title"><span role="heading">{title}</span></div>
               </a>
               <div class="s-item__subtitle"><span class="SECONDARY_INFO">{condition}</span></div>
             </div>
           </li>"#
    )
}

fn page(items: &[String]) -> String {
    format!(
        r#"<html><body><div id="srp-river-main"><ul class="srp-river-results clearfix">{}</ul></div></body></html>"#,
        items.concat()
    )
}

fn settings(output_dir: &Path) -> CrawlSettings {
    CrawlSettings {
        target_url: "https://www.ebay.com/sch/garlandcomputer/m.html".to_string(),
        item_url_prefix: "https://www.ebay.com/itm/".to_string(),
        output_dir: output_dir.to_path_buf(),
    }
}

fn read_listing(path: &Path) -> serde_json::Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[tokio::test]
async fn brand_new_filter_persists_only_matching_listings() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("data");
    let body = page(&[
        item("1001", "Dell OptiPlex 7050", "Brand New"),
        item("1002", "Lenovo ThinkCentre M720", "Pre-Owned"),
        item("1003", "HP ProDesk 600", "BRAND NEW"),
    ]);

    let crawler = ListingCrawler::new(
        settings(&out),
        Arc::new(StaticPage(body)),
        Arc::new(JsonFileWriter::new(&out)),
        ListingListParser::new().unwrap(),
    );

    let report = crawler.crawl("brand new").await.unwrap();
    assert_eq!(report.extracted, 3);
    assert_eq!(report.accepted, 2);
    assert_eq!(report.saved_count(), 2);
    assert_eq!(report.failed_count(), 0);

    let mut files: Vec<_> = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    files.sort();
    assert_eq!(files, vec!["1001.json", "1003.json"]);

    let first = read_listing(&out.join("1001.json"));
    assert_eq!(first["id"], "1001");
    assert_eq!(first["title"], "Dell OptiPlex 7050");
    assert_eq!(first["url"], "https://www.ebay.com/itm/1001?hash=item1001");
    assert_eq!(first["condition"], "Brand New");

    let third = read_listing(&out.join("1003.json"));
    assert_eq!(third["condition"], "BRAND NEW");
    assert!(!out.join("1002.json").exists());
}

#[tokio::test]
async fn spanish_alias_matches_canonical_label() {
    let dir = tempdir().unwrap();
    let body = page(&[
        item("1", "Portátil", "De segunda mano"),
        item("2", "Monitor", "Totalmente nuevo"),
    ]);

    let crawler = ListingCrawler::new(
        settings(dir.path()),
        Arc::new(StaticPage(body)),
        Arc::new(JsonFileWriter::new(dir.path())),
        ListingListParser::new().unwrap(),
    );

    let report = crawler.crawl("usado").await.unwrap();
    assert_eq!(report.accepted, 1);
    assert!(dir.path().join("1.json").exists());
    assert!(!dir.path().join("2.json").exists());
}

#[tokio::test]
async fn empty_filter_persists_every_listing() {
    let dir = tempdir().unwrap();
    let body = page(&[
        item("11", "A", "Brand New"),
        item("12", "B", ""),
        item("13", "C", "Open box"),
    ]);

    let crawler = ListingCrawler::new(
        settings(dir.path()),
        Arc::new(StaticPage(body)),
        Arc::new(JsonFileWriter::new(dir.path())),
        ListingListParser::new().unwrap(),
    );

    let report = crawler.crawl("").await.unwrap();
    assert_eq!(report.saved_count(), 3);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
}

#[tokio::test]
async fn traversing_link_is_reported_and_not_written_outside() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("data");
    let body = page(&[item("21", "Kept", "Brand New"), item("../escaped", "Escaping", "Brand New")]);

    let crawler = ListingCrawler::new(
        settings(&out),
        Arc::new(StaticPage(body)),
        Arc::new(JsonFileWriter::new(&out)),
        ListingListParser::new().unwrap(),
    );

    let report = crawler.crawl("").await.unwrap();
    assert_eq!(report.saved_count(), 1);
    assert_eq!(report.failed_count(), 1);

    let failures = report.failures();
    assert_eq!(failures[0].0, "../escaped");
    assert!(matches!(failures[0].1, CrawlError::WriteFailed { .. }));

    assert!(out.join("21.json").exists());
    assert!(!dir.path().join("escaped.json").exists());
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 1);
}

#[tokio::test]
async fn crawl_waits_for_every_slow_write() {
    const LISTINGS: usize = 25;

    let dir = tempdir().unwrap();
    let items: Vec<String> = (0..LISTINGS)
        .map(|i| item(&i.to_string(), &format!("Laptop {i}"), "Pre-Owned"))
        .collect();
    let writer = Arc::new(SlowWriter {
        delay: Duration::from_millis(200),
        completed: AtomicUsize::new(0),
    });

    let crawler = ListingCrawler::new(
        settings(dir.path()),
        Arc::new(StaticPage(page(&items))),
        writer.clone(),
        ListingListParser::new().unwrap(),
    );

    let started = std::time::Instant::now();
    let report = crawler.crawl("pre-owned").await.unwrap();

    assert_eq!(report.accepted, LISTINGS);
    assert_eq!(writer.completed.load(Ordering::SeqCst), LISTINGS);
    assert_eq!(report.outcomes.len(), LISTINGS);
    assert_eq!(report.saved_count(), LISTINGS);
    // Writes run concurrently rather than one after another
    assert!(started.elapsed() < Duration::from_millis(200 * LISTINGS as u64));
}
