//! Configuration infrastructure
//!
//! Contains configuration loading and management for the listing scraper.
//!
//! Configuration is organized into three sections:
//! 1. Scraper settings (target page, output directory, HTTP behaviour)
//! 2. CSS selectors used to pull listings out of the results page
//! 3. Logging settings

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where to fetch from and where to write to
    pub scraper: ScraperConfig,

    /// CSS selectors for the search results page
    pub selectors: ListingSelectors,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Fetch target and output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Search results page to scrape
    pub target_url: String,

    /// Listing URLs must start with this prefix to yield an identifier
    pub item_url_prefix: String,

    /// Directory receiving one JSON file per accepted listing
    pub output_dir: PathBuf,

    /// User agent sent with the page request
    pub user_agent: String,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Follow HTTP redirects when fetching the page
    pub follow_redirects: bool,
}

/// CSS selectors for the search results page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    /// Results list container
    pub results_container: String,

    /// One node per listing, searched inside the container
    pub item: String,

    /// Listing heading, searched inside an item
    pub title: String,

    /// Anchor whose href is the listing URL
    pub link: String,

    /// Condition label ("Brand New", "Pre-Owned", ...)
    pub condition: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs (file output only)
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for the log file; defaults to `logs` next to the executable
    pub log_dir: Option<PathBuf>,

    /// Log file name inside the log directory
    pub file_name: String,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            target_url: ebay::SEARCH_PAGE_URL.to_string(),
            item_url_prefix: ebay::ITEM_URL_PREFIX.to_string(),
            output_dir: PathBuf::from(defaults::OUTPUT_DIR),
            user_agent: defaults::USER_AGENT.to_string(),
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            follow_redirects: true,
        }
    }
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            results_container: ebay::selectors::RESULTS_CONTAINER.to_string(),
            item: ebay::selectors::ITEM.to_string(),
            title: ebay::selectors::TITLE.to_string(),
            link: ebay::selectors::LINK.to_string(),
            condition: ebay::selectors::CONDITION.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

impl AppConfig {
    /// Check values that would only fail later, mid-crawl
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.scraper.target_url)
            .with_context(|| format!("Invalid target URL: {}", self.scraper.target_url))?;

        if self.scraper.item_url_prefix.is_empty() {
            return Err(anyhow!("item_url_prefix must not be empty"));
        }

        if self.scraper.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("output_dir must not be empty"));
        }

        if self.scraper.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }

        Ok(())
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Configuration manager for the per-user config file
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    /// Configuration manager for an explicit file
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("⚠️  Configuration file could not be parsed: {}", parse_error);
                warn!("⚠️  Falling back to default configuration");
                Ok(AppConfig::default())
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }
}

/// eBay URLs and page structure constants
pub mod ebay {
    /// Seller search results page that gets scraped
    pub const SEARCH_PAGE_URL: &str = "https://www.ebay.com/sch/garlandcomputer/m.html";

    /// Item pages live under this prefix; the path segment after it is the item id
    pub const ITEM_URL_PREFIX: &str = "https://www.ebay.com/itm/";

    /// Selectors matching the search results markup
    pub mod selectors {
        pub const RESULTS_CONTAINER: &str = ".srp-river-results";
        pub const ITEM: &str = ".s-item__info";
        pub const TITLE: &str = "span[role='heading']";
        pub const LINK: &str = "a[class='s-item__link']";
        pub const CONDITION: &str = "span[class='SECONDARY_INFO']";
    }
}

/// Default configuration values
pub mod defaults {
    /// Directory name used under the user's config dir
    pub const APP_DIR_NAME: &str = "ebay-listing-scraper";

    /// Config file name
    pub const CONFIG_FILE_NAME: &str = "config.json";

    /// Default output directory, relative to the working directory
    pub const OUTPUT_DIR: &str = "data";

    /// File extension of persisted listings
    pub const LISTING_FILE_EXTENSION: &str = "json";

    pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    // Log configuration defaults
    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = false;
    pub const LOG_FILE_NAME: &str = "scraper.log";
}
