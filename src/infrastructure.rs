//! Infrastructure layer for fetching, parsing, persistence and configuration

pub mod config;
pub mod http_client;
pub mod listing_store;
pub mod logging;
pub mod parsing;
pub mod parsing_error;

pub use config::{AppConfig, ConfigManager, ebay};
pub use http_client::{HttpClient, HttpClientConfig, PageFetcher};
pub use listing_store::{JsonFileWriter, ListingWriter};
pub use logging::{bootstrap_dispatch, get_log_directory, init_logging_with_config};
pub use parsing::{ListingListParser, ParsingError, ParsingResult};
