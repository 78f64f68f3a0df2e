//! Listing persistence
//!
//! Every accepted listing is written to its own JSON file named after the
//! listing identifier. Writes for the same identifier overwrite each other.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::{CrawlError, CrawlResult, Listing};
use crate::infrastructure::config::defaults::LISTING_FILE_EXTENSION;

/// Destination for accepted listings
#[async_trait]
pub trait ListingWriter: Send + Sync {
    /// Persist one listing, returning where it ended up
    async fn persist(&self, listing: &Listing) -> CrawlResult<PathBuf>;
}

/// Writes each listing as `<output_dir>/<identifier>.json`
#[derive(Debug, Clone)]
pub struct JsonFileWriter {
    output_dir: PathBuf,
}

impl JsonFileWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// File path for a listing; derived only from its identifier
    pub fn path_for(&self, listing: &Listing) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", listing.identifier(), LISTING_FILE_EXTENSION))
    }
}

/// Identifiers must name a file directly inside the output directory.
/// The empty identifier is allowed and lands in `.json`.
fn is_plain_file_stem(identifier: &str) -> bool {
    if identifier.is_empty() {
        return true;
    }
    !identifier.contains("..")
        && !identifier.contains(['/', '\\'])
        && Path::new(identifier).file_name().is_some_and(|name| name == identifier)
}

/// Pretty JSON with four-space indentation
pub fn to_listing_json(listing: &Listing) -> CrawlResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    listing
        .serialize(&mut serializer)
        .map_err(|e| CrawlError::SerializationFailed {
            identifier: listing.identifier().to_string(),
            reason: e.to_string(),
        })?;
    Ok(buffer)
}

#[async_trait]
impl ListingWriter for JsonFileWriter {
    async fn persist(&self, listing: &Listing) -> CrawlResult<PathBuf> {
        let path = self.path_for(listing);
        if !is_plain_file_stem(listing.identifier()) {
            return Err(CrawlError::WriteFailed {
                path: path.display().to_string(),
                reason: format!(
                    "identifier '{}' is not a plain file name",
                    listing.identifier()
                ),
            });
        }

        let content = to_listing_json(listing)?;

        tokio::fs::write(&path, content)
            .await
            .map_err(|e| CrawlError::WriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        debug!("Saved listing {} to {}", listing.identifier(), path.display());
        Ok(path)
    }
}
