//! Access to the remote distribution service.
//!
//! The updater only talks to the service through the [`EditionSource`]
//! trait: a metadata-only probe and a body transfer to a local file.
//! [`HttpEditionSource`] is the production implementation.
//!
//! # Example
//!
//! ```no_run
//! use geoip2_update::edition::EditionCatalog;
//! use geoip2_update::remote::{EditionSource, HttpEditionSource};
//! use geoip2_update::config::DEFAULT_BASE_URL;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpEditionSource::new(DEFAULT_BASE_URL, "license-key")?;
//! let catalog = EditionCatalog::maxmind();
//! let edition = catalog.get("GeoLite2-City").ok_or("unknown edition")?;
//! let remote = source.probe(edition).await?;
//! println!("{} at version {}", remote.file_name, remote.version);
//! # Ok(())
//! # }
//! ```

mod error;
mod filename;
mod http;

pub use error::{RemoteError, SourceBuildError};
pub use http::HttpEditionSource;

use std::path::Path;

use async_trait::async_trait;

use crate::edition::Edition;
use crate::version_store::VersionMarker;

/// Metadata reported by the service for one edition, fetched fresh on every probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEdition {
    /// File name suggested by the service, e.g. `GeoLite2-City_20240102.tar.gz`.
    pub file_name: String,
    /// Archive size in bytes, when reported.
    pub content_length: Option<u64>,
    /// Remote revision of the edition.
    pub version: VersionMarker,
}

/// Receives progress notifications while an archive is transferred.
///
/// All methods default to doing nothing.
pub trait FetchObserver: Send + Sync {
    /// Called once the transfer has started.
    fn started(&self, _edition: &str, _total_bytes: Option<u64>) {}

    /// Called after each chunk with the cumulative byte count.
    fn advanced(&self, _edition: &str, _downloaded_bytes: u64) {}

    /// Called when the transfer ends, successfully or not.
    fn finished(&self, _edition: &str) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl FetchObserver for NoopObserver {}

/// Capability to query and download editions from the remote service.
#[async_trait]
pub trait EditionSource: Send + Sync {
    /// Asks for the edition's metadata without transferring the archive.
    ///
    /// # Errors
    ///
    /// Returns the edition-scoped [`RemoteError`] describing why the
    /// metadata could not be obtained.
    async fn probe(&self, edition: &Edition) -> Result<RemoteEdition, RemoteError>;

    /// Transfers the edition's archive to `dest`, returning the byte count.
    ///
    /// Any file already at `dest` is replaced. On failure no partial file is
    /// left behind.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::DownloadFailed`] when the transfer fails.
    async fn fetch(
        &self,
        edition: &Edition,
        remote: &RemoteEdition,
        dest: &Path,
        observer: &dyn FetchObserver,
    ) -> Result<u64, RemoteError>;
}
