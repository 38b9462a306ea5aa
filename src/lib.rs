//! GeoIP2 Update Library
//!
//! Keeps a local directory of geolocation database editions in sync with a
//! remote distribution service. Each run probes every configured edition,
//! downloads and extracts only the ones whose remote version changed, and
//! records the installed version next to the files.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`edition`] - Edition catalog and archive formats
//! - [`config`] - Typed run configuration
//! - [`version_store`] - Persisted record of installed versions
//! - [`remote`] - Probing and downloading from the distribution service
//! - [`archive`] - Extraction and destination reconciliation
//! - [`updater`] - Per-run orchestration and result reporting

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod config;
pub mod edition;
pub mod remote;
pub mod updater;
pub mod version_store;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use archive::{ArchiveError, UnpackReport};
pub use config::{ConfigError, DEFAULT_BASE_URL, UpdaterConfig};
pub use edition::{ArchiveKind, DEFAULT_EDITIONS, DatabaseKind, Edition, EditionCatalog};
pub use remote::{
    EditionSource, FetchObserver, HttpEditionSource, NoopObserver, RemoteEdition, RemoteError,
};
pub use updater::{
    EditionError, EditionOutcome, EditionStatus, UpdateReport, Updater, UpdaterError,
};
pub use version_store::{VERSION_FILE_NAME, VersionMarker, VersionStore, VersionStoreError};
