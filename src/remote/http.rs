//! HTTP implementation of [`EditionSource`].
//!
//! Probes with `HEAD` and downloads with a streaming `GET` against the
//! service's download endpoint, passing `edition_id`, `suffix` and
//! `license_key` as query parameters.

use std::fmt;
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, HeaderMap, LAST_MODIFIED};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::error::{RemoteError, SourceBuildError};
use super::filename::{parse_content_disposition, sanitize_filename};
use super::{EditionSource, FetchObserver, RemoteEdition};
use crate::edition::Edition;
use crate::version_store::VersionMarker;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default idle timeout between body reads (5 minutes).
///
/// Applies per read, so a large archive may take longer than this overall.
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Edition source backed by the service's HTTP download endpoint.
///
/// Create once per run and reuse it for every edition to benefit from
/// connection pooling.
#[derive(Clone)]
pub struct HttpEditionSource {
    client: Client,
    base_url: Url,
    license_key: String,
}

impl fmt::Debug for HttpEditionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpEditionSource")
            .field("base_url", &self.base_url.as_str())
            .field("license_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl HttpEditionSource {
    /// Creates a source with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`SourceBuildError`] if `base_url` is not an absolute HTTP(S)
    /// URL or the HTTP client cannot be built.
    pub fn new(base_url: &str, license_key: impl Into<String>) -> Result<Self, SourceBuildError> {
        Self::with_timeouts(
            base_url,
            license_key,
            CONNECT_TIMEOUT_SECS,
            READ_TIMEOUT_SECS,
        )
    }

    /// Creates a source with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_timeouts(
        base_url: &str,
        license_key: impl Into<String>,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, SourceBuildError> {
        let parsed = Url::parse(base_url)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base())
            .ok_or_else(|| SourceBuildError::InvalidBaseUrl {
                url: base_url.to_string(),
            })?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .read_timeout(Duration::from_secs(read_timeout_secs))
            .user_agent(default_user_agent())
            .build()
            .map_err(SourceBuildError::Client)?;

        Ok(Self {
            client,
            base_url: parsed,
            license_key: license_key.into(),
        })
    }

    /// Builds the request URL for an edition. Contains the license key: never log it.
    fn edition_url(&self, edition: &Edition) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("edition_id", &edition.id)
            .append_pair("suffix", edition.archive.extension())
            .append_pair("license_key", &self.license_key);
        url
    }
}

#[async_trait]
impl EditionSource for HttpEditionSource {
    #[instrument(skip(self, edition), fields(edition = %edition.id))]
    async fn probe(&self, edition: &Edition) -> Result<RemoteEdition, RemoteError> {
        let response = self
            .client
            .head(self.edition_url(edition))
            .send()
            .await
            .map_err(RemoteError::unavailable)?;

        let status = response.status().as_u16();
        if status != 200 {
            debug!(status, "probe rejected");
            return Err(RemoteError::from_status(status));
        }

        let remote = remote_edition_from_headers(response.headers())?;
        debug!(
            file_name = %remote.file_name,
            version = %remote.version,
            content_length = ?remote.content_length,
            "probe complete"
        );
        Ok(remote)
    }

    #[instrument(
        skip(self, edition, remote, dest, observer),
        fields(edition = %edition.id, dest = %dest.display())
    )]
    async fn fetch(
        &self,
        edition: &Edition,
        remote: &RemoteEdition,
        dest: &Path,
        observer: &dyn FetchObserver,
    ) -> Result<u64, RemoteError> {
        remove_stale_file(dest).await?;

        let response = self
            .client
            .get(self.edition_url(edition))
            .send()
            .await
            .map_err(|e| RemoteError::download_failed(describe_transport_error(e)))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(RemoteError::download_failed(format!(
                "remote server responded with HTTP {status}"
            )));
        }

        let expected = remote.content_length.or(response.content_length());
        observer.started(&edition.id, expected);
        let streamed = stream_to_file(response, dest, &edition.id, observer).await;
        observer.finished(&edition.id);

        let written = match streamed {
            Ok(written) => written,
            Err(error) => {
                debug!(path = %dest.display(), "cleaning up partial archive after error");
                let _ = tokio::fs::remove_file(dest).await;
                return Err(error);
            }
        };

        if let Some(expected) = expected
            && expected != written
        {
            let _ = tokio::fs::remove_file(dest).await;
            return Err(RemoteError::download_failed(format!(
                "truncated transfer: expected {expected} bytes, got {written}"
            )));
        }

        info!(bytes = written, "archive downloaded");
        Ok(written)
    }
}

/// Interprets the headers of a successful probe.
fn remote_edition_from_headers(headers: &HeaderMap) -> Result<RemoteEdition, RemoteError> {
    let raw_version = headers
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let version = parse_version_marker(raw_version)?;

    let file_name = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_disposition)
        .and_then(|name| sanitize_filename(&name))
        .ok_or(RemoteError::MissingFileName)?;

    let content_length = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    Ok(RemoteEdition {
        file_name,
        content_length,
        version,
    })
}

/// Parses an HTTP-date into Unix seconds.
fn parse_version_marker(raw: &str) -> Result<VersionMarker, RemoteError> {
    let malformed = || RemoteError::MalformedVersion {
        value: raw.to_string(),
    };
    let time = httpdate::parse_http_date(raw.trim()).map_err(|_| malformed())?;
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map_err(|_| malformed())?
        .as_secs();
    Ok(VersionMarker(secs))
}

async fn remove_stale_file(dest: &Path) -> Result<(), RemoteError> {
    match tokio::fs::remove_file(dest).await {
        Ok(()) => {
            debug!(path = %dest.display(), "removed stale archive");
            Ok(())
        }
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(RemoteError::download_failed(format!(
            "cannot remove stale archive {}: {error}",
            dest.display()
        ))),
    }
}

/// Streams the response body to `dest`, returning bytes written.
async fn stream_to_file(
    response: reqwest::Response,
    dest: &Path,
    edition: &str,
    observer: &dyn FetchObserver,
) -> Result<u64, RemoteError> {
    let io_failed = |error: std::io::Error| {
        RemoteError::download_failed(format!("cannot write {}: {error}", dest.display()))
    };

    let file = File::create(dest).await.map_err(io_failed)?;
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| RemoteError::download_failed(describe_transport_error(e)))?;
        writer.write_all(&chunk).await.map_err(io_failed)?;
        written += chunk.len() as u64;
        observer.advanced(edition, written);
    }

    writer.flush().await.map_err(io_failed)?;
    Ok(written)
}

fn describe_transport_error(error: reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else {
        error.without_url().to_string()
    }
}

fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("geoip2-update/{version}")
}
