//! Error types for the remote distribution service.

use thiserror::Error;

/// Edition-scoped failures from probing or fetching an edition.
///
/// Transport errors are flattened to text so the variants stay cheap to
/// compare and never carry the request URL, which embeds the license key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The service rejected the license key (HTTP 401).
    #[error("the license key was rejected (HTTP 401)")]
    InvalidCredential,

    /// The license key is valid but not entitled to this edition (HTTP 403).
    #[error("the license key is not entitled to this edition (HTTP 403)")]
    NotEntitled,

    /// The service does not know this edition (HTTP 404).
    #[error("not found on the remote server (HTTP 404)")]
    UnknownEdition,

    /// No response was received (DNS, connect, TLS or timeout failure).
    #[error("remote server unavailable: {reason}")]
    Unavailable {
        /// Description of the transport failure.
        reason: String,
    },

    /// Any other non-success status.
    #[error("remote server responded with HTTP {code}")]
    Status {
        /// The HTTP status code.
        code: u16,
    },

    /// The version marker header is missing or is not an HTTP date.
    #[error("malformed version marker {value:?}")]
    MalformedVersion {
        /// Raw header value, empty when the header is missing.
        value: String,
    },

    /// The response did not suggest a file name for the archive.
    #[error("not found remotely: the response carries no archive file name")]
    MissingFileName,

    /// Transferring the archive body failed.
    #[error("download failed: {reason}")]
    DownloadFailed {
        /// Description of the failure.
        reason: String,
    },
}

impl RemoteError {
    /// Creates an unavailable error from a transport error, without its URL.
    pub(crate) fn unavailable(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            "request timed out"
        } else if error.is_connect() {
            "connection failed"
        } else {
            "request failed"
        };
        Self::Unavailable {
            reason: format!("{kind}: {}", error.without_url()),
        }
    }

    /// Creates a download failure.
    pub(crate) fn download_failed(reason: impl Into<String>) -> Self {
        Self::DownloadFailed {
            reason: reason.into(),
        }
    }

    /// Maps a non-success probe status to its edition-scoped error.
    pub(crate) fn from_status(code: u16) -> Self {
        match code {
            401 => Self::InvalidCredential,
            403 => Self::NotEntitled,
            404 => Self::UnknownEdition,
            code => Self::Status { code },
        }
    }
}

/// Errors constructing the HTTP edition source.
#[derive(Debug, Error)]
pub enum SourceBuildError {
    /// The configured download endpoint is not a valid absolute URL.
    #[error("invalid download endpoint {url:?}")]
    InvalidBaseUrl {
        /// The rejected endpoint.
        url: String,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
