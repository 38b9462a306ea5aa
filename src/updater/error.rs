//! Error types for the update run.

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::edition::ArchiveKind;
use crate::remote::{RemoteError, SourceBuildError};
use crate::version_store::VersionStoreError;

/// Why a single edition could not be brought up to date.
///
/// Every variant is scoped to one edition; the run continues with the next.
#[derive(Debug, Error)]
pub enum EditionError {
    /// The identifier is not in the edition catalog.
    #[error("unsupported edition")]
    UnsupportedEdition,

    /// The edition ships in a format this build cannot extract.
    #[error("{kind} archives are not supported by this build")]
    MissingCapability {
        /// The archive format.
        kind: ArchiveKind,
    },

    /// Probing or downloading failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The archive could not be extracted or installed.
    #[error(transparent)]
    Extract(#[from] ArchiveError),

    /// The extraction task panicked or was cancelled.
    #[error("extraction aborted: {reason}")]
    ExtractionAborted {
        /// Description from the task runtime.
        reason: String,
    },

    /// The version record could not be read before the update.
    #[error(transparent)]
    VersionRead(VersionStoreError),

    /// The edition was installed but its version could not be recorded.
    #[error(transparent)]
    VersionWrite(VersionStoreError),
}

/// Errors constructing an [`Updater`](super::Updater).
#[derive(Debug, Error)]
pub enum UpdaterError {
    /// The HTTP edition source could not be built.
    #[error(transparent)]
    Source(#[from] SourceBuildError),
}
