//! Error types for archive extraction.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::edition::ArchiveKind;

/// Failures turning a downloaded archive into the edition's destination files.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive suffix is not recognized or its format is not compiled in.
    #[error("unsupported archive format: {}", path.display())]
    UnsupportedKind {
        /// The archive path.
        path: PathBuf,
    },

    /// The archive is corrupt or could not be decoded.
    #[error("cannot decode {kind} archive {}: {reason}", path.display())]
    Decode {
        /// The archive path.
        path: PathBuf,
        /// Archive format being decoded.
        kind: ArchiveKind,
        /// Decoder message.
        reason: String,
    },

    /// No top-level directory in the archive belongs to the edition.
    #[error("archive has no directory for {edition}")]
    MissingEditionDir {
        /// The edition identifier.
        edition: String,
    },

    /// Several top-level directories could belong to the edition.
    #[error("archive has {} candidate directories for {edition}", candidates.len())]
    AmbiguousLayout {
        /// The edition identifier.
        edition: String,
        /// Every matching directory.
        candidates: Vec<PathBuf>,
    },

    /// The edition directory holds no file of the edition's data format.
    #[error("archive directory for {edition} contains no data files")]
    NoDataFiles {
        /// The edition identifier.
        edition: String,
    },

    /// A filesystem operation failed.
    #[error("filesystem error at {}: {source}", path.display())]
    Io {
        /// Path being operated on.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl ArchiveError {
    /// Returns a closure wrapping an IO error for `path`.
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
