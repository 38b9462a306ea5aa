//! Per-edition results and the run report.

use crate::remote::RemoteError;
use crate::version_store::VersionMarker;

use super::error::EditionError;

/// What happened to one edition.
#[derive(Debug)]
pub enum EditionStatus {
    /// A new version was downloaded and installed.
    Updated {
        /// The version now installed.
        version: VersionMarker,
        /// Number of installed files.
        files: usize,
    },
    /// The stored version already matches the remote one.
    UpToDate {
        /// The current version.
        version: VersionMarker,
    },
    /// The edition could not be processed.
    Failed(EditionError),
}

/// Result for one configured edition.
#[derive(Debug)]
pub struct EditionOutcome {
    /// The edition identifier as configured.
    pub edition: String,
    /// What happened.
    pub status: EditionStatus,
}

impl EditionOutcome {
    /// Whether the edition ended in [`EditionStatus::Failed`].
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self.status, EditionStatus::Failed(_))
    }

    /// Human-readable line for this outcome, always starting with the edition id.
    #[must_use]
    pub fn message(&self) -> String {
        let id = &self.edition;
        match &self.status {
            EditionStatus::Updated { .. } => format!("{id} has been updated."),
            EditionStatus::UpToDate { .. } => format!("{id} does not need to be updated."),
            EditionStatus::Failed(error) => failure_message(id, error),
        }
    }
}

fn failure_message(id: &str, error: &EditionError) -> String {
    match error {
        EditionError::UnsupportedEdition => format!("{id} is not a supported edition."),
        EditionError::MissingCapability { kind } => {
            format!("{id} cannot be extracted: {kind} archives are not supported by this build.")
        }
        EditionError::Remote(RemoteError::UnknownEdition | RemoteError::MissingFileName) => {
            format!("{id} not found on the remote server.")
        }
        EditionError::Remote(RemoteError::InvalidCredential) => {
            format!("{id} could not be checked: the license key was rejected (HTTP 401).")
        }
        EditionError::Remote(RemoteError::NotEntitled) => {
            format!("{id} is not available for this license key (HTTP 403).")
        }
        EditionError::Remote(RemoteError::MalformedVersion { value }) => {
            format!("{id} has an unreadable remote version {value:?}.")
        }
        EditionError::Remote(RemoteError::DownloadFailed { reason }) => {
            format!("{id} could not be downloaded: {reason}.")
        }
        EditionError::Remote(other) => format!("{id} could not be checked: {other}."),
        EditionError::Extract(error) => format!("{id} could not be extracted: {error}."),
        EditionError::ExtractionAborted { reason } => {
            format!("{id} could not be extracted: extraction aborted: {reason}.")
        }
        EditionError::VersionRead(error) => {
            format!("{id} could not be checked against the local version: {error}.")
        }
        EditionError::VersionWrite(error) => {
            format!("{id} was installed but its version could not be recorded: {error}.")
        }
    }
}

/// Result of one update run.
#[derive(Debug, Default)]
pub struct UpdateReport {
    fatal: Vec<String>,
    outcomes: Vec<EditionOutcome>,
}

impl UpdateReport {
    pub(crate) fn rejected(fatal: Vec<String>) -> Self {
        Self {
            fatal,
            outcomes: Vec::new(),
        }
    }

    pub(crate) fn completed(outcomes: Vec<EditionOutcome>) -> Self {
        Self {
            fatal: Vec::new(),
            outcomes,
        }
    }

    /// Per-edition results in configured order. Empty when validation failed.
    #[must_use]
    pub fn outcomes(&self) -> &[EditionOutcome] {
        &self.outcomes
    }

    /// One line per updated or already current edition, in order.
    #[must_use]
    pub fn updated(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.is_failure())
            .map(EditionOutcome::message)
            .collect()
    }

    /// Fatal messages followed by one line per failed edition, in order.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.fatal
            .iter()
            .cloned()
            .chain(
                self.outcomes
                    .iter()
                    .filter(|outcome| outcome.is_failure())
                    .map(EditionOutcome::message),
            )
            .collect()
    }

    /// True when nothing failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.fatal.is_empty() && !self.outcomes.iter().any(EditionOutcome::is_failure)
    }

    /// Number of editions that were actually replaced.
    #[must_use]
    pub fn updated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, EditionStatus::Updated { .. }))
            .count()
    }
}
