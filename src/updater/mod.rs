//! Update orchestration: validate once, then bring each edition up to date.
//!
//! Editions are processed sequentially in configured order. A failure for
//! one edition is recorded in the [`UpdateReport`] and the run moves on.

mod error;
mod outcome;
mod validation;

pub use error::{EditionError, UpdaterError};
pub use outcome::{EditionOutcome, EditionStatus, UpdateReport};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::archive::{self, UnpackReport};
use crate::config::UpdaterConfig;
use crate::edition::{Edition, EditionCatalog};
use crate::remote::{EditionSource, FetchObserver, HttpEditionSource, NoopObserver};
use crate::version_store::VersionStore;

/// Keeps a destination directory in sync with the remote service.
pub struct Updater {
    config: UpdaterConfig,
    catalog: EditionCatalog,
    source: Box<dyn EditionSource>,
    observer: Arc<dyn FetchObserver>,
}

impl Updater {
    /// Creates an updater talking HTTP to the configured endpoint, using the
    /// MaxMind edition catalog.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Source`] if the endpoint is not a valid URL or
    /// the HTTP client cannot be built.
    pub fn new(config: UpdaterConfig) -> Result<Self, UpdaterError> {
        let source = HttpEditionSource::new(config.resolved_base_url(), config.license_key.clone())?;
        Ok(Self::with_source(
            config,
            EditionCatalog::maxmind(),
            Box::new(source),
        ))
    }

    /// Creates an updater with an explicit catalog and edition source.
    #[must_use]
    pub fn with_source(
        config: UpdaterConfig,
        catalog: EditionCatalog,
        source: Box<dyn EditionSource>,
    ) -> Self {
        Self {
            config,
            catalog,
            source,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Sets the observer notified during archive downloads.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Runs one update pass over every configured edition.
    ///
    /// Invalid configuration yields a report holding only fatal messages,
    /// without contacting the remote service.
    #[instrument(skip_all, fields(editions = self.config.editions.len(), dir = %self.config.dir.display()))]
    pub async fn run(&self) -> UpdateReport {
        let tmp_dir = self.config.resolved_tmp_dir();
        let store = VersionStore::new(&self.config.dir);

        let fatal = validation::validate(&self.config, &store, &tmp_dir);
        if !fatal.is_empty() {
            for problem in &fatal {
                error!(%problem, "configuration rejected");
            }
            return UpdateReport::rejected(fatal);
        }

        let mut outcomes = Vec::with_capacity(self.config.editions.len());
        for edition_id in &self.config.editions {
            let status = self
                .update_edition(edition_id, &store, &tmp_dir)
                .await
                .unwrap_or_else(EditionStatus::Failed);
            let outcome = EditionOutcome {
                edition: edition_id.clone(),
                status,
            };
            match &outcome.status {
                EditionStatus::Failed(err) => {
                    warn!(edition = %edition_id, error = %err, "edition update failed");
                }
                EditionStatus::UpToDate { version } => {
                    info!(edition = %edition_id, %version, "edition already current");
                }
                EditionStatus::Updated { version, files } => {
                    info!(edition = %edition_id, %version, files, "edition updated");
                }
            }
            outcomes.push(outcome);
        }

        UpdateReport::completed(outcomes)
    }

    async fn update_edition(
        &self,
        edition_id: &str,
        store: &VersionStore,
        tmp_dir: &Path,
    ) -> Result<EditionStatus, EditionError> {
        let edition = self
            .catalog
            .get(edition_id)
            .ok_or(EditionError::UnsupportedEdition)?;
        if !archive::supports(edition.archive) {
            return Err(EditionError::MissingCapability {
                kind: edition.archive,
            });
        }

        let remote = self.source.probe(edition).await?;
        let stored = store
            .read_version(edition_id)
            .map_err(EditionError::VersionRead)?;
        debug!(edition = edition_id, remote = %remote.version, stored = ?stored, "comparing versions");
        if stored == Some(remote.version) {
            return Ok(EditionStatus::UpToDate {
                version: remote.version,
            });
        }

        let archive_path = tmp_dir.join(edition.archive_file_name());
        self.source
            .fetch(edition, &remote, &archive_path, self.observer.as_ref())
            .await?;

        let report = extract(
            archive_path,
            edition.clone(),
            self.config.dir.join(edition_id),
            tmp_dir.to_path_buf(),
        )
        .await?;

        store
            .write_version(edition_id, remote.version)
            .map_err(EditionError::VersionWrite)?;
        Ok(EditionStatus::Updated {
            version: remote.version,
            files: report.files,
        })
    }
}

/// Runs [`archive::unpack`] on the blocking pool.
async fn extract(
    archive_path: PathBuf,
    edition: Edition,
    destination: PathBuf,
    staging_root: PathBuf,
) -> Result<UnpackReport, EditionError> {
    let leftover = archive_path.clone();
    let task = tokio::task::spawn_blocking(move || {
        archive::unpack(&archive_path, &edition, &destination, &staging_root)
    });
    match task.await {
        Ok(result) => result.map_err(EditionError::Extract),
        Err(join_error) => {
            let _ = tokio::fs::remove_file(&leftover).await;
            Err(EditionError::ExtractionAborted {
                reason: join_error.to_string(),
            })
        }
    }
}
