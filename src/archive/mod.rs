//! Archive extraction and destination reconciliation.
//!
//! [`unpack`] decodes a downloaded archive into a throwaway staging
//! directory, finds the edition's top-level directory, and installs its
//! data files as `<dir>/<editionId>`. The archive and the staging
//! directory are removed whatever the outcome.

mod decode;
mod error;
mod layout;
mod reconcile;

pub use error::ArchiveError;
pub use layout::{EditionDirMatch, find_edition_dir};

use std::io;
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::edition::{ArchiveKind, Edition};

/// Summary of a successful extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnpackReport {
    /// Number of files now in the destination directory.
    pub files: usize,
    /// Whether a previous copy of the edition was replaced.
    pub replaced: bool,
}

/// Returns whether this build can decode `kind`.
#[must_use]
pub fn supports(kind: ArchiveKind) -> bool {
    match kind {
        ArchiveKind::TarGz => true,
        ArchiveKind::Zip => cfg!(feature = "zip"),
    }
}

/// Extracts `archive` and installs the edition's data files as `destination`.
///
/// Only files matching the edition's database format are installed.
/// `staging_root` receives the temporary extraction directory. On failure
/// the existing `destination` is left untouched.
///
/// # Errors
///
/// Returns [`ArchiveError`] when the format is unsupported, decoding fails,
/// the archive layout does not identify a single edition directory, the
/// directory holds no data files, or the filesystem refuses an operation.
#[instrument(skip_all, fields(edition = %edition.id, archive = %archive.display()))]
pub fn unpack(
    archive: &Path,
    edition: &Edition,
    destination: &Path,
    staging_root: &Path,
) -> Result<UnpackReport, ArchiveError> {
    let edition_id = edition.id.as_str();
    let _archive = RemoveOnDrop(archive);

    let kind = ArchiveKind::from_path(archive)
        .filter(|kind| supports(*kind))
        .ok_or_else(|| ArchiveError::UnsupportedKind {
            path: archive.to_path_buf(),
        })?;

    let staging = tempfile::Builder::new()
        .prefix(&format!("{edition_id}.staging"))
        .tempdir_in(staging_root)
        .map_err(ArchiveError::io(staging_root))?;

    decode::decode(archive, kind, staging.path())?;

    let edition_dir = match find_edition_dir(staging.path(), edition_id)
        .map_err(ArchiveError::io(staging.path()))?
    {
        EditionDirMatch::Found(dir) => dir,
        EditionDirMatch::NotFound => {
            return Err(ArchiveError::MissingEditionDir {
                edition: edition_id.to_string(),
            });
        }
        EditionDirMatch::Ambiguous(candidates) => {
            return Err(ArchiveError::AmbiguousLayout {
                edition: edition_id.to_string(),
                candidates,
            });
        }
    };
    debug!(dir = %edition_dir.display(), "edition directory located");

    let (files, replaced) = reconcile::install_files(&edition_dir, destination, edition_id, edition.database)?;

    let staging_path = staging.path().to_path_buf();
    if let Err(error) = staging.close() {
        warn!(path = %staging_path.display(), %error, "failed to remove staging directory");
    }

    info!(files, replaced, destination = %destination.display(), "edition installed");
    Ok(UnpackReport { files, replaced })
}

/// Deletes the downloaded archive when extraction ends.
struct RemoveOnDrop<'a>(&'a Path);

impl Drop for RemoveOnDrop<'_> {
    fn drop(&mut self) {
        match std::fs::remove_file(self.0) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => {
                warn!(path = %self.0.display(), %error, "failed to remove downloaded archive");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::edition::DatabaseKind;
    use crate::test_support::archives::tar_gz_bytes;
    use std::fs;
    use tempfile::TempDir;

    struct Workspace {
        _temp: TempDir,
        dest_root: std::path::PathBuf,
        tmp: std::path::PathBuf,
    }

    impl Workspace {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let dest_root = temp.path().join("dest");
            let tmp = temp.path().join("tmp");
            fs::create_dir(&dest_root).unwrap();
            fs::create_dir(&tmp).unwrap();
            Self {
                _temp: temp,
                dest_root,
                tmp,
            }
        }

        fn write_archive(&self, name: &str, bytes: &[u8]) -> std::path::PathBuf {
            let path = self.tmp.join(name);
            fs::write(&path, bytes).unwrap();
            path
        }

        fn edition_a() -> Edition {
            Edition::new("EditionA", DatabaseKind::Binary, ArchiveKind::TarGz)
        }

        fn tmp_entries(&self) -> usize {
            fs::read_dir(&self.tmp).unwrap().count()
        }
    }

    #[test]
    fn test_unpack_installs_data_files_only_and_cleans_up() {
        let ws = Workspace::new();
        let archive = ws.write_archive(
            "EditionA.tar.gz",
            &tar_gz_bytes(&[
                ("EditionA_20240101/EditionA.mmdb", b"mmdb"),
                ("EditionA_20240101/COPYRIGHT.txt", b"copyright"),
            ]),
        );
        let destination = ws.dest_root.join("EditionA");

        let report = unpack(&archive, &Workspace::edition_a(), &destination, &ws.tmp).unwrap();

        assert_eq!(report, UnpackReport { files: 1, replaced: false });
        assert_eq!(fs::read(destination.join("EditionA.mmdb")).unwrap(), b"mmdb");
        assert!(!destination.join("COPYRIGHT.txt").exists());
        assert!(!archive.exists());
        assert_eq!(ws.tmp_entries(), 0);
    }

    #[test]
    fn test_unpack_missing_edition_dir_keeps_destination() {
        let ws = Workspace::new();
        let archive = ws.write_archive(
            "EditionA.tar.gz",
            &tar_gz_bytes(&[("SomethingElse_1/data.mmdb", b"x")]),
        );
        let destination = ws.dest_root.join("EditionA");
        fs::create_dir(&destination).unwrap();
        fs::write(destination.join("EditionA.mmdb"), b"old").unwrap();

        let err = unpack(&archive, &Workspace::edition_a(), &destination, &ws.tmp).unwrap_err();

        assert!(matches!(err, ArchiveError::MissingEditionDir { .. }));
        assert_eq!(fs::read(destination.join("EditionA.mmdb")).unwrap(), b"old");
        assert!(!archive.exists());
        assert_eq!(ws.tmp_entries(), 0);
    }

    #[test]
    fn test_unpack_ambiguous_layout_is_error() {
        let ws = Workspace::new();
        let archive = ws.write_archive(
            "EditionA.tar.gz",
            &tar_gz_bytes(&[
                ("EditionA_20240101/a.mmdb", b"a"),
                ("EditionA_20240102/b.mmdb", b"b"),
            ]),
        );
        let destination = ws.dest_root.join("EditionA");

        let err = unpack(&archive, &Workspace::edition_a(), &destination, &ws.tmp).unwrap_err();

        match err {
            ArchiveError::AmbiguousLayout { candidates, .. } => assert_eq!(candidates.len(), 2),
            other => panic!("Expected AmbiguousLayout, got: {other:?}"),
        }
        assert!(!destination.exists());
    }

    #[test]
    fn test_unpack_unknown_suffix_is_unsupported() {
        let ws = Workspace::new();
        let archive = ws.write_archive("EditionA.rar", b"rar");
        let destination = ws.dest_root.join("EditionA");

        let err = unpack(&archive, &Workspace::edition_a(), &destination, &ws.tmp).unwrap_err();

        assert!(matches!(err, ArchiveError::UnsupportedKind { .. }));
        assert!(!archive.exists());
    }

    #[test]
    fn test_unpack_corrupt_archive_cleans_up() {
        let ws = Workspace::new();
        let archive = ws.write_archive("EditionA.tar.gz", b"garbage");
        let destination = ws.dest_root.join("EditionA");

        let err = unpack(&archive, &Workspace::edition_a(), &destination, &ws.tmp).unwrap_err();

        assert!(matches!(err, ArchiveError::Decode { .. }));
        assert_eq!(ws.tmp_entries(), 0);
    }

    #[test]
    fn test_supports_tar_gz_always() {
        assert!(supports(ArchiveKind::TarGz));
        assert_eq!(supports(ArchiveKind::Zip), cfg!(feature = "zip"));
    }
}
