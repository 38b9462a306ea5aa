//! Persisted record of the last synchronized version of each edition.
//!
//! The record is a line-oriented text file at the destination root, one
//! `editionId:marker` line per edition. Identifiers are matched exactly on
//! the field before the first `:`, so `GeoLite2-ASN` never matches a
//! `GeoLite2-ASN-CSV` line.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

/// Name of the version record file inside the destination root.
pub const VERSION_FILE_NAME: &str = "versions.txt";

/// Remote revision of an edition, as Unix seconds of its `Last-Modified` time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionMarker(pub u64);

impl fmt::Display for VersionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VersionMarker {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Errors reading or writing the version record.
#[derive(Debug, Error)]
pub enum VersionStoreError {
    /// The record file exists but could not be read.
    #[error("failed to read version record {path}: {source}")]
    Read {
        /// Path of the record file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The record file could not be written or replaced.
    #[error("failed to write version record {path}: {source}")]
    Write {
        /// Path of the record file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Version record stored in a destination root.
#[derive(Debug, Clone)]
pub struct VersionStore {
    root: PathBuf,
    path: PathBuf,
}

impl VersionStore {
    /// Creates a store for the given destination root. Nothing is touched on disk.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let path = root.join(VERSION_FILE_NAME);
        Self { root, path }
    }

    /// Path of the record file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored marker for `edition_id`, if any.
    ///
    /// When several lines match, the last one wins. A marker that does not
    /// parse is treated as absent so the edition gets refreshed.
    ///
    /// # Errors
    ///
    /// Returns [`VersionStoreError::Read`] if the record exists but cannot be read.
    pub fn read_version(&self, edition_id: &str) -> Result<Option<VersionMarker>, VersionStoreError> {
        let lines = self.load_lines()?;
        let matches: Vec<&str> = lines
            .iter()
            .filter_map(|line| marker_field(line, edition_id))
            .collect();

        if matches.len() > 1 {
            warn!(
                edition = edition_id,
                count = matches.len(),
                path = %self.path.display(),
                "duplicate version records, using the last one"
            );
        }

        let Some(raw) = matches.last() else {
            return Ok(None);
        };
        match raw.parse::<VersionMarker>() {
            Ok(marker) => Ok(Some(marker)),
            Err(error) => {
                warn!(
                    edition = edition_id,
                    value = %raw,
                    error = %error,
                    "unparsable version marker, treating edition as never synchronized"
                );
                Ok(None)
            }
        }
    }

    /// Records `marker` as the current version of `edition_id`.
    ///
    /// Every existing line for the edition is dropped, lines for other
    /// editions are kept verbatim, and the file is replaced in one rename.
    ///
    /// # Errors
    ///
    /// Returns [`VersionStoreError`] if the record cannot be read or replaced.
    pub fn write_version(
        &self,
        edition_id: &str,
        marker: VersionMarker,
    ) -> Result<(), VersionStoreError> {
        let mut lines: Vec<String> = self
            .load_lines()?
            .into_iter()
            .filter(|line| marker_field(line, edition_id).is_none())
            .collect();
        lines.push(format!("{edition_id}:{marker}"));

        let mut content = lines.join("\n");
        content.push('\n');
        self.replace_contents(content.as_bytes())
            .map_err(|source| VersionStoreError::Write {
                path: self.path.clone(),
                source,
            })?;

        debug!(edition = edition_id, %marker, "version record updated");
        Ok(())
    }

    /// Checks that a file can be created in the destination root.
    ///
    /// # Errors
    ///
    /// Returns the IO error raised while creating the probe file.
    pub fn check_writable(&self) -> io::Result<()> {
        NamedTempFile::new_in(&self.root).map(drop)
    }

    /// Checks that the record, when present, can be read.
    ///
    /// # Errors
    ///
    /// Returns [`VersionStoreError::Read`] if the record exists but cannot be read.
    pub fn check_readable(&self) -> Result<(), VersionStoreError> {
        self.load_lines().map(drop)
    }

    fn load_lines(&self) -> Result<Vec<String>, VersionStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(raw
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(ToString::to_string)
                .collect()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(VersionStoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn replace_contents(&self, content: &[u8]) -> io::Result<()> {
        let mut staged = NamedTempFile::new_in(&self.root)?;
        staged.write_all(content)?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|error| error.error)?;
        Ok(())
    }
}

/// Returns the marker part of `line` when its identifier is exactly `edition_id`.
fn marker_field<'a>(line: &'a str, edition_id: &str) -> Option<&'a str> {
    let (id, marker) = line.split_once(':')?;
    (id.trim() == edition_id).then_some(marker.trim())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, VersionStore) {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path());
        (temp, store)
    }

    #[test]
    fn test_read_version_without_record_file() {
        let (_temp, store) = store();
        assert_eq!(store.read_version("GeoLite2-City").unwrap(), None);
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let (_temp, store) = store();
        store
            .write_version("GeoLite2-City", VersionMarker(1_704_067_200))
            .unwrap();
        assert_eq!(
            store.read_version("GeoLite2-City").unwrap(),
            Some(VersionMarker(1_704_067_200))
        );
        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "GeoLite2-City:1704067200\n");
    }

    #[test]
    fn test_write_does_not_touch_prefix_named_edition() {
        let (_temp, store) = store();
        store.write_version("GeoLite2-ASN", VersionMarker(100)).unwrap();
        store
            .write_version("GeoLite2-ASN-CSV", VersionMarker(200))
            .unwrap();
        store
            .write_version("GeoLite2-ASN-CSV", VersionMarker(300))
            .unwrap();

        assert_eq!(
            store.read_version("GeoLite2-ASN").unwrap(),
            Some(VersionMarker(100))
        );
        assert_eq!(
            store.read_version("GeoLite2-ASN-CSV").unwrap(),
            Some(VersionMarker(300))
        );

        store.write_version("GeoLite2-ASN", VersionMarker(400)).unwrap();
        assert_eq!(
            store.read_version("GeoLite2-ASN-CSV").unwrap(),
            Some(VersionMarker(300))
        );
    }

    #[test]
    fn test_last_duplicate_wins_and_rewrite_collapses_duplicates() {
        let (_temp, store) = store();
        fs::write(
            store.path(),
            "GeoLite2-City:1\nGeoLite2-Country:5\nGeoLite2-City:2\n",
        )
        .unwrap();

        assert_eq!(
            store.read_version("GeoLite2-City").unwrap(),
            Some(VersionMarker(2))
        );

        store.write_version("GeoLite2-City", VersionMarker(3)).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "GeoLite2-Country:5\nGeoLite2-City:3\n");
    }

    #[test]
    fn test_unrelated_lines_preserved_verbatim() {
        let (_temp, store) = store();
        fs::write(store.path(), "Legacy-Edition:abc\nnot a record\n").unwrap();

        store.write_version("GeoLite2-City", VersionMarker(9)).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "Legacy-Edition:abc\nnot a record\nGeoLite2-City:9\n");
    }

    #[test]
    fn test_unparsable_marker_reads_as_absent() {
        let (_temp, store) = store();
        fs::write(store.path(), "GeoLite2-City:yesterday\n").unwrap();
        assert_eq!(store.read_version("GeoLite2-City").unwrap(), None);
    }

    #[test]
    fn test_check_writable_on_missing_root_fails() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path().join("missing"));
        assert!(store.check_writable().is_err());
    }

    #[test]
    fn test_check_writable_leaves_no_probe_file() {
        let (temp, store) = store();
        store.check_writable().unwrap();
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_version_marker_parse_and_display() {
        let marker: VersionMarker = " 1700000000 ".parse().unwrap();
        assert_eq!(marker, VersionMarker(1_700_000_000));
        assert_eq!(marker.to_string(), "1700000000");
        assert!("-1".parse::<VersionMarker>().is_err());
    }
}
