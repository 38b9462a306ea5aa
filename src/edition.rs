//! Edition catalog: which database editions exist and how they are shipped.
//!
//! The catalog is an immutable lookup table injected into the
//! [`Updater`](crate::updater::Updater), so tests can substitute their own
//! editions without touching the remote service.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Editions processed when the configuration does not list any.
pub const DEFAULT_EDITIONS: [&str; 3] = ["GeoLite2-ASN", "GeoLite2-City", "GeoLite2-Country"];

/// Binary editions published by the reference distribution service.
/// Each one also has a `-CSV` tabular variant.
const MAXMIND_EDITIONS: &[&str] = &[
    "GeoLite2-ASN",
    "GeoLite2-City",
    "GeoLite2-Country",
    "GeoIP2-ASN",
    "GeoIP2-City",
    "GeoIP2-Country",
    "GeoIP2-Anonymous-IP",
    "GeoIP2-Connection-Type",
    "GeoIP2-Domain",
    "GeoIP2-Enterprise",
    "GeoIP2-ISP",
];

const TABULAR_SUFFIX: &str = "-CSV";

/// Kind of database contained in an edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseKind {
    /// Binary lookup database (`.mmdb`).
    Binary,
    /// Tabular export (`.csv` files).
    Tabular,
}

impl DatabaseKind {
    /// Returns the file extension of the data files this kind installs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "mmdb",
            Self::Tabular => "csv",
        }
    }
}

/// Container format an edition is shipped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// Gzip-compressed tarball.
    TarGz,
    /// Zip archive.
    Zip,
}

impl ArchiveKind {
    /// File extension (without the leading dot), also sent as the `suffix` query value.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }

    /// Detects the archive kind from a path suffix.
    ///
    /// Returns `None` for any suffix other than `.tar.gz`, `.tgz` or `.zip`.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A database edition known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edition {
    /// Identifier used by the remote service, e.g. `GeoLite2-City`.
    pub id: String,
    /// What the edition contains.
    pub database: DatabaseKind,
    /// How the edition is packaged.
    pub archive: ArchiveKind,
}

impl Edition {
    /// Creates an edition entry.
    #[must_use]
    pub fn new(id: impl Into<String>, database: DatabaseKind, archive: ArchiveKind) -> Self {
        Self {
            id: id.into(),
            database,
            archive,
        }
    }

    /// Staging file name for this edition's archive, e.g. `GeoLite2-City.tar.gz`.
    #[must_use]
    pub fn archive_file_name(&self) -> String {
        format!("{}.{}", self.id, self.archive.extension())
    }
}

/// Immutable lookup table of supported editions.
#[derive(Debug, Clone, Default)]
pub struct EditionCatalog {
    editions: HashMap<String, Edition>,
}

impl EditionCatalog {
    /// Creates a catalog from explicit entries. Later duplicates replace earlier ones.
    #[must_use]
    pub fn new(editions: impl IntoIterator<Item = Edition>) -> Self {
        Self {
            editions: editions
                .into_iter()
                .map(|edition| (edition.id.clone(), edition))
                .collect(),
        }
    }

    /// The editions published by MaxMind's download service.
    ///
    /// Binary editions ship as `tar.gz`; their `-CSV` variants ship as `zip`.
    #[must_use]
    pub fn maxmind() -> Self {
        Self::new(MAXMIND_EDITIONS.iter().flat_map(|id| {
            [
                Edition::new(*id, DatabaseKind::Binary, ArchiveKind::TarGz),
                Edition::new(
                    format!("{id}{TABULAR_SUFFIX}"),
                    DatabaseKind::Tabular,
                    ArchiveKind::Zip,
                ),
            ]
        }))
    }

    /// Looks up an edition by exact identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Edition> {
        self.editions.get(id)
    }

    /// Number of editions in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.editions.len()
    }

    /// Returns true when the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.editions.is_empty()
    }
}
