//! Typed updater configuration.
//!
//! The configuration is a fixed set of recognized fields. Any other key is a
//! parse error rather than something silently ignored.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::edition::DEFAULT_EDITIONS;

/// Default download endpoint of the distribution service.
pub const DEFAULT_BASE_URL: &str = "https://download.maxmind.com/app/geoip_download";

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON or contains unknown or mistyped keys.
    #[error("invalid configuration{}: {source}", .path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    Parse {
        /// Path of the configuration file, when loaded from disk.
        path: Option<PathBuf>,
        /// The underlying parse error (names the offending key).
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration for one updater run.
///
/// JSON form:
///
/// ```json
/// {
///     "license_key": "xxxx",
///     "dir": "/var/lib/geoip",
///     "editions": ["GeoLite2-City", "GeoLite2-Country"],
///     "tmpDir": "/tmp"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdaterConfig {
    /// Account license key forwarded to the remote service.
    #[serde(default)]
    pub license_key: String,

    /// Editions to process, in order, without duplicates.
    #[serde(default = "default_editions", deserialize_with = "deserialize_editions")]
    pub editions: Vec<String>,

    /// Destination root holding one directory per edition.
    #[serde(default)]
    pub dir: PathBuf,

    /// Staging area for downloads and extraction (platform temp dir when unset).
    #[serde(default, alias = "tmpDir")]
    pub tmp_dir: Option<PathBuf>,

    /// Download endpoint override.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl UpdaterConfig {
    /// Creates a configuration with the default edition list.
    #[must_use]
    pub fn new(license_key: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            license_key: license_key.into(),
            editions: default_editions(),
            dir: dir.into(),
            tmp_dir: None,
            base_url: None,
        }
    }

    /// Replaces the edition list. Duplicates are collapsed, keeping first occurrence order.
    #[must_use]
    pub fn with_editions<I, S>(mut self, editions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.editions = dedupe_editions(editions.into_iter().map(Into::into));
        self
    }

    /// Sets the staging directory.
    #[must_use]
    pub fn with_tmp_dir(mut self, tmp_dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = Some(tmp_dir.into());
        self
    }

    /// Sets the download endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, mistyped values or
    /// unrecognized keys.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::Parse { path: None, source })
    }

    /// Loads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if its content is invalid.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    /// Staging directory, falling back to the platform temp directory.
    #[must_use]
    pub fn resolved_tmp_dir(&self) -> PathBuf {
        self.tmp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Download endpoint, falling back to [`DEFAULT_BASE_URL`].
    #[must_use]
    pub fn resolved_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

fn default_editions() -> Vec<String> {
    DEFAULT_EDITIONS.iter().map(ToString::to_string).collect()
}

fn deserialize_editions<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(dedupe_editions(raw.into_iter()))
}

fn dedupe_editions(editions: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    editions
        .map(|edition| edition.trim().to_string())
        .filter(|edition| !edition.is_empty() && seen.insert(edition.clone()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_json_minimal_uses_defaults() {
        let config =
            UpdaterConfig::from_json_str(r#"{"license_key": "abc", "dir": "/data"}"#).unwrap();
        assert_eq!(config.license_key, "abc");
        assert_eq!(config.dir, PathBuf::from("/data"));
        assert_eq!(config.editions, default_editions());
        assert!(config.tmp_dir.is_none());
        assert_eq!(config.resolved_base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_from_json_accepts_tmp_dir_alias() {
        let config = UpdaterConfig::from_json_str(
            r#"{"license_key": "abc", "dir": "/data", "tmpDir": "/scratch"}"#,
        )
        .unwrap();
        assert_eq!(config.tmp_dir, Some(PathBuf::from("/scratch")));
        assert_eq!(config.resolved_tmp_dir(), PathBuf::from("/scratch"));

        let config = UpdaterConfig::from_json_str(
            r#"{"license_key": "abc", "dir": "/data", "tmp_dir": "/scratch2"}"#,
        )
        .unwrap();
        assert_eq!(config.tmp_dir, Some(PathBuf::from("/scratch2")));
    }

    #[test]
    fn test_from_json_rejects_unknown_key() {
        let err = UpdaterConfig::from_json_str(
            r#"{"license_key": "abc", "dir": "/data", "type": "mmdb"}"#,
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, ConfigError::Parse { path: None, .. }));
        assert!(msg.contains("unknown field"), "Expected unknown field in: {msg}");
        assert!(msg.contains("type"), "Expected key name in: {msg}");
    }

    #[test]
    fn test_from_json_collapses_duplicate_editions_in_order() {
        let config = UpdaterConfig::from_json_str(
            r#"{"license_key": "k", "dir": "/d", "editions": ["B", "A", "B", " A ", "", "C"]}"#,
        )
        .unwrap();
        assert_eq!(config.editions, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_from_json_keeps_explicit_empty_edition_list() {
        let config =
            UpdaterConfig::from_json_str(r#"{"license_key": "k", "dir": "/d", "editions": []}"#)
                .unwrap();
        assert!(config.editions.is_empty());
    }

    #[test]
    fn test_missing_license_key_parses_as_empty() {
        let config = UpdaterConfig::from_json_str(r#"{"dir": "/d"}"#).unwrap();
        assert!(config.license_key.is_empty());
    }

    #[test]
    fn test_from_file_reports_path_on_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("geoip2.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = UpdaterConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("geoip2.json"));
    }

    #[test]
    fn test_from_file_missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let err = UpdaterConfig::from_file(&temp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_builder_dedupes_editions() {
        let config = UpdaterConfig::new("k", "/d")
            .with_editions(["GeoLite2-City", "GeoLite2-City", "GeoLite2-ASN"])
            .with_tmp_dir("/t")
            .with_base_url("http://127.0.0.1:9/download");
        assert_eq!(config.editions, vec!["GeoLite2-City", "GeoLite2-ASN"]);
        assert_eq!(config.resolved_tmp_dir(), PathBuf::from("/t"));
        assert_eq!(config.resolved_base_url(), "http://127.0.0.1:9/download");
    }
}
