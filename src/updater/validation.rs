//! Run-level checks performed once before any edition is touched.

use std::path::Path;

use tempfile::NamedTempFile;

use crate::config::UpdaterConfig;
use crate::version_store::VersionStore;

/// Returns one fatal message per problem; empty when the run may proceed.
pub(crate) fn validate(config: &UpdaterConfig, store: &VersionStore, tmp_dir: &Path) -> Vec<String> {
    let mut problems = Vec::new();

    if config.license_key.trim().is_empty() {
        problems.push("License key not specified.".to_string());
    }
    if config.editions.is_empty() {
        problems.push("No editions specified.".to_string());
    }

    if config.dir.as_os_str().is_empty() {
        problems.push("Destination directory not specified.".to_string());
    } else if !config.dir.is_dir() {
        problems.push(format!(
            "Destination directory {} does not exist.",
            config.dir.display()
        ));
    } else if store.check_writable().is_err() {
        problems.push(format!(
            "Destination directory {} is not writable.",
            config.dir.display()
        ));
    } else if store.check_readable().is_err() {
        problems.push(format!(
            "Version record {} cannot be read.",
            store.path().display()
        ));
    }

    if tmp_dir.as_os_str().is_empty() {
        problems.push("Temporary directory not specified.".to_string());
    } else if !tmp_dir.is_dir() {
        problems.push(format!(
            "Temporary directory {} does not exist.",
            tmp_dir.display()
        ));
    } else if NamedTempFile::new_in(tmp_dir).is_err() {
        problems.push(format!(
            "Temporary directory {} is not writable.",
            tmp_dir.display()
        ));
    }

    problems
}
