//! Installing extracted files as the edition's destination directory.
//!
//! The destination becomes an exact mirror of the data files in the
//! archive's edition directory. Files are first gathered in a hidden sibling
//! directory, then swapped in with renames, so readers see either the old or
//! the new set.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

use super::error::ArchiveError;
use crate::edition::DatabaseKind;

/// Moves the data files of `source_dir` into `destination`, replacing it.
///
/// Only regular files carrying the extension of `database` are kept.
/// Notices, nested directories, symlinks and other entries are discarded.
/// Returns the number of installed files and whether an existing copy was
/// replaced.
pub(crate) fn install_files(
    source_dir: &Path,
    destination: &Path,
    edition_id: &str,
    database: DatabaseKind,
) -> Result<(usize, bool), ArchiveError> {
    let parent = destination.parent().ok_or_else(|| ArchiveError::Io {
        path: destination.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent"),
    })?;

    let incoming = tempfile::Builder::new()
        .prefix(&format!(".{edition_id}.incoming"))
        .tempdir_in(parent)
        .map_err(ArchiveError::io(parent))?;

    let mut installed = 0usize;
    for entry in fs::read_dir(source_dir).map_err(ArchiveError::io(source_dir))? {
        let entry = entry.map_err(ArchiveError::io(source_dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(ArchiveError::io(&path))?;
        if !file_type.is_file() || !is_data_file(&path, database) {
            debug!(path = %path.display(), "discarding auxiliary archive entry");
            continue;
        }
        move_file(&path, &incoming.path().join(entry.file_name()))?;
        installed += 1;
    }

    if installed == 0 {
        return Err(ArchiveError::NoDataFiles {
            edition: edition_id.to_string(),
        });
    }

    let replaced = swap_into_place(incoming.path(), destination, parent, edition_id)?;
    // The guard's own cleanup finds nothing left to remove after the swap.
    drop(incoming);

    Ok((installed, replaced))
}

fn is_data_file(path: &Path, database: DatabaseKind) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(database.as_str()))
}

/// Renames `incoming` to `destination`, restoring the previous copy on failure.
fn swap_into_place(
    incoming: &Path,
    destination: &Path,
    parent: &Path,
    edition_id: &str,
) -> Result<bool, ArchiveError> {
    let previous = parent.join(format!(".{edition_id}.previous"));
    remove_any(&previous).map_err(ArchiveError::io(&previous))?;

    let replaced = match fs::symlink_metadata(destination) {
        Ok(_) => {
            fs::rename(destination, &previous).map_err(ArchiveError::io(destination))?;
            true
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => false,
        Err(source) => {
            return Err(ArchiveError::Io {
                path: destination.to_path_buf(),
                source,
            });
        }
    };

    if let Err(source) = fs::rename(incoming, destination) {
        if replaced && let Err(restore) = fs::rename(&previous, destination) {
            warn!(
                path = %destination.display(),
                error = %restore,
                "failed to restore previous copy"
            );
        }
        return Err(ArchiveError::Io {
            path: destination.to_path_buf(),
            source,
        });
    }

    if let Err(error) = remove_any(&previous) {
        warn!(path = %previous.display(), %error, "failed to remove previous copy");
    }
    Ok(replaced)
}

/// Renames a file, falling back to copy and delete across filesystems.
fn move_file(from: &Path, to: &Path) -> Result<(), ArchiveError> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(ArchiveError::io(to))?;
    fs::remove_file(from).map_err(ArchiveError::io(from))?;
    Ok(())
}

/// Removes a file or directory tree, ignoring a missing path.
fn remove_any(path: &Path) -> io::Result<()> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(error) => Err(error),
    };
    match result {
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
