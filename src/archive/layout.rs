//! Locating the edition's directory inside an extracted archive.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;

/// Result of looking for the edition's top-level directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditionDirMatch {
    /// Exactly one directory matched.
    Found(PathBuf),
    /// No directory matched.
    NotFound,
    /// Several directories matched, sorted by path.
    Ambiguous(Vec<PathBuf>),
}

/// Finds the top-level directory of `staging` named after `edition_id`,
/// optionally followed by a release stamp made of `_` and digits
/// (`GeoLite2-City`, `GeoLite2-City_20240102`).
///
/// Only direct children are considered. Symlinks are never followed.
///
/// # Errors
///
/// Returns the IO error raised while listing `staging`.
pub fn find_edition_dir(staging: &Path, edition_id: &str) -> io::Result<EditionDirMatch> {
    let pattern = Regex::new(&format!("^{}[_0-9]*$", regex::escape(edition_id)))
        .map_err(io::Error::other)?;

    let mut candidates = Vec::new();
    for entry in fs::read_dir(staging)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(|name| pattern.is_match(name)) {
            candidates.push(entry.path());
        }
    }
    candidates.sort();

    Ok(match candidates.len() {
        0 => EditionDirMatch::NotFound,
        1 => EditionDirMatch::Found(candidates.remove(0)),
        _ => EditionDirMatch::Ambiguous(candidates),
    })
}
