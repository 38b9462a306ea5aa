//! Container decoders. Both refuse entries that would land outside the target.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::debug;

use super::error::ArchiveError;
use crate::edition::ArchiveKind;

/// Decodes `archive` completely into `target`, which must already exist.
pub(crate) fn decode(archive: &Path, kind: ArchiveKind, target: &Path) -> Result<(), ArchiveError> {
    debug!(archive = %archive.display(), %kind, target = %target.display(), "decoding archive");
    match kind {
        ArchiveKind::TarGz => decode_tar_gz(archive, target),
        ArchiveKind::Zip => decode_zip(archive, target),
    }
}

fn decode_tar_gz(archive: &Path, target: &Path) -> Result<(), ArchiveError> {
    let file = File::open(archive).map_err(ArchiveError::io(archive))?;
    let mut tarball = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    tarball.set_preserve_permissions(false);
    tarball.set_overwrite(true);
    // `unpack` skips entries containing `..` or absolute paths.
    tarball
        .unpack(target)
        .map_err(|error| decode_error(archive, ArchiveKind::TarGz, &error))
}

#[cfg(feature = "zip")]
fn decode_zip(archive: &Path, target: &Path) -> Result<(), ArchiveError> {
    use std::{fs, io};
    use tracing::warn;

    let file = File::open(archive).map_err(ArchiveError::io(archive))?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|error| decode_error(archive, ArchiveKind::Zip, &error))?;

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|error| decode_error(archive, ArchiveKind::Zip, &error))?;

        let Some(relative) = entry.enclosed_name() else {
            warn!(entry = entry.name(), "skipping zip entry outside the extraction root");
            continue;
        };
        let out_path = target.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(ArchiveError::io(&out_path))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(ArchiveError::io(parent))?;
        }
        let mut out = File::create(&out_path).map_err(ArchiveError::io(&out_path))?;
        io::copy(&mut entry, &mut out)
            .map_err(|error| decode_error(archive, ArchiveKind::Zip, &error))?;
    }
    Ok(())
}

#[cfg(not(feature = "zip"))]
fn decode_zip(archive: &Path, _target: &Path) -> Result<(), ArchiveError> {
    Err(ArchiveError::UnsupportedKind {
        path: archive.to_path_buf(),
    })
}

fn decode_error(archive: &Path, kind: ArchiveKind, error: &dyn std::fmt::Display) -> ArchiveError {
    ArchiveError::Decode {
        path: archive.to_path_buf(),
        kind,
        reason: error.to_string(),
    }
}
