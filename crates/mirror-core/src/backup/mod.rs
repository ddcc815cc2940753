//! `.moved` backups
//!
//! A replaced file's previous version is renamed to `<name>.moved` next to
//! it. Any such file under a mirror root blocks the next sync until the
//! operator has reviewed and removed (or restored) it.
//!
//! A file named exactly `.moved` is not a backup: there is no original name
//! to restore it to, so it neither blocks a sync nor shows up in listings.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{Error, Result};

/// Suffix of backup files.
pub const MOVED_SUFFIX: &str = ".moved";

/// Whether a file name is a `.moved` backup.
pub fn is_moved_name(name: &str) -> bool {
    name.len() > MOVED_SUFFIX.len() && name.ends_with(MOVED_SUFFIX)
}

/// All `.moved` files under `root`, sorted. A missing root has none.
pub fn find_moved(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            match e.into_io_error() {
                Some(source) => Error::Fs(mirror_fs::Error::io(path, source)),
                None => Error::InvalidRoot {
                    path,
                    reason: "filesystem loop".into(),
                },
            }
        })?;
        if entry.file_type().is_file() && is_moved_name(&entry.file_name().to_string_lossy()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

/// Delete the given backups, returning how many were removed.
pub fn remove_moved(files: &[PathBuf]) -> Result<usize> {
    let mut removed = 0;
    for file in files {
        ensure_moved(file)?;
        fs::remove_file(file).map_err(|e| mirror_fs::Error::io(file, e))?;
        tracing::info!(path = %file.display(), "removed backup");
        removed += 1;
    }
    Ok(removed)
}

/// Rename a backup back over the file it was taken from.
///
/// Returns the restored path.
pub fn restore_moved(file: &Path) -> Result<PathBuf> {
    ensure_moved(file)?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let original = file.with_file_name(&name[..name.len() - MOVED_SUFFIX.len()]);
    fs::rename(file, &original).map_err(|e| mirror_fs::Error::io(&original, e))?;
    tracing::info!(path = %original.display(), "restored backup");
    Ok(original)
}

fn ensure_moved(file: &Path) -> Result<()> {
    let ok = file
        .file_name()
        .map(|n| is_moved_name(&n.to_string_lossy()))
        .unwrap_or(false);
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidRoot {
            path: file.to_path_buf(),
            reason: format!("not a {MOVED_SUFFIX} backup"),
        })
    }
}
