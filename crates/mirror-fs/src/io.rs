//! Atomic I/O operations and rename-based file replacement

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::time::SystemTime;

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::{Error, NormalizedPath, Result};

/// Prefix for staged downloads, keeps them hidden next to their destination.
const STAGING_PREFIX: &str = ".mirror-";
const STAGING_SUFFIX: &str = ".part";

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock to prevent concurrent access.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    // Ensure parent directory exists
    if let Some(parent) = native_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Generate temp file path in same directory (ensures same filesystem)
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    if let Err(e) = fs::rename(&temp_path, &native_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&native_path, e));
    }

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Whether `name` is a staging file left by [`StagedFile`].
pub fn is_staging_name(name: &str) -> bool {
    name.starts_with(STAGING_PREFIX) && name.ends_with(STAGING_SUFFIX)
}

/// A download being written next to its final destination.
///
/// The file lives in the destination's directory so that promoting it is a
/// single rename on the same filesystem. Dropping an unpromoted staged file
/// deletes it.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
}

impl StagedFile {
    /// Create an empty staging file in the parent directory of `dest`.
    ///
    /// Missing parent directories are created.
    pub fn for_destination(dest: &NormalizedPath) -> Result<Self> {
        let native = dest.to_native();
        let dir = native
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| ".".into());
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

        let temp = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&dir)
            .map_err(|e| Error::io(&dir, e))?;
        Ok(Self { temp })
    }

    /// Path of the staging file on disk.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Writer for the staged content.
    pub fn writer(&mut self) -> &mut File {
        self.temp.as_file_mut()
    }

    /// Flush staged content to disk.
    pub fn finish(&mut self) -> Result<()> {
        let path = self.temp.path().to_path_buf();
        self.temp
            .as_file_mut()
            .flush()
            .and_then(|_| self.temp.as_file().sync_all())
            .map_err(|e| Error::io(path, e))
    }

    /// Whether the staged bytes equal the file at `other`.
    pub fn content_equals(&self, other: &NormalizedPath) -> Result<bool> {
        files_equal(self.temp.path(), &other.to_native())
    }

    /// Rename the staged file onto `dest`, replacing anything there.
    pub fn promote(self, dest: &NormalizedPath) -> Result<()> {
        let native = dest.to_native();
        self.temp
            .persist(&native)
            .map_err(|e| Error::io(&native, e.error))?;
        Ok(())
    }

    /// Delete the staged file.
    pub fn discard(self) -> Result<()> {
        let path = self.temp.path().to_path_buf();
        self.temp.close().map_err(|e| Error::io(path, e))
    }
}

/// Rename `path` to `path + suffix`, deleting an older file of that name.
///
/// Returns the backup path.
pub fn move_aside(path: &NormalizedPath, suffix: &str) -> Result<NormalizedPath> {
    let backup = path.with_suffix(suffix);
    let backup_native = backup.to_native();

    match fs::remove_file(&backup_native) {
        Ok(()) => tracing::debug!(path = %backup, "removed stale backup"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io(&backup_native, e)),
    }

    fs::rename(path.to_native(), &backup_native).map_err(|e| Error::io(&backup_native, e))?;
    Ok(backup)
}

/// Byte-for-byte comparison of two files.
///
/// Sizes are compared first, so differing lengths never read content.
pub fn files_equal(a: &Path, b: &Path) -> Result<bool> {
    let meta_a = fs::metadata(a).map_err(|e| Error::io(a, e))?;
    let meta_b = fs::metadata(b).map_err(|e| Error::io(b, e))?;
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }

    let mut reader_a = BufReader::new(File::open(a).map_err(|e| Error::io(a, e))?);
    let mut reader_b = BufReader::new(File::open(b).map_err(|e| Error::io(b, e))?);
    let mut buf_a = [0u8; 8192];
    let mut buf_b = [0u8; 8192];

    loop {
        let n = reader_a.read(&mut buf_a).map_err(|e| Error::io(a, e))?;
        if n == 0 {
            return Ok(true);
        }
        reader_b
            .read_exact(&mut buf_b[..n])
            .map_err(|e| Error::io(b, e))?;
        if buf_a[..n] != buf_b[..n] {
            return Ok(false);
        }
    }
}

/// Modification time of a file, or `None` if it does not exist.
pub fn modified_time(path: &NormalizedPath) -> Result<Option<SystemTime>> {
    let native = path.to_native();
    match fs::metadata(&native) {
        Ok(meta) => meta
            .modified()
            .map(Some)
            .map_err(|e| Error::io(&native, e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(&native, e)),
    }
}

/// Set the modification time of an existing file.
pub fn set_modified_time(path: &NormalizedPath, time: SystemTime) -> Result<()> {
    let native = path.to_native();
    let file = OpenOptions::new()
        .write(true)
        .open(&native)
        .map_err(|e| Error::io(&native, e))?;
    file.set_modified(time).map_err(|e| Error::io(&native, e))
}
