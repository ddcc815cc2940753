//! [`TestMirror`] temporary mirror root.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use mirror_fs::{NormalizedPath, io};
use tempfile::TempDir;

/// A temporary mirror root with helpers for setup and assertion.
pub struct TestMirror {
    temp_dir: TempDir,
}

impl Default for TestMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl TestMirror {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, rel: &str, content: impl AsRef<[u8]>) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel))
            .unwrap_or_else(|e| panic!("cannot read {rel}: {e}"))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// Set a file's mtime to `secs` seconds after the Unix epoch.
    pub fn set_mtime(&self, rel: &str, secs: u64) {
        let when = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
        io::set_modified_time(&NormalizedPath::new(self.path(rel)), when).unwrap();
    }

    /// A file's mtime in seconds after the Unix epoch.
    pub fn mtime(&self, rel: &str) -> u64 {
        fs::metadata(self.path(rel))
            .unwrap()
            .modified()
            .unwrap()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    /// Relative paths of all `.moved` files.
    pub fn moved_files(&self) -> Vec<String> {
        mirror_core::find_moved(self.root())
            .unwrap()
            .into_iter()
            .map(|p| {
                p.strip_prefix(self.root())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    pub fn assert_file(&self, rel: &str, expected: &str) {
        assert_eq!(self.read(rel), expected, "content of {rel}");
    }
}
