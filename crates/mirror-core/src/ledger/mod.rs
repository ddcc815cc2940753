//! Revision ledger
//!
//! A small TOML file at the mirror root recording, per source, the last
//! revision token that was synced completely. One table per source, so a
//! second source simply appends a table.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use mirror_fs::{NormalizedPath, io};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// File name of the ledger inside a mirror root.
pub const LEDGER_FILE: &str = ".mirror-ledger.toml";

const LEDGER_VERSION: &str = "1";

/// One synced source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Revision token reported by the root listing page
    pub revision: String,
    /// Root URL that was synced
    pub url: String,
    /// When the sync completed
    pub synced_at: DateTime<Utc>,
}

/// Source name to last fully synced revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionLedger {
    /// Ledger format version for forward compatibility
    version: String,
    #[serde(default)]
    revisions: BTreeMap<String, LedgerEntry>,
}

impl Default for RevisionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl RevisionLedger {
    /// Create a new empty ledger
    pub fn new() -> Self {
        Self {
            version: LEDGER_VERSION.to_string(),
            revisions: BTreeMap::new(),
        }
    }

    /// Path of the ledger for a mirror root.
    pub fn path_for(root: &Path) -> PathBuf {
        root.join(LEDGER_FILE)
    }

    /// Load a ledger from a TOML file with shared lock
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, locked, or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| mirror_fs::Error::io(path, e))?;
        file.lock_shared().map_err(|_| mirror_fs::Error::LockFailed {
            path: path.to_path_buf(),
        })?;

        // Read through the locked handle
        let mut content = String::new();
        (&file)
            .read_to_string(&mut content)
            .map_err(|e| mirror_fs::Error::io(path, e))?;
        toml::from_str(&content).map_err(|e| Error::Ledger {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load the ledger, or an empty one if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Save the ledger atomically
    ///
    /// Written to a locked temp file and renamed into place, so a reader
    /// sees either the old or the new ledger, never a partial one.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Ledger {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        io::write_atomic(&NormalizedPath::new(path), content.as_bytes())?;
        Ok(())
    }

    /// Last synced revision for `source`.
    pub fn revision(&self, source: &str) -> Option<&str> {
        self.revisions.get(source).map(|e| e.revision.as_str())
    }

    pub fn entry(&self, source: &str) -> Option<&LedgerEntry> {
        self.revisions.get(source)
    }

    /// All entries, ordered by source name.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &LedgerEntry)> {
        self.revisions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    /// Record a completed sync.
    pub fn record(&mut self, source: &str, revision: &str, url: &str) {
        self.revisions.insert(
            source.to_string(),
            LedgerEntry {
                revision: revision.to_string(),
                url: url.to_string(),
                synced_at: Utc::now(),
            },
        );
    }

    /// Forget the entry for `source`, returning it if there was one.
    pub fn clear(&mut self, source: &str) -> Option<LedgerEntry> {
        self.revisions.remove(source)
    }
}
