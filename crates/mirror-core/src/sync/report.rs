//! Sync report

use mirror_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

/// Outcome of one sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Revision token of the root page, if the source tracks one
    pub revision: Option<String>,
    /// Files that did not exist locally
    pub added: Vec<String>,
    /// Files replaced, with the old copy kept as `.moved`
    pub updated: Vec<String>,
    /// Downloaded but byte-identical to the local copy
    pub unchanged: usize,
    /// Skipped because the local copy is not older
    pub up_to_date: usize,
    /// Declined by the review hook
    pub rejected: usize,
    /// Files excluded by the mask
    pub masked: usize,
    /// Nothing was done because the ledger already had this revision
    pub short_circuited: bool,
}

impl SyncReport {
    /// Number of files written into the mirror (added plus updated).
    pub fn replaced(&self) -> usize {
        self.added.len() + self.updated.len()
    }

    pub(crate) fn record_added(&mut self, path: &NormalizedPath) {
        self.added.push(path.as_str().to_string());
    }

    pub(crate) fn record_updated(&mut self, path: &NormalizedPath) {
        self.updated.push(path.as_str().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaced_counts_added_and_updated() {
        let mut report = SyncReport::default();
        report.record_added(&NormalizedPath::new("a.el"));
        report.record_updated(&NormalizedPath::new("lisp/b.el"));
        report.unchanged = 3;

        assert_eq!(report.replaced(), 2);
    }

    #[test]
    fn serializes_to_json() {
        let report = SyncReport {
            revision: Some("42".into()),
            ..SyncReport::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["revision"], "42");
        assert_eq!(json["short_circuited"], false);
    }
}
