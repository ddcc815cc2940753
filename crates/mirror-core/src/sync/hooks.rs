//! Callback surface for front-ends
//!
//! The engine never prints or prompts. Progress goes through
//! [`SyncHooks::on_event`], yes/no questions through [`SyncHooks::confirm`],
//! and per-file review through [`SyncHooks::review_before_accept`].

use std::path::Path;

use mirror_fs::NormalizedPath;

/// Something that happened during a sync. Paths are mirror-relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorEvent {
    /// A listing page is about to be processed
    EnterDirectory { url: String, path: NormalizedPath },
    /// Local copy is not older than the remote one
    UpToDate { path: NormalizedPath },
    /// A download is starting
    Downloading { url: String, path: NormalizedPath },
    /// A file that did not exist locally was written
    Added { path: NormalizedPath },
    /// A local file was replaced; its old content is at `backup`
    Updated {
        path: NormalizedPath,
        backup: NormalizedPath,
    },
    /// Downloaded content was identical to the local copy
    Unchanged { path: NormalizedPath },
    /// The review hook declined a download
    Rejected { path: NormalizedPath },
    /// The file mask excluded a file or directory
    Masked { path: NormalizedPath },
    /// The scraper or engine dropped a link
    Ignored { url: String, reason: String },
    /// The root revision matches the ledger and the sync was skipped
    AlreadySynced { revision: String },
}

/// Policy supplied by the caller of a sync.
pub trait SyncHooks {
    fn on_event(&mut self, _event: &MirrorEvent) {}

    /// Answer a yes/no question. The default declines.
    fn confirm(&mut self, _prompt: &str) -> bool {
        false
    }

    /// Inspect a downloaded file at `staged` before it replaces `dest`.
    /// The default accepts everything.
    fn review_before_accept(&mut self, _staged: &Path, _dest: &NormalizedPath) -> bool {
        true
    }
}

/// Hooks that ignore events, decline questions, and accept every file.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl SyncHooks for NoHooks {}
