//! MirrorSync implementation
//!
//! Walks a tree of listing pages depth-first, reconciling each listed file
//! against the local mirror and recording the root revision in the ledger
//! once the whole tree has been processed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use chrono::{DateTime, Utc};
use mirror_fs::{NormalizedPath, StagedFile, io};
use reqwest::Url;

use crate::backup::{self, MOVED_SUFFIX};
use crate::fetch::{Fetcher, PageCache};
use crate::ledger::{LEDGER_FILE, RevisionLedger};
use crate::listing::{self, FileLink, Listing};
use crate::mask::FileMask;
use crate::pacing::{DEFAULT_MIN_INTERVAL, Pacer};
use crate::source::{RemoteSource, SourceRegistry};
use crate::{Error, Result};

use super::hooks::{MirrorEvent, SyncHooks};
use super::report::SyncReport;

/// Slack allowed when comparing local and remote modification times.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(1);

/// Tunables for a sync.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Minimum time between the starts of two file downloads
    pub min_interval: Duration,
    /// A local file this much older than the remote one still counts as current
    pub tolerance: Duration,
    /// Copy the remote mtime onto files found byte-identical
    pub touch_unchanged: bool,
    /// Sync even when the ledger already has the root revision
    pub force: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            tolerance: DEFAULT_TOLERANCE,
            touch_unchanged: true,
            force: false,
        }
    }
}

/// What to mirror, from where, to where.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Name of a registered source
    pub source: String,
    /// Listing page of the remote tree's root
    pub root_url: String,
    /// Absolute path of the mirror root
    pub local_root: PathBuf,
    pub mask: Option<FileMask>,
    pub recursive: bool,
}

impl SyncRequest {
    /// A recursive, unmasked request.
    pub fn new(
        source: impl Into<String>,
        root_url: impl Into<String>,
        local_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: source.into(),
            root_url: root_url.into(),
            local_root: local_root.into(),
            mask: None,
            recursive: true,
        }
    }

    pub fn with_mask(mut self, mask: FileMask) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

/// One listed file as the engine sees it while deciding what to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorEntry {
    /// Path relative to the mirror root
    pub path: NormalizedPath,
    /// URL the content is downloaded from
    pub url: String,
    pub remote_modified: Option<DateTime<Utc>>,
    /// `None` when there is no local copy
    pub local_modified: Option<SystemTime>,
}

/// Whether a local copy modified at `local` is current with a remote file
/// modified at `remote`.
pub fn is_up_to_date(local: SystemTime, remote: SystemTime, tolerance: Duration) -> bool {
    local
        .checked_add(tolerance)
        .is_none_or(|padded| padded >= remote)
}

/// Engine mirroring remote listing trees into local directories.
pub struct MirrorSync<F: Fetcher> {
    registry: SourceRegistry,
    fetcher: F,
    options: SyncOptions,
}

impl<F: Fetcher> MirrorSync<F> {
    /// Create an engine with default options.
    pub fn new(registry: SourceRegistry, fetcher: F) -> Self {
        Self {
            registry,
            fetcher,
            options: SyncOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Mirror `request.root_url` into `request.local_root`.
    ///
    /// # Errors
    ///
    /// Fails before any network request if the source is unknown, the root
    /// is not absolute, or `.moved` files exist under the root. Any fetch
    /// failure or revision mismatch aborts the walk; files replaced before
    /// the failure stay replaced and the ledger entry stays absent.
    pub fn sync(&self, request: &SyncRequest, hooks: &mut dyn SyncHooks) -> Result<SyncReport> {
        let source = self.registry.require(&request.source)?;
        let root = prepare_root(&request.local_root)?;

        let pending = backup::find_moved(&root.to_native())?;
        if !pending.is_empty() {
            tracing::warn!(count = pending.len(), root = %root, "leftover .moved files, refusing to sync");
            return Err(Error::PendingBackups {
                root: root.to_native(),
                files: pending,
            });
        }

        let root_url = listing::directory_url(&request.root_url)?;
        let ledger_path = RevisionLedger::path_for(&root.to_native());
        let mut ledger = RevisionLedger::load_or_default(&ledger_path)?;

        let mut walk = Walk {
            source,
            root: &root,
            mask: request.mask.as_ref().filter(|m| !m.is_empty()),
            recursive: request.recursive,
            options: &self.options,
            fetcher: &self.fetcher,
            cache: PageCache::new(),
            pacer: Pacer::new(self.options.min_interval),
            hooks,
            report: SyncReport::default(),
        };

        let revision = walk.listing(&root_url)?.revision;
        walk.report.revision = revision.clone();

        if let Some(rev) = revision.as_deref()
            && ledger.revision(source.name()) == Some(rev)
            && !self.options.force
        {
            let prompt = format!("{root_url} is still at revision {rev}; sync anyway?");
            if !walk.hooks.confirm(&prompt) {
                tracing::info!(source = source.name(), revision = rev, "already synced");
                walk.hooks.on_event(&MirrorEvent::AlreadySynced {
                    revision: rev.to_string(),
                });
                walk.report.short_circuited = true;
                return Ok(walk.report);
            }
        }

        // No "synced" claim may survive a partial run
        if ledger.clear(source.name()).is_some() {
            ledger.save(&ledger_path)?;
        }

        walk.directory(&root_url, &NormalizedPath::empty(), None)?;

        match revision.as_deref() {
            Some(rev) => {
                ledger.record(source.name(), rev, root_url.as_str());
                ledger.save(&ledger_path)?;
            }
            None => tracing::debug!(source = source.name(), "no revision token, ledger left empty"),
        }

        let report = walk.report;
        tracing::info!(
            added = report.added.len(),
            updated = report.updated.len(),
            unchanged = report.unchanged,
            up_to_date = report.up_to_date,
            "sync complete"
        );
        Ok(report)
    }
}

/// Resolve the mirror root and make sure it is a directory.
fn prepare_root(local_root: &Path) -> Result<NormalizedPath> {
    let root = NormalizedPath::absolute_root(local_root).map_err(|_| Error::InvalidRoot {
        path: local_root.to_path_buf(),
        reason: "must be an absolute path".into(),
    })?;

    let native = root.to_native();
    if native.exists() && !native.is_dir() {
        return Err(Error::InvalidRoot {
            path: native,
            reason: "not a directory".into(),
        });
    }
    fs::create_dir_all(&native).map_err(|e| mirror_fs::Error::io(&native, e))?;
    Ok(root)
}

/// State of one sync while walking the tree.
struct Walk<'a> {
    source: &'a RemoteSource,
    root: &'a NormalizedPath,
    mask: Option<&'a FileMask>,
    recursive: bool,
    options: &'a SyncOptions,
    fetcher: &'a dyn Fetcher,
    cache: PageCache,
    pacer: Pacer,
    hooks: &'a mut dyn SyncHooks,
    report: SyncReport,
}

impl Walk<'_> {
    fn listing(&mut self, url: &Url) -> Result<Listing> {
        let html = self.cache.page(self.fetcher, url.as_str())?;
        Ok(listing::scrape(self.source, url, &html))
    }

    fn directory(&mut self, url: &Url, rel: &NormalizedPath, expected: Option<&str>) -> Result<()> {
        self.hooks.on_event(&MirrorEvent::EnterDirectory {
            url: url.to_string(),
            path: rel.clone(),
        });
        let listing = self.listing(url)?;

        if self.source.tracks_revision()
            && let Some(expected) = expected
            && listing.revision.as_deref() != Some(expected)
        {
            return Err(Error::RevisionMismatch {
                url: url.to_string(),
                expected: expected.to_string(),
                found: listing
                    .revision
                    .clone()
                    .unwrap_or_else(|| "<none>".to_string()),
            });
        }

        for ignored in &listing.ignored {
            self.hooks.on_event(&MirrorEvent::Ignored {
                url: ignored.url.clone(),
                reason: ignored.reason.clone(),
            });
        }

        for file in &listing.files {
            self.file(rel, file)?;
        }

        if !self.recursive {
            return Ok(());
        }

        for dir in &listing.dirs {
            let child = rel.join(&dir.name);
            if let Some(mask) = self.mask
                && !mask.matches_dir(&child)
            {
                tracing::debug!(path = %child, "directory excluded by mask");
                self.hooks.on_event(&MirrorEvent::Masked { path: child });
                continue;
            }
            let child_url = listing::directory_url(&dir.url)?;
            self.directory(&child_url, &child, listing.revision.as_deref())?;
        }
        Ok(())
    }

    fn file(&mut self, rel: &NormalizedPath, link: &FileLink) -> Result<()> {
        if let Some(reason) = reserved_name(&link.name) {
            self.hooks.on_event(&MirrorEvent::Ignored {
                url: link.url.clone(),
                reason: reason.to_string(),
            });
            return Ok(());
        }

        let path = rel.join(&link.name);
        if let Some(mask) = self.mask
            && !mask.matches_file(&path)
        {
            self.report.masked += 1;
            self.hooks.on_event(&MirrorEvent::Masked { path });
            return Ok(());
        }

        let dest = self.root.join(path.as_str());
        let entry = MirrorEntry {
            path,
            url: link.download_url.clone(),
            remote_modified: link.modified,
            local_modified: io::modified_time(&dest)?,
        };
        let remote_time = entry.remote_modified.map(SystemTime::from);

        if let (Some(local), Some(remote)) = (entry.local_modified, remote_time)
            && is_up_to_date(local, remote, self.options.tolerance)
        {
            tracing::debug!(path = %entry.path, "up to date");
            self.report.up_to_date += 1;
            self.hooks
                .on_event(&MirrorEvent::UpToDate { path: entry.path });
            return Ok(());
        }

        self.hooks.on_event(&MirrorEvent::Downloading {
            url: entry.url.clone(),
            path: entry.path.clone(),
        });
        let started = Instant::now();
        let mut staged = StagedFile::for_destination(&dest)?;
        let bytes = self.fetcher.download(&entry.url, staged.writer())?;
        staged.finish()?;
        self.pacer.pause_after(started);
        tracing::debug!(path = %entry.path, bytes, "downloaded");

        if entry.local_modified.is_some() && staged.content_equals(&dest)? {
            staged.discard()?;
            if self.options.touch_unchanged
                && let Some(remote) = remote_time
            {
                io::set_modified_time(&dest, remote)?;
            }
            self.report.unchanged += 1;
            self.hooks
                .on_event(&MirrorEvent::Unchanged { path: entry.path });
            return Ok(());
        }

        if !self.hooks.review_before_accept(staged.path(), &dest) {
            staged.discard()?;
            tracing::info!(path = %entry.path, "download rejected by review");
            self.report.rejected += 1;
            self.hooks
                .on_event(&MirrorEvent::Rejected { path: entry.path });
            return Ok(());
        }

        let existed = entry.local_modified.is_some();
        if existed {
            io::move_aside(&dest, MOVED_SUFFIX)?;
        }
        staged.promote(&dest)?;
        if let Some(remote) = remote_time {
            io::set_modified_time(&dest, remote)?;
        }

        if existed {
            tracing::info!(path = %entry.path, "updated");
            self.report.record_updated(&entry.path);
            let backup = entry.path.with_suffix(MOVED_SUFFIX);
            self.hooks.on_event(&MirrorEvent::Updated {
                path: entry.path,
                backup,
            });
        } else {
            tracing::info!(path = %entry.path, "added");
            self.report.record_added(&entry.path);
            self.hooks.on_event(&MirrorEvent::Added { path: entry.path });
        }
        Ok(())
    }
}

/// Names that would collide with the mirror's own bookkeeping files.
fn reserved_name(name: &str) -> Option<&'static str> {
    if name == LEDGER_FILE {
        Some("name collides with the revision ledger")
    } else if backup::is_moved_name(name) {
        Some("name collides with .moved backups")
    } else if io::is_staging_name(name) {
        Some("name collides with staged downloads")
    } else {
        None
    }
}
