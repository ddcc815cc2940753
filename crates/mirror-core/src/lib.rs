//! Mirror engine for version-control listing pages
//!
//! This crate scrapes the directory-listing pages of a VCS web front-end
//! and keeps a local copy of the tree in step with it:
//!
//! - **Sources**: per-front-end scrape patterns (`viewvc`, `cvsweb`, or user defined)
//! - **Listing**: extraction of file links, subdirectories and the revision token
//! - **Mask**: segment-wise path masks selecting files and pruning directories
//! - **MirrorSync**: the reconciliation walk, with `.moved` backups of replaced files
//! - **Ledger**: last fully synced revision per source, stored at the mirror root
//!
//! # Architecture
//!
//! ```text
//!                 CLI / editor plugin
//!                        |
//!                   mirror-core
//!                 /      |      \
//!          mirror-fs   regex   reqwest (via Fetcher)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use mirror_core::{HttpFetcher, MirrorSync, NoHooks, SourceRegistry, SyncRequest};
//! use std::time::Duration;
//!
//! fn example() -> mirror_core::Result<()> {
//!     let engine = MirrorSync::new(
//!         SourceRegistry::with_builtins()?,
//!         HttpFetcher::new(Duration::from_secs(30), None)?,
//!     );
//!     let request = SyncRequest::new(
//!         "viewvc",
//!         "https://cvs.example.org/viewvc/project/lisp/",
//!         "/srv/mirror/lisp",
//!     );
//!     let report = engine.sync(&request, &mut NoHooks)?;
//!     println!("{} file(s) replaced", report.replaced());
//!     Ok(())
//! }
//! ```

pub mod backup;
pub mod config;
pub mod error;
pub mod fetch;
pub mod ledger;
pub mod listing;
pub mod mask;
pub mod pacing;
pub mod source;
pub mod sync;

pub use backup::{MOVED_SUFFIX, find_moved, remove_moved, restore_moved};
pub use config::{Defaults, MirrorConfig};
pub use error::{Error, Result};
pub use fetch::{Fetcher, HttpFetcher, PageCache};
pub use ledger::{LEDGER_FILE, LedgerEntry, RevisionLedger};
pub use listing::{DirLink, FileLink, Listing};
pub use mask::FileMask;
pub use pacing::Pacer;
pub use source::{RemoteSource, SourceDefinition, SourceRegistry};
pub use sync::{
    MirrorEntry, MirrorEvent, MirrorSync, NoHooks, SyncHooks, SyncOptions, SyncReport, SyncRequest,
};
