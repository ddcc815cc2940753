//! Command implementations for mirror-cli

pub mod backups;
pub mod completions;
pub mod sources;
pub mod status;
pub mod sync;

pub use backups::{BackupAction, run_backups};
pub use completions::run_completions;
pub use sources::run_sources;
pub use status::run_status;
pub use sync::{SyncArgs, print_report, resolve_dir, run_sync};
