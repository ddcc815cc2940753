//! Mirror synchronization
//!
//! This module provides:
//! - **engine**: the recursive listing walk and per-file reconciliation
//! - **hooks**: the callback surface a front-end implements
//! - **report**: counts and paths returned from a sync

mod engine;
mod hooks;
mod report;

pub use engine::{MirrorEntry, MirrorSync, SyncOptions, SyncRequest, is_up_to_date};
pub use hooks::{MirrorEvent, NoHooks, SyncHooks};
pub use report::SyncReport;
