//! Sync command implementation
//!
//! Resolves the command line against the user configuration, runs one
//! MirrorSync and prints the report.

use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;
use mirror_core::{Fetcher, FileMask, MirrorConfig, MirrorSync, SyncHooks, SyncReport, SyncRequest};

use crate::error::{CliError, Result};

/// Everything `mirror sync` was asked to do.
#[derive(Debug, Clone, Default)]
pub struct SyncArgs {
    pub url: String,
    pub dir: PathBuf,
    pub source: Option<String>,
    pub mask: Option<String>,
    pub no_recursive: bool,
    pub force: bool,
    pub interval_ms: Option<u64>,
}

/// Make `dir` absolute against `cwd`.
pub fn resolve_dir(cwd: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        cwd.join(dir)
    }
}

/// Build the request from the arguments, falling back to config defaults.
pub fn build_request(config: &MirrorConfig, cwd: &Path, args: &SyncArgs) -> Result<SyncRequest> {
    let source = args
        .source
        .clone()
        .or_else(|| config.defaults.source.clone())
        .ok_or_else(|| {
            CliError::user("no source given: pass --source or set defaults.source in the config")
        })?;

    let mut request = SyncRequest::new(source, &args.url, resolve_dir(cwd, &args.dir))
        .recursive(config.defaults.recursive && !args.no_recursive);
    if let Some(mask) = &args.mask {
        request = request.with_mask(FileMask::parse(mask)?);
    }
    Ok(request)
}

/// Run one sync with an explicit fetcher and hooks.
pub fn run_sync<F: Fetcher>(
    config: &MirrorConfig,
    fetcher: F,
    cwd: &Path,
    args: &SyncArgs,
    hooks: &mut dyn SyncHooks,
) -> Result<SyncReport> {
    let request = build_request(config, cwd, args)?;

    let mut options = config.sync_options();
    options.force = args.force;
    if let Some(ms) = args.interval_ms {
        options.min_interval = Duration::from_millis(ms);
    }

    tracing::debug!(
        source = %request.source,
        url = %request.root_url,
        root = %request.local_root.display(),
        "starting sync"
    );
    let engine = MirrorSync::new(config.registry()?, fetcher).with_options(options);
    Ok(engine.sync(&request, hooks)?)
}

/// Print a finished sync.
pub fn print_report(report: &SyncReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    if report.short_circuited {
        return Ok(());
    }

    let revision = report.revision.as_deref().unwrap_or("-");
    if report.replaced() == 0 {
        println!(
            "{} Mirror is current at revision {}.",
            "OK".green().bold(),
            revision.cyan()
        );
    } else {
        println!(
            "{} {} added, {} updated at revision {}.",
            "OK".green().bold(),
            report.added.len(),
            report.updated.len(),
            revision.cyan()
        );
    }
    println!(
        "   {} unchanged, {} up to date, {} masked",
        report.unchanged, report.up_to_date, report.masked
    );
    if report.rejected > 0 {
        println!("   {} {} rejected on review", "!".yellow(), report.rejected);
    }
    if !report.updated.is_empty() {
        println!();
        println!(
            "Replaced files were kept as {}. Run {} when done reviewing.",
            "*.moved".yellow(),
            "mirror backups --clean".cyan()
        );
    }
    Ok(())
}
