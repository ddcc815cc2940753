//! Backups command implementation
//!
//! Lists the `.moved` files that block the next sync and, on request,
//! deletes them or restores them over the files they replaced.

use std::path::Path;

use colored::Colorize;
use mirror_core::{find_moved, remove_moved, restore_moved};

use crate::error::{CliError, Result};
use crate::interactive;

/// What to do with the backups found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupAction {
    List,
    Clean,
    Restore,
}

/// Run the backups command
///
/// `yes` skips the confirmation; without it and without a terminal the
/// command refuses to touch anything.
pub fn run_backups(root: &Path, action: BackupAction, yes: bool) -> Result<usize> {
    let backups = find_moved(root)?;

    if backups.is_empty() {
        println!("{} No .moved backups under {}.", "OK".green().bold(), root.display());
        return Ok(0);
    }

    println!("{} backup(s) under {}:", backups.len(), root.display());
    for file in &backups {
        let rel = file.strip_prefix(root).unwrap_or(file);
        println!("   {} {}", "-".yellow(), rel.display());
    }

    let verb = match action {
        BackupAction::List => {
            println!();
            println!(
                "Run {} or {} once reviewed.",
                "mirror backups --clean".cyan(),
                "mirror backups --restore".cyan()
            );
            return Ok(0);
        }
        BackupAction::Clean => "Delete",
        BackupAction::Restore => "Restore",
    };

    if !yes && !interactive::ask(&format!("{verb} {} backup(s)?", backups.len()), false) {
        return Err(CliError::user(format!(
            "{} not confirmed; pass --yes to skip the prompt",
            verb.to_lowercase()
        )));
    }

    let count = match action {
        BackupAction::Clean => remove_moved(&backups)?,
        BackupAction::Restore => {
            for file in &backups {
                restore_moved(file)?;
            }
            backups.len()
        }
        BackupAction::List => 0,
    };

    let done = match action {
        BackupAction::Restore => "Restored",
        _ => "Deleted",
    };
    println!("{} {} {} backup(s).", "OK".green().bold(), done, count);
    Ok(count)
}
