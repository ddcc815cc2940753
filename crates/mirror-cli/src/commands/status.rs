//! Status command implementation

use std::path::Path;

use colored::Colorize;
use mirror_core::{LEDGER_FILE, RevisionLedger, find_moved};
use serde_json::json;

use crate::error::Result;

/// Run the status command
pub fn run_status(root: &Path, json: bool) -> Result<()> {
    let ledger = RevisionLedger::load_or_default(&RevisionLedger::path_for(root))?;
    let pending = find_moved(root)?;

    if json {
        let sources: Vec<_> = ledger
            .entries()
            .map(|(name, entry)| {
                json!({
                    "source": name,
                    "revision": entry.revision,
                    "url": entry.url,
                    "synced_at": entry.synced_at.to_rfc3339(),
                })
            })
            .collect();
        let output = json!({
            "root": root.display().to_string(),
            "sources": sources,
            "pending_backups": pending.len(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Mirror Status".bold());
    println!();
    println!("{}:   {}", "Root".dimmed(), root.display());
    println!("{}: {}", "Ledger".dimmed(), LEDGER_FILE);
    println!();

    println!("{}:", "Synced Sources".bold());
    if ledger.is_empty() {
        println!("  {} (use {} to sync)", "None".dimmed(), "mirror sync".cyan());
    } else {
        for (name, entry) in ledger.entries() {
            println!(
                "  {} {} at revision {} ({})",
                "+".green(),
                name.cyan(),
                entry.revision.bold(),
                entry.synced_at.format("%Y-%m-%d %H:%M UTC")
            );
            println!("    {}", entry.url.dimmed());
        }
    }
    println!();

    if pending.is_empty() {
        println!("{} No pending backups.", "OK".green().bold());
    } else {
        println!(
            "{} {} pending backup(s); sync is blocked until they are handled.",
            "!".yellow().bold(),
            pending.len()
        );
        println!("Run {} to review them.", "mirror backups".cyan());
    }
    Ok(())
}
