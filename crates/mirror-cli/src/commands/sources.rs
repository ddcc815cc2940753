//! Sources command implementation

use colored::Colorize;
use mirror_core::MirrorConfig;
use serde_json::json;

use crate::error::Result;

/// Run the sources command
pub fn run_sources(config: &MirrorConfig, json: bool) -> Result<()> {
    let registry = config.registry()?;
    let default = config.defaults.source.as_deref();

    if json {
        let entries: Vec<_> = registry
            .list()
            .into_iter()
            .map(|source| {
                json!({
                    "name": source.name(),
                    "description": source.definition().description,
                    "tracks_revision": source.tracks_revision(),
                    "default": Some(source.name()) == default,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{}", "Available Sources".bold());
    println!();
    for source in registry.list() {
        let marker = if Some(source.name()) == default {
            " (default)".green().to_string()
        } else {
            String::new()
        };
        let revision = if source.tracks_revision() {
            ""
        } else {
            " [no revision tracking]"
        };
        println!(
            "  {}{}{}  {}",
            source.name().cyan(),
            marker,
            revision.dimmed(),
            source.definition().description.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
