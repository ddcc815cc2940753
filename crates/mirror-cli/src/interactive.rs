//! Terminal front-end for sync hooks
//!
//! Prints progress with colored markers and asks questions with dialoguer.
//! Without a terminal on stdin every question is answered with its default
//! so scripted runs never block.

use std::io::IsTerminal;
use std::path::Path;

use colored::Colorize;
use dialoguer::Confirm;
use mirror_core::{MirrorEvent, SyncHooks};
use mirror_fs::NormalizedPath;

/// [`SyncHooks`] that talk to the user on the terminal.
#[derive(Debug, Default)]
pub struct TerminalHooks {
    /// Ask before accepting each downloaded file
    pub review: bool,
    /// Suppress progress lines (JSON output)
    pub quiet: bool,
}

impl TerminalHooks {
    pub fn new(review: bool, quiet: bool) -> Self {
        Self { review, quiet }
    }
}

impl SyncHooks for TerminalHooks {
    fn on_event(&mut self, event: &MirrorEvent) {
        if self.quiet {
            return;
        }
        match event {
            MirrorEvent::EnterDirectory { url, .. } => {
                println!("{} {}", "=>".blue().bold(), url);
            }
            MirrorEvent::Added { path } => {
                println!("   {} {}", "+".green(), path.as_str().cyan());
            }
            MirrorEvent::Updated { path, backup } => {
                println!(
                    "   {} {} (old copy at {})",
                    "~".yellow(),
                    path.as_str().cyan(),
                    backup.as_str().dimmed()
                );
            }
            MirrorEvent::Rejected { path } => {
                println!("   {} {} (rejected)", "x".red(), path.as_str());
            }
            MirrorEvent::Ignored { url, reason } => {
                println!("   {} {} ({})", "!".yellow(), url.dimmed(), reason);
            }
            MirrorEvent::AlreadySynced { revision } => {
                println!(
                    "{} Already at revision {}. Use {} to sync anyway.",
                    "OK".green().bold(),
                    revision.cyan(),
                    "--force".cyan()
                );
            }
            MirrorEvent::UpToDate { .. }
            | MirrorEvent::Downloading { .. }
            | MirrorEvent::Unchanged { .. }
            | MirrorEvent::Masked { .. } => {}
        }
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        ask(prompt, false)
    }

    fn review_before_accept(&mut self, staged: &Path, dest: &NormalizedPath) -> bool {
        if !self.review {
            return true;
        }
        let size = std::fs::metadata(staged).map(|m| m.len()).unwrap_or(0);
        let verb = if dest.exists() { "Replace" } else { "Create" };
        ask(&format!("{verb} {dest} ({size} bytes downloaded)?"), true)
    }
}

/// Yes/no question; `default` when stdin is not a terminal or the prompt fails.
pub fn ask(prompt: &str, default: bool) -> bool {
    if !std::io::stdin().is_terminal() {
        tracing::debug!(prompt, default, "no terminal, using default answer");
        return default;
    }
    match Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
    {
        Ok(answer) => answer,
        Err(e) => {
            tracing::warn!(error = %e, "prompt failed, using default answer");
            default
        }
    }
}
