//! Mirror CLI
//!
//! The command-line interface for mirroring VCS listing pages.

mod cli;
mod commands;
mod error;
mod interactive;

use clap::Parser;
use colored::Colorize;
use mirror_core::MirrorConfig;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::{BackupAction, SyncArgs};
use error::{CliError, Result};
use interactive::TerminalHooks;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        if let Some(hint) = e.hint() {
            eprintln!("{}: {}", "hint".yellow().bold(), hint);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(cmd, cli.config.as_deref()),
        None => {
            println!("{} VCS listing mirror", "mirror".green().bold());
            println!();
            println!("Run {} for available commands.", "mirror --help".cyan());
            Ok(())
        }
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(cmd: Commands, config_path: Option<&std::path::Path>) -> Result<()> {
    match cmd {
        Commands::Sync {
            url,
            dir,
            source,
            mask,
            no_recursive,
            force,
            review,
            interval_ms,
            json,
        } => {
            let args = SyncArgs {
                url,
                dir,
                source,
                mask,
                no_recursive,
                force,
                interval_ms,
            };
            cmd_sync(config_path, &args, review, json)
        }
        Commands::Status { dir, json } => {
            let cwd = std::env::current_dir()?;
            commands::run_status(&commands::resolve_dir(&cwd, &dir), json)
        }
        Commands::Backups {
            dir,
            clean,
            restore,
            yes,
        } => {
            let action = if clean {
                BackupAction::Clean
            } else if restore {
                BackupAction::Restore
            } else {
                BackupAction::List
            };
            let cwd = std::env::current_dir()?;
            commands::run_backups(&commands::resolve_dir(&cwd, &dir), action, yes).map(|_| ())
        }
        Commands::Sources { json } => {
            let config = MirrorConfig::load(config_path)?;
            commands::run_sources(&config, json)
        }
        Commands::Completions { shell } => {
            commands::run_completions(shell);
            Ok(())
        }
    }
}

fn cmd_sync(
    config_path: Option<&std::path::Path>,
    args: &SyncArgs,
    review: bool,
    json: bool,
) -> Result<()> {
    if review && json {
        return Err(CliError::user("--review cannot be combined with --json"));
    }
    let config = MirrorConfig::load(config_path)?;
    let cwd = std::env::current_dir()?;
    let fetcher = config.fetcher()?;
    let mut hooks = TerminalHooks::new(review, json);

    let report = commands::run_sync(&config, fetcher, &cwd, args, &mut hooks)?;
    commands::print_report(&report, json)
}
