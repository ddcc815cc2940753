//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Mirror - keep local copies of trees published as VCS listing pages
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to <config dir>/mirror/config.toml)
    #[arg(long, global = true, env = "MIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Mirror a remote listing tree into a local directory
    ///
    /// Files whose local copy is older than the remote are downloaded;
    /// replaced files keep their previous content as `<name>.moved`.
    ///
    /// Examples:
    ///   mirror sync https://cvs.example.org/viewvc/proj/lisp/ lisp
    ///   mirror sync <URL> --mask 'progmodes/*.el'
    ///   mirror sync <URL> --source cvsweb --no-recursive
    Sync {
        /// URL of the root listing page
        url: String,

        /// Mirror root directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Source (front-end) whose page layout to scrape
        #[arg(short, long)]
        source: Option<String>,

        /// Path mask selecting files, e.g. `lisp/*.el`
        #[arg(short, long)]
        mask: Option<String>,

        /// Only mirror the root directory
        #[arg(long)]
        no_recursive: bool,

        /// Sync even if the ledger already records this revision
        #[arg(short, long)]
        force: bool,

        /// Ask before accepting each downloaded file
        #[arg(long)]
        review: bool,

        /// Minimum milliseconds between downloads
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the revisions recorded for a mirror root
    Status {
        /// Mirror root directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List, delete or restore `.moved` backups
    Backups {
        /// Mirror root directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Delete all backups
        #[arg(long, conflicts_with = "restore")]
        clean: bool,

        /// Rename all backups back over the files they replaced
        #[arg(long)]
        restore: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// List the available sources
    Sources {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
