//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "rxnag", version, about = "RxNag - Medication Reminder")]
pub struct Args {
    /// Start with the medication list hidden. Overrides the config.
    #[arg(long, conflicts_with = "show")]
    pub minimized: bool,

    /// Start with the medication list shown, even if the config says to
    /// start minimized
    #[arg(long)]
    pub show: bool,

    /// Use this config file instead of the one in the user data directory
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use this PID file for the single-instance check
    #[arg(long, value_name = "PATH")]
    pub pid_file: Option<PathBuf>,
}

impl Args {
    /// Whether to start hidden, given the persisted preference
    pub fn start_hidden(&self, configured: bool) -> bool {
        if self.show {
            false
        } else if self.minimized {
            true
        } else {
            configured
        }
    }
}
