//! Command-line argument parsing for the keymap tool
//!
//! Supports:
//! - Validating a mappings file
//! - Resolving a chord under a given context
//! - Listing effective bindings and the known context flags
//! - Watching a mappings file and re-validating on change

use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use crate::config_paths;
use crate::keymap::{compute_active_contexts, ActiveContextSet, ContextFlag, StateSnapshot};

/// Inspect and validate shellflow key mappings
#[derive(Parser, Debug)]
#[command(
    name = "shellflow-keys",
    version,
    about = "Inspect and validate shellflow key mappings"
)]
pub struct CliArgs {
    /// Mappings file to use instead of the user mappings file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Validate a mappings file against the defaults
    Check,
    /// Print the action a chord resolves to, or `none`
    Resolve {
        /// Chord such as `cmd-shift-p`
        chord: String,
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Print every effective binding under a context
    List {
        #[command(flatten)]
        context: ContextArgs,
    },
    /// List all context flags
    Flags,
    /// Watch a mappings file and re-validate on every change
    Watch,
}

/// How the active context is given on the command line
#[derive(Args, Debug, Default, Clone)]
pub struct ContextArgs {
    /// Comma-separated context flags to treat as active
    #[arg(long, value_delimiter = ',', value_name = "FLAGS")]
    pub context: Vec<String>,

    /// JSON state snapshot to derive flags from
    #[arg(long, value_name = "PATH")]
    pub state: Option<PathBuf>,
}

impl ContextArgs {
    /// The active set: flags from the snapshot, plus any named explicitly
    pub fn active_set(&self) -> Result<ActiveContextSet, String> {
        let mut active = match &self.state {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
                let snapshot: StateSnapshot = serde_json::from_str(&text)
                    .map_err(|e| format!("Invalid state snapshot {}: {}", path.display(), e))?;
                compute_active_contexts(&snapshot)
            }
            None => ActiveContextSet::new(),
        };

        for name in self.context.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            let flag: ContextFlag = name
                .parse()
                .map_err(|_| format!("Unknown context flag `{}`", name))?;
            active.insert(flag);
        }

        Ok(active)
    }
}

impl CliArgs {
    /// The mappings file to operate on, if any
    pub fn mappings_path(&self) -> Option<PathBuf> {
        self.file.clone().or_else(config_paths::mappings_file)
    }
}
