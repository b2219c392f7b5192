use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::config::RotationConfig;

/// Cycle an editor's color customizations through a folder of palettes.
#[derive(Parser, Debug)]
#[command(name = "hue-cycle", version, about)]
pub struct Args {
    /// Settings file holding the color customizations and `hueCycle` options
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start rotating; then read `start`, `stop`, `next`, `status`, `quit` from stdin
    Run(Overrides),
    /// Print the palettes in rotation order with color swatches
    List(Overrides),
}

/// Command-line overrides for the settings file options.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Folder of *.json palette files
    #[arg(short, long)]
    pub folder: Option<PathBuf>,

    /// Cross-fade duration in milliseconds
    #[arg(short, long)]
    pub duration_ms: Option<u64>,

    /// Interpolation steps per cross-fade
    #[arg(long)]
    pub steps: Option<u32>,

    /// Pause at each palette in milliseconds (0 disables)
    #[arg(long, allow_negative_numbers = true)]
    pub dwell_ms: Option<i64>,

    /// Only animate this key (repeatable)
    #[arg(short, long = "key", value_name = "KEY")]
    pub keys: Vec<String>,

    /// Settings key holding the color mapping
    #[arg(long, value_name = "KEY")]
    pub colors_key: Option<String>,
}

impl Overrides {
    pub fn apply(&self, config: &mut RotationConfig) {
        if let Some(folder) = &self.folder {
            config.folder = folder.clone();
        }
        if let Some(duration_ms) = self.duration_ms {
            config.duration_ms = duration_ms;
        }
        if let Some(steps) = self.steps {
            config.steps = steps;
        }
        if let Some(dwell_ms) = self.dwell_ms {
            config.dwell_ms = dwell_ms;
        }
        if !self.keys.is_empty() {
            config.key_whitelist = self.keys.clone();
        }
    }
}
