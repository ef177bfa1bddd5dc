//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};

/// Convert a MindMeister map export (.mind) into a flat CSV list
#[derive(Parser, Debug)]
#[command(name = "mm2csv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// MindMeister export to convert
    #[arg(value_hint = ValueHint::FilePath, required_unless_present = "generator")]
    pub file: Option<PathBuf>,

    /// Write CSV to this file instead of plain rows to stdout
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Prefix each row with its hierarchy path (1.2.1)
    #[arg(long)]
    pub numbers: bool,

    /// Prefix each row with its parent.node identifiers
    #[arg(long)]
    pub ids: bool,

    /// Mark leaf nodes with an L column
    #[arg(long)]
    pub leaf: bool,

    /// Config file (default: $XDG_CONFIG_HOME/mm2csv/mm2csv.toml)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Debug output, repeat for more detail (-d -d -d)
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,

    /// Print shell completions and exit
    #[arg(long = "generate", value_enum)]
    pub generator: Option<clap_complete::Shell>,
}
