//! Command-line argument definitions for the Kinship CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, connectivity handling and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Kinship pedigree layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input JSON file
    #[arg(help = "Path to a JSON array of individual records")]
    pub input: String,

    /// Path to the output layout JSON file
    #[arg(short, long, default_value = "out.json")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Leave out individuals not connected to the proband
    #[arg(long)]
    pub drop_disconnected: bool,
}
