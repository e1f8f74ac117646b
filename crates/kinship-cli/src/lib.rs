//! CLI logic for the Kinship pedigree layout tool.
//!
//! Reads a JSON array of individual records, lays the pedigree out and
//! writes the resulting layout as JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use kinship::{KinshipError, LayoutEngine, PedigreeLayout};

/// Run the Kinship CLI application
///
/// # Errors
///
/// Returns `KinshipError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed input
/// - Validation errors
/// - Routing and layout errors
pub fn run(args: &Args) -> Result<PedigreeLayout, KinshipError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing pedigree"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if args.drop_disconnected {
        let layout = app_config.layout().clone().with_keep_disconnected(false);
        *app_config.layout_mut() = layout;
    }

    let source = fs::read_to_string(&args.input)?;

    let engine = LayoutEngine::new(app_config);
    let records = LayoutEngine::parse_records(&source)?;
    let layout = engine.layout(&records)?;

    let json = serde_json::to_string_pretty(&layout)?;
    fs::write(&args.output, json)?;

    info!(output_file = args.output; "Layout exported successfully");

    Ok(layout)
}
