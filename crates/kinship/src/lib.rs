//! Kinship - A layout engine for family pedigree diagrams.
//!
//! Kinship takes a flat list of individual records, links them into a
//! pedigree and computes a layered drawing: generations as rows, a
//! crossing-minimizing order inside each row, pixel coordinates and
//! orthogonal connector edges. Rendering is left to the caller.

pub mod config;
pub mod error;
pub mod layout;
pub mod structure;

mod cache;

pub use kinship_core::{geometry, identifier, model, record};

pub use cache::LayoutCache;
pub use error::KinshipError;
pub use layout::PedigreeLayout;

use log::{debug, info, trace, warn};

use config::AppConfig;
use record::IndividualRecord;
use structure::BuildOptions;

/// Entry point for laying out pedigrees.
///
/// # Examples
///
/// ```rust
/// use kinship::{LayoutEngine, config::AppConfig};
///
/// let json = r#"[
///     {"id": "1", "isProband": true, "parents": ["2", "3"]},
///     {"id": "2", "gender": "male"},
///     {"id": "3", "gender": "female"}
/// ]"#;
///
/// let engine = LayoutEngine::new(AppConfig::default());
/// let records = LayoutEngine::parse_records(json).expect("Failed to parse");
/// let layout = engine.layout(&records).expect("Failed to lay out");
///
/// assert_eq!(layout.pedigree().relationship_count(), 1);
/// assert_eq!(layout.lookup("1").unwrap().height_index(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: AppConfig,
}

impl LayoutEngine {
    /// Create a new engine with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration with the layout settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a JSON array of individual records.
    ///
    /// # Errors
    ///
    /// Returns [`KinshipError::Input`] when the text is not a JSON array of
    /// records.
    pub fn parse_records(json: &str) -> Result<Vec<IndividualRecord>, KinshipError> {
        info!("Parsing records");
        let records: Vec<IndividualRecord> = serde_json::from_str(json)?;
        debug!(records = records.len(); "Records parsed");
        Ok(records)
    }

    /// Lay out a pedigree.
    ///
    /// Validation warnings are logged and kept on the returned layout.
    ///
    /// # Errors
    ///
    /// Returns [`KinshipError::Validation`] when the records are invalid,
    /// [`KinshipError::Routing`] when an edge cannot be routed and
    /// [`KinshipError::Layout`] for inconsistent stage results.
    pub fn layout(&self, records: &[IndividualRecord]) -> Result<PedigreeLayout, KinshipError> {
        let options = BuildOptions {
            keep_disconnected: self.config.layout().keep_disconnected(),
        };
        let (pedigree, warnings) = structure::build(records, &options)?;
        for warning in &warnings {
            warn!(code:? = warning.code(), subjects:? = warning.subjects(); "{}", warning.message());
        }
        trace!(pedigree:?; "Built pedigree");

        let dimensions = self.config.layout().dimensions();
        let layout = layout::compute(pedigree, warnings, &dimensions)?;

        info!(
            width = layout.width(),
            height = layout.height(),
            crossings = layout.crossings();
            "Layout complete"
        );
        Ok(layout)
    }
}
