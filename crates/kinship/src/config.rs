//! Configuration types for Kinship pedigree layout.
//!
//! This module provides the configuration structures that control node sizes
//! and spacing. All types implement [`serde::Deserialize`] for flexible loading
//! from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`LayoutConfig`] - Node sizes, spacing and connectivity handling. Unset
//!   fields fall back to defaults.
//! - [`Dimensions`] - The resolved sizes a layout run actually uses.
//!
//! # Example
//!
//! ```
//! # use kinship::config::AppConfig;
//! let config = AppConfig::default();
//! let dimensions = config.layout().dimensions();
//! assert_eq!(dimensions.individual_width(), 40.0);
//! assert!(config.layout().keep_disconnected());
//! ```

use serde::{Deserialize, Serialize};

use kinship_core::geometry::Size;

const DEFAULT_INDIVIDUAL_WIDTH: f32 = 40.0;
const DEFAULT_INDIVIDUAL_HEIGHT: f32 = 40.0;
const DEFAULT_HORIZONTAL_SPACING: f32 = 40.0;
const DEFAULT_VERTICAL_SPACING: f32 = 40.0;
const DEFAULT_CORNER_RADIUS: f32 = 4.0;
const DEFAULT_GRAPH_PADDING: f32 = 40.0;
const DEFAULT_RELATIONSHIP_SIZE: f32 = 8.0;

/// Smallest horizontal spacing a layout uses.
///
/// Two row neighbours leave room for both corridor margins and both ledges.
pub const MIN_HORIZONTAL_SPACING: f32 = 8.0;

/// Top-level application configuration.
///
/// Holds the `[layout]` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout configuration.
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the layout configuration for modification.
    pub fn layout_mut(&mut self) -> &mut LayoutConfig {
        &mut self.layout
    }
}

/// Layout configuration.
///
/// Every size is in pixels. Fields that are not set fall back to defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    individual_width: Option<f32>,

    #[serde(default)]
    individual_height: Option<f32>,

    /// Raised to at least [`MIN_HORIZONTAL_SPACING`].
    #[serde(default)]
    horizontal_spacing: Option<f32>,

    #[serde(default)]
    vertical_spacing: Option<f32>,

    #[serde(default)]
    corner_radius: Option<f32>,

    /// Padding around the whole drawing. Raised to at least the largest spacing.
    #[serde(default)]
    graph_padding: Option<f32>,

    /// Side length of a relationship marker.
    #[serde(default)]
    relationship_size: Option<f32>,

    /// Whether individuals not connected to the proband are laid out.
    #[serde(default = "default_keep_disconnected")]
    keep_disconnected: bool,
}

fn default_keep_disconnected() -> bool {
    true
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            individual_width: None,
            individual_height: None,
            horizontal_spacing: None,
            vertical_spacing: None,
            corner_radius: None,
            graph_padding: None,
            relationship_size: None,
            keep_disconnected: default_keep_disconnected(),
        }
    }
}

impl LayoutConfig {
    /// Sets the individual box size.
    pub fn with_individual_size(mut self, width: f32, height: f32) -> Self {
        self.individual_width = Some(width);
        self.individual_height = Some(height);
        self
    }

    /// Sets horizontal and vertical spacing between nodes.
    pub fn with_spacing(mut self, horizontal: f32, vertical: f32) -> Self {
        self.horizontal_spacing = Some(horizontal);
        self.vertical_spacing = Some(vertical);
        self
    }

    pub fn with_graph_padding(mut self, padding: f32) -> Self {
        self.graph_padding = Some(padding);
        self
    }

    pub fn with_relationship_size(mut self, size: f32) -> Self {
        self.relationship_size = Some(size);
        self
    }

    pub fn with_keep_disconnected(mut self, keep: bool) -> Self {
        self.keep_disconnected = keep;
        self
    }

    /// Returns whether disconnected individuals are kept.
    pub fn keep_disconnected(&self) -> bool {
        self.keep_disconnected
    }

    /// Resolves the configured sizes, filling defaults.
    pub fn dimensions(&self) -> Dimensions {
        let horizontal_spacing = self
            .horizontal_spacing
            .unwrap_or(DEFAULT_HORIZONTAL_SPACING)
            .max(MIN_HORIZONTAL_SPACING);
        let vertical_spacing = self
            .vertical_spacing
            .unwrap_or(DEFAULT_VERTICAL_SPACING)
            .max(0.0);
        let graph_padding = self
            .graph_padding
            .unwrap_or(DEFAULT_GRAPH_PADDING)
            .max(horizontal_spacing)
            .max(vertical_spacing);

        Dimensions {
            individual: Size::new(
                self.individual_width.unwrap_or(DEFAULT_INDIVIDUAL_WIDTH),
                self.individual_height.unwrap_or(DEFAULT_INDIVIDUAL_HEIGHT),
            ),
            horizontal_spacing,
            vertical_spacing,
            corner_radius: self.corner_radius.unwrap_or(DEFAULT_CORNER_RADIUS),
            graph_padding,
            relationship_size: self
                .relationship_size
                .unwrap_or(DEFAULT_RELATIONSHIP_SIZE),
        }
    }
}

/// Resolved sizes for one layout run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    individual: Size,
    horizontal_spacing: f32,
    vertical_spacing: f32,
    corner_radius: f32,
    graph_padding: f32,
    relationship_size: f32,
}

impl Dimensions {
    pub fn individual(&self) -> Size {
        self.individual
    }

    pub fn individual_width(&self) -> f32 {
        self.individual.width()
    }

    pub fn individual_height(&self) -> f32 {
        self.individual.height()
    }

    pub fn horizontal_spacing(&self) -> f32 {
        self.horizontal_spacing
    }

    pub fn vertical_spacing(&self) -> f32 {
        self.vertical_spacing
    }

    /// Corner radius renderers should use for individual boxes.
    pub fn corner_radius(&self) -> f32 {
        self.corner_radius
    }

    pub fn graph_padding(&self) -> f32 {
        self.graph_padding
    }

    pub fn relationship_size(&self) -> f32 {
        self.relationship_size
    }

    /// Size of a relationship marker.
    pub fn relationship(&self) -> Size {
        Size::new(self.relationship_size, self.relationship_size)
    }

    /// Distance between two consecutive generation rows.
    pub fn row_pitch(&self) -> f32 {
        self.individual.height() + self.vertical_spacing + self.graph_padding
    }
}
