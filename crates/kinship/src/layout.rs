//! Layout pipeline for pedigree diagrams.
//!
//! This module turns a built [`Pedigree`] into a drawable graph: every
//! individual and relationship gets a generation, a rank within its
//! generation and a pixel center, and every link becomes an orthogonal edge.
//!
//! # Pipeline
//!
//! ```text
//! Pedigree
//!     ↓ height     generational heights
//!     ↓ order      crossing-minimizing order per generation
//!     ↓ position   pixel centers
//!     ↓ routing    direct and adjustable edges
//! PedigreeLayout
//! ```

pub mod height;
pub mod order;
pub mod position;
pub mod routing;

use std::collections::BTreeMap;

use indexmap::IndexMap;
use log::{debug, info};
use serde::Serialize;

use kinship_core::identifier::Id;

use crate::{
    config::Dimensions,
    error::{Diagnostic, KinshipError},
    structure::Pedigree,
};

use height::assign_heights;
use order::choose_order;
use position::assign_positions;
use routing::{Edge, route_edges};

/// Placement of one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingAnnotation {
    height_index: usize,
    order: usize,
    x: f32,
    y: f32,
}

impl DrawingAnnotation {
    /// Generation index; `0` is the bottom-most generation.
    pub fn height_index(&self) -> usize {
        self.height_index
    }

    /// Rank within the generation, left to right.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }
}

/// A fully laid out pedigree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PedigreeLayout {
    pedigree: Pedigree,
    annotations: IndexMap<Id, DrawingAnnotation>,
    edges: Vec<Edge>,
    width: f32,
    height: f32,
    crossings: usize,
    warnings: Vec<Diagnostic>,
    disease_index: BTreeMap<String, usize>,
}

impl PedigreeLayout {
    /// The pedigree the layout was computed for.
    pub fn pedigree(&self) -> &Pedigree {
        &self.pedigree
    }

    pub fn annotation(&self, id: Id) -> Option<&DrawingAnnotation> {
        self.annotations.get(&id)
    }

    /// Iterates over all annotations in canonical node order.
    pub fn annotations(&self) -> impl Iterator<Item = (Id, &DrawingAnnotation)> {
        self.annotations
            .iter()
            .map(|(id, annotation)| (*id, annotation))
    }

    /// Direct edges first, then adjustable edges.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Crossing count of the chosen order.
    pub fn crossings(&self) -> usize {
        self.crossings
    }

    /// Structural warnings raised while building the pedigree.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Finds a node by individual id or `relationship:<ids>` key.
    ///
    /// Partner order in a relationship key is irrelevant.
    ///
    /// # Examples
    ///
    /// ```
    /// use kinship::{LayoutEngine, record::IndividualRecord};
    ///
    /// let mut child = IndividualRecord::new("1");
    /// child.is_proband = true;
    /// child.parents = vec!["2".into(), "3".into()];
    /// let records = vec![child, IndividualRecord::new("2"), IndividualRecord::new("3")];
    ///
    /// let layout = LayoutEngine::default().layout(&records).unwrap();
    /// let forward = layout.lookup("relationship:2,3").unwrap();
    /// let backward = layout.lookup("relationship:3,2").unwrap();
    /// assert_eq!(forward, backward);
    /// ```
    pub fn lookup(&self, key: &str) -> Option<&DrawingAnnotation> {
        let id = match Id::canonical_relationship_key(key) {
            Some(canonical) => Id::new(&canonical),
            None => Id::new(key),
        };
        self.annotation(id)
    }

    /// Index of every disease named in the pedigree, sorted by name.
    pub fn disease_index(&self) -> &BTreeMap<String, usize> {
        &self.disease_index
    }
}

/// Runs every layout stage over a built pedigree.
///
/// # Errors
///
/// Returns [`KinshipError::Routing`] when edges cannot be routed and
/// [`KinshipError::Layout`] when a node ends up without a placement.
pub fn compute(
    pedigree: Pedigree,
    warnings: Vec<Diagnostic>,
    dimensions: &Dimensions,
) -> Result<PedigreeLayout, KinshipError> {
    info!(
        individuals = pedigree.individual_count(),
        relationships = pedigree.relationship_count(),
        components = pedigree.component_count();
        "Computing layout"
    );

    let heights = assign_heights(&pedigree);
    let search = choose_order(&pedigree, &heights);
    let positions = assign_positions(&pedigree, &heights, &search.order, dimensions);
    let edges = route_edges(&pedigree, &positions, dimensions)?;

    let mut annotations = IndexMap::with_capacity(pedigree.node_count());
    for id in pedigree.node_ids() {
        let (Some(height_index), Some(order), Some(center)) = (
            heights.get(id),
            search.order.rank(id),
            positions.get(&id),
        ) else {
            return Err(KinshipError::Layout(format!("node `{id}` was not placed")));
        };
        annotations.insert(
            id,
            DrawingAnnotation {
                height_index,
                order,
                x: center.x(),
                y: center.y(),
            },
        );
    }

    let (width, height) = extents(&pedigree, &annotations, dimensions);
    let disease_index = disease_index(&pedigree);

    debug!(
        width,
        height,
        crossings = search.crossings,
        edges = edges.len();
        "Layout computed"
    );

    Ok(PedigreeLayout {
        pedigree,
        annotations,
        edges,
        width,
        height,
        crossings: search.crossings,
        warnings,
        disease_index,
    })
}

/// Right and bottom extents of all nodes plus the graph padding.
fn extents(
    pedigree: &Pedigree,
    annotations: &IndexMap<Id, DrawingAnnotation>,
    dimensions: &Dimensions,
) -> (f32, f32) {
    let (right, bottom) = annotations
        .iter()
        .fold((0.0_f32, 0.0_f32), |(right, bottom), (id, annotation)| {
            let half_height = if pedigree.relationship(*id).is_some() {
                dimensions.relationship_size() / 2.0
            } else {
                dimensions.individual_height() / 2.0
            };
            (
                right.max(annotation.x + position::half_width(pedigree, dimensions, *id)),
                bottom.max(annotation.y + half_height),
            )
        });
    (
        right + dimensions.graph_padding(),
        bottom + dimensions.graph_padding(),
    )
}

fn disease_index(pedigree: &Pedigree) -> BTreeMap<String, usize> {
    let mut names: Vec<&str> = pedigree
        .individuals()
        .flat_map(|individual| individual.diseases().all())
        .collect();
    names.sort_unstable();
    names.dedup();
    names
        .into_iter()
        .enumerate()
        .map(|(index, name)| (name.to_string(), index))
        .collect()
}
