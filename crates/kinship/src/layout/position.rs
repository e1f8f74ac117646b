//! Coordinate assignment.
//!
//! Rows are stacked top-down from the highest generation. Within a row nodes
//! are packed left to right in rank order, bottom row first, so every
//! relationship can be centered over children that are already placed:
//! either the relationship moves right onto its children's median, or the
//! children's subtree slides right under the relationship. Every move is to
//! the right, and the placed levels are swept again until nothing moves.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, info, trace};

use kinship_core::{
    geometry::{EPSILON, Point},
    identifier::Id,
};

use crate::{
    config::Dimensions,
    layout::{height::Heights, order::Order},
    structure::Pedigree,
};

/// Upper bound on the sweeps over one level.
const MAX_SWEEPS: usize = 8;

/// Pixel centers of every node, in canonical node order.
pub type Positions = IndexMap<Id, Point>;

/// Computes the center of every node.
pub fn assign_positions(
    pedigree: &Pedigree,
    heights: &Heights,
    order: &Order,
    dimensions: &Dimensions,
) -> Positions {
    info!(levels = order.levels().len(); "Positioning nodes");

    let mut placer = Placer {
        pedigree,
        heights,
        order,
        dimensions,
        xs: IndexMap::with_capacity(pedigree.node_count()),
        slides: 0,
    };
    for level in 0..order.levels().len() {
        placer.place_level(level);
    }
    let slides = placer.slides;
    let xs = placer.xs;

    let min_left = xs
        .iter()
        .map(|(id, x)| x - half_width(pedigree, dimensions, *id))
        .fold(f32::INFINITY, f32::min);
    let shift = if min_left.is_finite() {
        dimensions.graph_padding() - min_left
    } else {
        0.0
    };

    let max_height = heights.max();
    let positions: Positions = pedigree
        .node_ids()
        .filter_map(|id| {
            let x = xs.get(&id)?;
            let height = heights.get(id)?;
            Some((id, Point::new(x + shift, row_center(dimensions, max_height, height))))
        })
        .collect();

    debug!(nodes = positions.len(), slides; "Nodes positioned");

    positions
}

/// Vertical center of the row at `height`.
pub fn row_center(dimensions: &Dimensions, max_height: usize, height: usize) -> f32 {
    let rows_above = max_height.saturating_sub(height) as f32;
    dimensions.graph_padding()
        + rows_above * dimensions.row_pitch()
        + dimensions.individual_height() / 2.0
}

/// Half the horizontal extent of a node.
pub fn half_width(pedigree: &Pedigree, dimensions: &Dimensions, id: Id) -> f32 {
    if pedigree.relationship(id).is_some() {
        dimensions.relationship_size() / 2.0
    } else {
        dimensions.individual_width() / 2.0
    }
}

struct Placer<'a> {
    pedigree: &'a Pedigree,
    heights: &'a Heights,
    order: &'a Order,
    dimensions: &'a Dimensions,
    xs: IndexMap<Id, f32>,
    slides: usize,
}

impl Placer<'_> {
    fn half(&self, id: Id) -> f32 {
        half_width(self.pedigree, self.dimensions, id)
    }

    /// Smallest center x for `id` placed right after `previous`.
    fn after(&self, previous: Id, id: Id) -> f32 {
        self.xs.get(&previous).copied().unwrap_or(0.0)
            + self.half(previous)
            + self.half(id)
            + self.dimensions.horizontal_spacing()
    }

    /// Places `level`, then sweeps it and every level below until no node moves.
    ///
    /// A slide re-compacts the levels below, which can push the children of
    /// a relationship that is already placed; a later sweep moves that
    /// relationship back onto its median. Orders with crossings may never
    /// settle, so the sweeps are bounded.
    fn place_level(&mut self, level: usize) {
        for sweep in 1..=MAX_SWEEPS {
            let mut moved = false;
            for lower in 0..=level {
                moved |= self.sweep_level(lower);
            }
            if !moved {
                trace!(level, sweeps = sweep; "Level settled");
                return;
            }
        }
        debug!(level; "Level did not settle, some relationships stay off their median");
    }

    /// One left-to-right pass over `level`.
    ///
    /// Returns `true` if a node that was already placed moved.
    fn sweep_level(&mut self, level: usize) -> bool {
        let order = self.order;
        let ids = order.level(level);
        let mut moved = false;

        for (rank, id) in ids.iter().copied().enumerate() {
            let minimum = match rank.checked_sub(1).map(|previous| ids[previous]) {
                None => self.dimensions.graph_padding() / 2.0 + self.half(id),
                Some(previous) => self.after(previous, id),
            };
            let placed = self.xs.get(&id).copied();
            let x = placed.map_or(minimum, |placed| placed.max(minimum));
            if placed.is_some_and(|placed| x > placed + EPSILON) {
                moved = true;
            }
            self.xs.insert(id, x);

            let Some(median) = self.children_median(id) else {
                continue;
            };

            if x < median - EPSILON {
                self.xs.insert(id, median);
                moved |= placed.is_some();
                let partner = rank
                    .checked_sub(1)
                    .map(|previous| ids[previous])
                    .filter(|partner| self.is_sole_partner(*partner, id));
                if let Some(partner) = partner {
                    let x = median
                        - self.half(id)
                        - self.half(partner)
                        - self.dimensions.horizontal_spacing();
                    self.xs.insert(partner, x);
                }
            } else if x > median + EPSILON {
                self.slide_children(id, level, x - median);
                moved = true;
            }
        }

        moved
    }

    /// Median x of a relationship's children, if it has any placed.
    fn children_median(&self, id: Id) -> Option<f32> {
        let relationship = self.pedigree.relationship(id)?;
        let mut xs: Vec<f32> = relationship
            .children()
            .iter()
            .filter_map(|child| self.xs.get(&child).copied())
            .collect();
        median(&mut xs)
    }

    /// Returns `true` if `relationship` is the only one `partner` belongs to.
    fn is_sole_partner(&self, partner: Id, relationship: Id) -> bool {
        self.pedigree
            .individual(partner)
            .is_some_and(|individual| individual.partner_in().as_slice() == [relationship])
    }

    /// Moves the subtree under `relationship` right by `offset`.
    ///
    /// Only levels below `level` are touched; they are re-compacted afterwards.
    /// A co-partner whose parental relationship is another node of `level`
    /// stays where it is, together with everything reached only through it.
    fn slide_children(&mut self, relationship: Id, level: usize, offset: f32) {
        trace!(relationship:%, offset; "Sliding children");
        self.slides += 1;

        let mut seen: HashSet<Id> = HashSet::new();
        let mut pending: Vec<Id> = self
            .pedigree
            .relationship(relationship)
            .map(|relationship| relationship.children().iter().collect())
            .unwrap_or_default();

        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            if self.heights.get(id).is_none_or(|height| height >= level) {
                continue;
            }
            if self.is_held_by_other(id, relationship, level) {
                continue;
            }
            if let Some(x) = self.xs.get_mut(&id) {
                *x += offset;
            }

            if let Some(individual) = self.pedigree.individual(id) {
                pending.extend(individual.partner_in().iter());
            } else if let Some(partnership) = self.pedigree.relationship(id) {
                pending.extend(partnership.partners().iter());
                pending.extend(partnership.children().iter());
            }
        }

        for lower in 0..level {
            self.compact(lower);
        }
    }

    /// Returns `true` if `id` is the child of a relationship on `level` other
    /// than `relationship`.
    fn is_held_by_other(&self, id: Id, relationship: Id, level: usize) -> bool {
        self.pedigree
            .individual(id)
            .and_then(|individual| individual.child_of())
            .is_some_and(|parental| {
                parental != relationship && self.heights.get(parental) == Some(level)
            })
    }

    /// Pushes nodes right until neighbours keep the minimum separation.
    fn compact(&mut self, level: usize) {
        let order = self.order;
        let ids = order.level(level);
        for pair in ids.windows(2) {
            let minimum = self.after(pair[0], pair[1]);
            if let Some(x) = self.xs.get_mut(&pair[1]) {
                *x = x.max(minimum);
            }
        }
    }
}

/// Median of `values`; the mean of the two middle values for even counts.
fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f32::total_cmp);
    let middle = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[middle - 1] + values[middle]) / 2.0)
    } else {
        Some(values[middle])
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use kinship_core::record::IndividualRecord;

    use super::*;
    use crate::{
        config::LayoutConfig,
        layout::{
            height::assign_heights,
            order::{Order, choose_order},
        },
        structure::{BuildOptions, build},
    };

    fn child_of(id: &str, parents: &[&str]) -> IndividualRecord {
        let mut record = IndividualRecord::new(id);
        record.parents = parents.iter().map(|parent| (*parent).into()).collect();
        record
    }

    fn positions(records: &[IndividualRecord]) -> (Pedigree, Positions) {
        let (pedigree, _) = build(records, &BuildOptions::default()).unwrap();
        let heights = assign_heights(&pedigree);
        let search = choose_order(&pedigree, &heights);
        let dimensions = LayoutConfig::default().dimensions();
        let positions = assign_positions(&pedigree, &heights, &search.order, &dimensions);
        (pedigree, positions)
    }

    fn at(positions: &Positions, id: &str) -> Point {
        positions[&Id::new(id)]
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }

    #[test]
    fn test_row_center() {
        let dimensions = LayoutConfig::default().dimensions();
        assert_approx_eq!(f32, row_center(&dimensions, 1, 1), 60.0);
        assert_approx_eq!(f32, row_center(&dimensions, 1, 0), 180.0);
    }

    #[test]
    fn test_relationship_centered_over_three_children() {
        let mut proband = child_of("a", &["f", "m"]);
        proband.is_proband = true;
        let (_, positions) = positions(&[
            proband,
            child_of("b", &["f", "m"]),
            child_of("c", &["f", "m"]),
            IndividualRecord::new("f"),
            IndividualRecord::new("m"),
        ]);

        let relationship = at(&positions, "relationship:f,m");
        assert_approx_eq!(f32, relationship.x(), at(&positions, "b").x(), epsilon = 1.0);
        assert_approx_eq!(f32, relationship.y(), at(&positions, "f").y());
        assert!(at(&positions, "f").x() < relationship.x());
        assert!(relationship.x() < at(&positions, "m").x());
    }

    #[test]
    fn test_leftmost_edge_at_padding() {
        let mut proband = child_of("a", &["f", "m"]);
        proband.is_proband = true;
        let (_, positions) = positions(&[
            proband,
            IndividualRecord::new("f"),
            IndividualRecord::new("m"),
        ]);

        let min_left = positions
            .values()
            .map(|point| point.x())
            .fold(f32::INFINITY, f32::min);
        // The leftmost node is an individual.
        assert_approx_eq!(f32, min_left - 20.0, 40.0);
    }

    #[test]
    fn test_children_slide_under_wide_parents() {
        // Two couples sharing `p2`, one child each.
        let mut proband = IndividualRecord::new("p1");
        proband.is_proband = true;
        let records = vec![
            proband,
            IndividualRecord::new("p2"),
            child_of("k", &["p1", "p2"]),
            IndividualRecord::new("q1"),
            child_of("j", &["q1", "p2"]),
        ];
        let (pedigree, positions) = positions(&records);

        for relationship in pedigree.relationships() {
            let x = positions[&relationship.id()].x();
            let mut children: Vec<f32> = relationship
                .children()
                .iter()
                .map(|child| positions[&child].x())
                .collect();
            let centre = median(&mut children).unwrap();
            assert_approx_eq!(f32, x, centre, epsilon = 1.0);
        }
    }

    #[test]
    fn test_later_slide_keeps_earlier_relationship_centered() {
        // `ca` and `cb` come from two couples on the top row and have a child
        // together. Sliding `cb` under its parents must not drag `ca`.
        let mut proband = child_of("k", &["ca", "cb"]);
        proband.is_proband = true;
        let records = vec![
            proband,
            child_of("ca", &["a1", "a2"]),
            child_of("cb", &["b1", "b2"]),
            IndividualRecord::new("a1"),
            IndividualRecord::new("a2"),
            IndividualRecord::new("b1"),
            IndividualRecord::new("b2"),
        ];
        let (pedigree, _) = build(&records, &BuildOptions::default()).unwrap();
        let heights = assign_heights(&pedigree);

        let levels: Vec<Vec<Id>> = [
            vec!["k"],
            vec!["ca", "relationship:ca,cb", "cb"],
            vec!["a1", "relationship:a1,a2", "a2", "b1", "relationship:b1,b2", "b2"],
        ]
        .iter()
        .map(|level| level.iter().map(|id| Id::new(id)).collect())
        .collect();
        for (height, level) in levels.iter().enumerate() {
            for id in level {
                assert_eq!(heights.get(*id), Some(height), "height of {id}");
            }
        }
        let order = Order::from_levels(levels);
        let dimensions = LayoutConfig::default().dimensions();
        let positions = assign_positions(&pedigree, &heights, &order, &dimensions);

        for (relationship, child) in [
            ("relationship:a1,a2", "ca"),
            ("relationship:b1,b2", "cb"),
            ("relationship:ca,cb", "k"),
        ] {
            assert_approx_eq!(
                f32,
                at(&positions, relationship).x(),
                at(&positions, child).x(),
                epsilon = 1.0
            );
        }
        assert!(at(&positions, "ca").x() < at(&positions, "relationship:ca,cb").x());
        assert!(at(&positions, "relationship:ca,cb").x() < at(&positions, "cb").x());
    }

    #[test]
    fn test_nodes_on_a_row_do_not_overlap() {
        let mut proband = child_of("a", &["f", "m"]);
        proband.is_proband = true;
        let (pedigree, positions) = positions(&[
            proband,
            child_of("b", &["f", "m"]),
            IndividualRecord::new("f"),
            child_of("m", &["g1", "g2"]),
            IndividualRecord::new("g1"),
            IndividualRecord::new("g2"),
            child_of("u", &["g1", "g2"]),
        ]);
        let dimensions = LayoutConfig::default().dimensions();

        let mut rows: IndexMap<u32, Vec<(f32, f32)>> = IndexMap::new();
        for (id, point) in &positions {
            let half = half_width(&pedigree, &dimensions, *id);
            rows.entry(point.y().round() as u32)
                .or_default()
                .push((point.x() - half, point.x() + half));
        }
        for spans in rows.values_mut() {
            spans.sort_by(|a, b| a.0.total_cmp(&b.0));
            for pair in spans.windows(2) {
                assert!(pair[0].1 <= pair[1].0 + EPSILON);
            }
        }
    }
}
