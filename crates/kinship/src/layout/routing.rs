//! Edge routing.
//!
//! Direct edges (relationship stem, sibling bus, child stems) are fixed
//! straight segments and are emitted first. Adjustable edges join every
//! partner to its relationship: a short ledge leaves each end on the sides
//! facing each other and the gap between the ledge ends is routed over a
//! visibility graph. An atomic segment carries at most one adjustable edge.
//!
//! When an adjustable edge cannot be routed, all adjustable edges are routed
//! again on a coarser graph where direct edges no longer block corridors.

mod search;
mod visibility;

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, info, trace, warn};
use serde::Serialize;

use kinship_core::{
    geometry::{Bounds, EPSILON, Point, Size},
    identifier::Id,
};

use crate::{
    config::Dimensions,
    error::KinshipError,
    layout::position::{Positions, half_width},
    structure::Pedigree,
};

use search::{Request, shortest_path};
use visibility::{Direction, VisibilityGraph};

/// How an edge is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EdgeKind {
    /// Fixed straight segment.
    Direct,
    /// Routed orthogonal polyline.
    Adjustable,
}

/// What an edge connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EdgeRole {
    /// From a child's top up to its sibling bus.
    ChildStem,
    /// Horizontal line joining a relationship stem with its child stems.
    SiblingBus,
    /// From a relationship's bottom down to its sibling bus.
    RelationshipStem,
    /// From a partner to its relationship.
    Partner,
}

/// A connector between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    source: Id,
    target: Id,
    kind: EdgeKind,
    role: EdgeRole,
    points: Vec<Point>,
    #[serde(skip)]
    segments: Vec<usize>,
}

impl Edge {
    fn direct(source: Id, target: Id, role: EdgeRole, from: Point, to: Point) -> Self {
        Self {
            source,
            target,
            kind: EdgeKind::Direct,
            role,
            points: vec![from, to],
            segments: Vec::new(),
        }
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn role(&self) -> EdgeRole {
        self.role
    }

    /// The polyline, from source to target.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Visibility graph segments an adjustable edge occupies.
    ///
    /// Empty for direct edges.
    pub fn segments(&self) -> &[usize] {
        &self.segments
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subdivision {
    /// Direct edges block corridors.
    Fine,
    /// Only node boxes block corridors.
    Coarse,
}

/// One adjustable edge to route.
#[derive(Debug, Clone, Copy)]
struct Ledges {
    partner: Id,
    relationship: Id,
    /// Point on the partner's border.
    source_anchor: Point,
    source_end: Point,
    leaving: Direction,
    target_end: Point,
    /// Point on the relationship's border.
    target_anchor: Point,
    arriving: Direction,
}

/// Routes every edge of a positioned pedigree.
///
/// # Errors
///
/// Returns [`KinshipError::Routing`] when an adjustable edge cannot be routed
/// even on the coarse graph.
pub fn route_edges(
    pedigree: &Pedigree,
    positions: &Positions,
    dimensions: &Dimensions,
) -> Result<Vec<Edge>, KinshipError> {
    info!(relationships = pedigree.relationship_count(); "Routing edges");

    // Horizontal spacing never drops below `MIN_HORIZONTAL_SPACING`, so the
    // gap between row neighbours holds both margins and both ledge ends.
    let margin = dimensions.horizontal_spacing() / 4.0;
    let boxes = node_boxes(pedigree, positions, dimensions);

    let mut edges = direct_edges(pedigree, &boxes, dimensions);
    let direct_count = edges.len();

    let requests = ledges(pedigree, &boxes, margin * 1.5);
    let adjustable =
        match route_adjustable(&requests, &boxes, &edges, margin, Subdivision::Fine) {
            Ok(adjustable) => adjustable,
            Err(failed) => {
                warn!(
                    source:% = failed.partner,
                    target:% = failed.relationship;
                    "Adjustable edge could not be routed, retrying on a coarse graph"
                );
                route_adjustable(&requests, &boxes, &edges, margin, Subdivision::Coarse).map_err(
                    |failed| {
                        KinshipError::Routing(format!(
                            "no route from `{}` to `{}`",
                            failed.partner, failed.relationship
                        ))
                    },
                )?
            }
        };
    edges.extend(adjustable);

    debug!(direct = direct_count, adjustable = edges.len() - direct_count; "Edges routed");

    Ok(edges)
}

fn node_boxes(
    pedigree: &Pedigree,
    positions: &Positions,
    dimensions: &Dimensions,
) -> IndexMap<Id, Bounds> {
    positions
        .iter()
        .map(|(id, center)| {
            let size = if pedigree.relationship(*id).is_some() {
                dimensions.relationship()
            } else {
                Size::new(
                    half_width(pedigree, dimensions, *id) * 2.0,
                    dimensions.individual_height(),
                )
            };
            (*id, Bounds::new_from_center(*center, size))
        })
        .collect()
}

/// Relationship stem, sibling bus and child stems of every relationship.
fn direct_edges(
    pedigree: &Pedigree,
    boxes: &IndexMap<Id, Bounds>,
    dimensions: &Dimensions,
) -> Vec<Edge> {
    let mut edges = Vec::new();

    for relationship in pedigree.relationships() {
        let Some(marker) = boxes.get(&relationship.id()) else {
            continue;
        };
        let children: Vec<(Id, Bounds)> = relationship
            .children()
            .iter()
            .filter_map(|child| boxes.get(&child).map(|bounds| (child, *bounds)))
            .collect();
        let Some(highest_top) = children
            .iter()
            .map(|(_, bounds)| bounds.min_y())
            .min_by(f32::total_cmp)
        else {
            continue;
        };

        let bus_y = highest_top - dimensions.vertical_spacing() / 2.0;
        let stem_x = marker.center().x();
        let id = relationship.id();

        edges.push(Edge::direct(
            id,
            id,
            EdgeRole::RelationshipStem,
            Point::new(stem_x, marker.max_y()),
            Point::new(stem_x, bus_y),
        ));

        let (bus_start, bus_end) = children.iter().fold((stem_x, stem_x), |(lo, hi), (_, b)| {
            (lo.min(b.center().x()), hi.max(b.center().x()))
        });
        if bus_end - bus_start > EPSILON {
            edges.push(Edge::direct(
                id,
                id,
                EdgeRole::SiblingBus,
                Point::new(bus_start, bus_y),
                Point::new(bus_end, bus_y),
            ));
        }

        for (child, bounds) in &children {
            let x = bounds.center().x();
            edges.push(Edge::direct(
                *child,
                id,
                EdgeRole::ChildStem,
                Point::new(x, bounds.min_y()),
                Point::new(x, bus_y),
            ));
        }
    }

    edges
}

/// Ledges of every partner edge.
///
/// Each ledge leaves its node on the side facing the other end. A side holds
/// one ledge; when the facing side is taken the ledge moves to a free side.
fn ledges(pedigree: &Pedigree, boxes: &IndexMap<Id, Bounds>, length: f32) -> Vec<Ledges> {
    let mut requests = Vec::new();
    let mut taken: HashSet<(Id, Direction)> = HashSet::new();

    for relationship in pedigree.relationships() {
        let Some(marker) = boxes.get(&relationship.id()) else {
            continue;
        };
        for partner in relationship.partners().iter() {
            let (Some(person), Some(individual)) =
                (boxes.get(&partner), pedigree.individual(partner))
            else {
                continue;
            };
            let facing = facing(person.center(), marker.center());

            let leaving = free_side(
                &mut taken,
                partner,
                [
                    Some(facing),
                    Some(Direction::Down),
                    individual.child_of().is_none().then_some(Direction::Up),
                    Some(Direction::Left),
                    Some(Direction::Right),
                ],
            );
            let side = free_side(
                &mut taken,
                relationship.id(),
                [
                    Some(facing.opposite()),
                    Some(Direction::Up),
                    relationship.children().is_empty().then_some(Direction::Down),
                    Some(Direction::Left),
                    Some(Direction::Right),
                ],
            );

            let source_anchor = border_point(person, leaving);
            let target_anchor = border_point(marker, side);
            requests.push(Ledges {
                partner,
                relationship: relationship.id(),
                source_anchor,
                source_end: source_anchor.add_point(leaving.unit().scale(length)),
                leaving,
                target_end: target_anchor.add_point(side.unit().scale(length)),
                target_anchor,
                arriving: side.opposite(),
            });
        }
    }

    requests
}

/// Direction from `from` towards `to`, preferring horizontal within a row.
fn facing(from: Point, to: Point) -> Direction {
    if (from.y() - to.y()).abs() <= EPSILON {
        if from.x() <= to.x() {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if from.y() < to.y() {
        Direction::Down
    } else {
        Direction::Up
    }
}

/// Claims the first untaken side of `node` among `candidates`.
///
/// Falls back to the first candidate when every side is taken.
fn free_side(
    taken: &mut HashSet<(Id, Direction)>,
    node: Id,
    candidates: [Option<Direction>; 5],
) -> Direction {
    let preferred = candidates[0].unwrap_or(Direction::Down);
    let side = candidates
        .into_iter()
        .flatten()
        .find(|side| !taken.contains(&(node, *side)))
        .unwrap_or(preferred);
    taken.insert((node, side));
    side
}

/// Midpoint of the side of `bounds` facing `direction`.
fn border_point(bounds: &Bounds, direction: Direction) -> Point {
    let center = bounds.center();
    match direction {
        Direction::Up => center.with_y(bounds.min_y()),
        Direction::Down => center.with_y(bounds.max_y()),
        Direction::Left => center.with_x(bounds.min_x()),
        Direction::Right => center.with_x(bounds.max_x()),
    }
}

/// Routes all adjustable edges on one graph.
///
/// Returns the first request that could not be routed on failure.
fn route_adjustable(
    requests: &[Ledges],
    boxes: &IndexMap<Id, Bounds>,
    direct: &[Edge],
    margin: f32,
    subdivision: Subdivision,
) -> Result<Vec<Edge>, Ledges> {
    let graph = build_graph(requests, boxes, direct, margin, subdivision);
    trace!(
        subdivision:?,
        segments = graph.segment_count();
        "Built visibility graph"
    );

    let mut used: HashSet<usize> = HashSet::new();
    let mut endpoints = Vec::with_capacity(requests.len());
    for request in requests {
        let (Some(start), Some(goal)) = (
            graph.vertex_at(request.source_end),
            graph.vertex_at(request.target_end),
        ) else {
            return Err(*request);
        };
        // The stretch between a ledge end and its node belongs to the ledge.
        for (vertex, direction) in [
            (start, request.leaving.opposite()),
            (goal, request.arriving),
        ] {
            if let Some((segment, _)) = graph.step(vertex, direction) {
                used.insert(segment);
            }
        }
        endpoints.push((start, goal));
    }

    let mut edges = Vec::with_capacity(requests.len());
    for (request, (start, goal)) in requests.iter().zip(endpoints) {
        let route = shortest_path(
            &graph,
            Request {
                start,
                leaving: request.leaving,
                goal,
                arriving: request.arriving,
            },
            &used,
        )
        .ok_or(*request)?;
        used.extend(route.segments.iter().copied());

        let mut points = Vec::with_capacity(route.vertices.len() + 2);
        points.push(request.source_anchor);
        points.extend(route.vertices.iter().map(|vertex| graph.point(*vertex)));
        points.push(request.target_anchor);

        edges.push(Edge {
            source: request.partner,
            target: request.relationship,
            kind: EdgeKind::Adjustable,
            role: EdgeRole::Partner,
            points: simplify(points),
            segments: route.segments,
        });
    }

    Ok(edges)
}

fn build_graph(
    requests: &[Ledges],
    boxes: &IndexMap<Id, Bounds>,
    direct: &[Edge],
    margin: f32,
    subdivision: Subdivision,
) -> VisibilityGraph {
    let mut obstacles: Vec<Bounds> = boxes
        .values()
        .map(|bounds| bounds.inflate(margin, margin))
        .collect();

    if subdivision == Subdivision::Fine {
        for edge in direct {
            let [from, to] = [edge.points[0], edge.points[edge.points.len() - 1]];
            let line = Bounds::from_corners(from, to);
            let inflated = if (from.x() - to.x()).abs() <= EPSILON {
                line.inflate(margin, 0.0)
            } else {
                line.inflate(0.0, margin)
            };
            obstacles.push(inflated);
        }
    }

    let mut xs: Vec<f32> = Vec::new();
    let mut ys: Vec<f32> = Vec::new();

    for (bounds, obstacle) in boxes.values().zip(&obstacles) {
        xs.extend([bounds.center().x(), obstacle.min_x(), obstacle.max_x()]);
        ys.extend([bounds.center().y(), obstacle.min_y(), obstacle.max_y()]);
    }
    for obstacle in obstacles.iter().skip(boxes.len()) {
        xs.extend([obstacle.min_x(), obstacle.max_x()]);
        ys.extend([obstacle.min_y(), obstacle.max_y()]);
    }
    for request in requests {
        xs.extend([request.source_end.x(), request.target_end.x()]);
        ys.extend([request.source_end.y(), request.target_end.y()]);
    }
    ys.extend(row_midlines(boxes));

    if let Some(extent) = obstacles.iter().copied().reduce(|a, b| a.merge(&b)) {
        xs.extend([extent.min_x() - margin, extent.max_x() + margin]);
        ys.extend([extent.min_y() - margin, extent.max_y() + margin]);
    }

    VisibilityGraph::build(&obstacles, xs, ys)
}

/// Horizontal lines halfway between consecutive rows of nodes.
fn row_midlines(boxes: &IndexMap<Id, Bounds>) -> Vec<f32> {
    let mut rows: Vec<(f32, f32)> = Vec::new();
    for bounds in boxes.values() {
        match rows
            .iter_mut()
            .find(|(center, _)| (*center - bounds.center().y()).abs() <= EPSILON)
        {
            Some((_, half)) => *half = half.max(bounds.height() / 2.0),
            None => rows.push((bounds.center().y(), bounds.height() / 2.0)),
        }
    }
    rows.sort_by(|a, b| a.0.total_cmp(&b.0));

    rows.windows(2)
        .map(|pair| {
            let upper_bottom = pair[0].0 + pair[0].1;
            let lower_top = pair[1].0 - pair[1].1;
            (upper_bottom + lower_top) / 2.0
        })
        .collect()
}

/// Drops repeated points and interior points on a straight run.
fn simplify(points: Vec<Point>) -> Vec<Point> {
    let mut simplified: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        if simplified.last().is_some_and(|last| last.approx_eq(point)) {
            continue;
        }
        if simplified.len() >= 2 {
            let a = simplified[simplified.len() - 2];
            let b = simplified[simplified.len() - 1];
            let vertical =
                (a.x() - b.x()).abs() <= EPSILON && (b.x() - point.x()).abs() <= EPSILON;
            let horizontal =
                (a.y() - b.y()).abs() <= EPSILON && (b.y() - point.y()).abs() <= EPSILON;
            if vertical || horizontal {
                simplified.pop();
            }
        }
        simplified.push(point);
    }
    simplified
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use kinship_core::record::IndividualRecord;

    use super::*;
    use crate::{
        config::LayoutConfig,
        layout::{height::assign_heights, order::choose_order, position::assign_positions},
        structure::{BuildOptions, build},
    };

    fn child_of(id: &str, parents: &[&str]) -> IndividualRecord {
        let mut record = IndividualRecord::new(id);
        record.parents = parents.iter().map(|parent| (*parent).into()).collect();
        record
    }

    fn routed(records: &[IndividualRecord]) -> (Pedigree, Positions, Vec<Edge>) {
        let (pedigree, _) = build(records, &BuildOptions::default()).unwrap();
        let heights = assign_heights(&pedigree);
        let search = choose_order(&pedigree, &heights);
        let dimensions = LayoutConfig::default().dimensions();
        let positions = assign_positions(&pedigree, &heights, &search.order, &dimensions);
        let edges = route_edges(&pedigree, &positions, &dimensions).unwrap();
        (pedigree, positions, edges)
    }

    fn family() -> Vec<IndividualRecord> {
        let mut proband = child_of("a", &["f", "m"]);
        proband.is_proband = true;
        vec![
            proband,
            child_of("b", &["f", "m"]),
            IndividualRecord::new("f"),
            IndividualRecord::new("m"),
        ]
    }

    #[test]
    fn test_simplify_drops_collinear_points() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 20.0),
        ];
        assert_eq!(
            simplify(points),
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 20.0),
            ]
        );
    }

    #[test]
    fn test_direct_edges_of_a_family() {
        let (_, positions, edges) = routed(&family());
        let relationship = Id::new("relationship:f,m");

        let direct: Vec<&Edge> = edges
            .iter()
            .filter(|edge| edge.kind() == EdgeKind::Direct)
            .collect();
        let roles: Vec<EdgeRole> = direct.iter().map(|edge| edge.role()).collect();
        assert_eq!(
            roles,
            vec![
                EdgeRole::RelationshipStem,
                EdgeRole::SiblingBus,
                EdgeRole::ChildStem,
                EdgeRole::ChildStem,
            ]
        );

        let child_top = positions[&Id::new("a")].y() - 20.0;
        let bus = direct[1];
        assert_approx_eq!(f32, bus.points()[0].y(), child_top - 20.0);
        assert_eq!(direct[2].source(), Id::new("a"));
        assert_eq!(direct[2].target(), relationship);
        assert_eq!(direct[0].source(), relationship);
        assert_eq!(direct[0].target(), relationship);
    }

    #[test]
    fn test_single_child_without_offset_has_no_bus() {
        let mut proband = child_of("a", &["f", "m"]);
        proband.is_proband = true;
        let (_, _, edges) = routed(&[
            proband,
            IndividualRecord::new("f"),
            IndividualRecord::new("m"),
        ]);
        assert!(edges.iter().all(|edge| edge.role() != EdgeRole::SiblingBus));
    }

    #[test]
    fn test_partner_edges_are_orthogonal_and_anchored() {
        let (_, positions, edges) = routed(&family());

        let partners: Vec<&Edge> = edges
            .iter()
            .filter(|edge| edge.role() == EdgeRole::Partner)
            .collect();
        assert_eq!(partners.len(), 2);

        for edge in partners {
            let points = edge.points();
            assert!(points.len() >= 2);
            for pair in points.windows(2) {
                let straight = (pair[0].x() - pair[1].x()).abs() <= EPSILON
                    || (pair[0].y() - pair[1].y()).abs() <= EPSILON;
                assert!(straight);
            }
            let source = positions[&edge.source()];
            let target = positions[&edge.target()];
            assert!(points[0].manhattan_distance(source) <= 20.0 + EPSILON);
            assert!(points[points.len() - 1].manhattan_distance(target) <= 4.0 + EPSILON);
        }
    }

    #[test]
    fn test_adjustable_edges_do_not_share_segments() {
        let mut proband = child_of("a", &["f", "m"]);
        proband.is_proband = true;
        let (_, _, edges) = routed(&[
            proband,
            IndividualRecord::new("f"),
            child_of("m", &["g1", "g2"]),
            IndividualRecord::new("g1"),
            IndividualRecord::new("g2"),
            child_of("n", &["m", "o"]),
            IndividualRecord::new("o"),
        ]);

        let mut seen = HashSet::new();
        for edge in edges.iter().filter(|edge| edge.kind() == EdgeKind::Adjustable) {
            for segment in edge.segments() {
                assert!(seen.insert(*segment), "segment {segment} used twice");
            }
        }
    }
}
