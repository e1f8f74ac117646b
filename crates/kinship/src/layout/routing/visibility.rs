//! Orthogonal visibility graph.
//!
//! Guide lines run through node centers, obstacle borders and ledge ends.
//! Each line is cut by the obstacles it passes through; the remaining pieces
//! are corridors. Vertices sit on the grid formed by the guide lines and an
//! atomic segment joins two grid neighbours when one corridor covers both.

use std::collections::HashMap;

use kinship_core::geometry::{Axis, Bounds, EPSILON, Interval, Point};

/// Grid coordinates of a vertex: `(column, row)` into the guide lines.
pub(super) type Vertex = (usize, usize);

/// Direction of travel along a corridor, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(super) enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub(super) const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub(super) fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    pub(super) fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit step of this direction in layout space.
    pub(super) fn unit(self) -> Point {
        match self {
            Direction::Up => Point::new(0.0, -1.0),
            Direction::Down => Point::new(0.0, 1.0),
            Direction::Left => Point::new(-1.0, 0.0),
            Direction::Right => Point::new(1.0, 0.0),
        }
    }

    fn step(self, (column, row): Vertex) -> Option<Vertex> {
        match self {
            Direction::Up => row.checked_sub(1).map(|row| (column, row)),
            Direction::Down => Some((column, row + 1)),
            Direction::Left => column.checked_sub(1).map(|column| (column, row)),
            Direction::Right => Some((column + 1, row)),
        }
    }
}

#[derive(Debug)]
pub(super) struct VisibilityGraph {
    xs: Vec<f32>,
    ys: Vec<f32>,
    adjacency: HashMap<Vertex, [Option<usize>; 4]>,
    segments: Vec<(Vertex, Vertex)>,
}

impl VisibilityGraph {
    /// Builds the graph from obstacle boxes and guide line positions.
    pub(super) fn build(obstacles: &[Bounds], guide_xs: Vec<f32>, guide_ys: Vec<f32>) -> Self {
        let xs = normalize(guide_xs);
        let ys = normalize(guide_ys);

        let mut graph = Self {
            xs,
            ys,
            adjacency: HashMap::new(),
            segments: Vec::new(),
        };

        let (Some(&x_first), Some(&x_last), Some(&y_first), Some(&y_last)) = (
            graph.xs.first(),
            graph.xs.last(),
            graph.ys.first(),
            graph.ys.last(),
        ) else {
            return graph;
        };
        let x_extent = Interval::new(x_first, x_last);
        let y_extent = Interval::new(y_first, y_last);

        for row in 0..graph.ys.len() {
            let pieces = corridors(graph.ys[row], Axis::Horizontal, x_extent, obstacles);
            for column in 1..graph.xs.len() {
                if covers(&pieces, graph.xs[column - 1], graph.xs[column]) {
                    graph.link((column - 1, row), Direction::Right);
                }
            }
        }

        for column in 0..graph.xs.len() {
            let pieces = corridors(graph.xs[column], Axis::Vertical, y_extent, obstacles);
            for row in 1..graph.ys.len() {
                if covers(&pieces, graph.ys[row - 1], graph.ys[row]) {
                    graph.link((column, row - 1), Direction::Down);
                }
            }
        }

        graph
    }

    fn link(&mut self, from: Vertex, direction: Direction) {
        let Some(to) = direction.step(from) else {
            return;
        };
        let segment = self.segments.len();
        self.segments.push((from, to));
        self.adjacency.entry(from).or_insert([None; 4])[direction.index()] = Some(segment);
        self.adjacency.entry(to).or_insert([None; 4])[direction.opposite().index()] =
            Some(segment);
    }

    /// The vertex at `point`, if guide lines cross there.
    pub(super) fn vertex_at(&self, point: Point) -> Option<Vertex> {
        Some((find(&self.xs, point.x())?, find(&self.ys, point.y())?))
    }

    pub(super) fn point(&self, (column, row): Vertex) -> Point {
        Point::new(self.xs[column], self.ys[row])
    }

    /// The segment leaving `vertex` in `direction` and the vertex it reaches.
    pub(super) fn step(&self, vertex: Vertex, direction: Direction) -> Option<(usize, Vertex)> {
        let segment = self.adjacency.get(&vertex)?[direction.index()]?;
        Some((segment, direction.step(vertex)?))
    }

    pub(super) fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

/// Sorts guide positions and merges the ones closer than [`EPSILON`].
fn normalize(mut values: Vec<f32>) -> Vec<f32> {
    values.retain(|value| value.is_finite());
    values.sort_by(f32::total_cmp);
    values.dedup_by(|a, b| (*a - *b).abs() <= EPSILON);
    values
}

fn find(values: &[f32], value: f32) -> Option<usize> {
    let index = values.partition_point(|candidate| *candidate < value - EPSILON);
    values
        .get(index)
        .filter(|found| (**found - value).abs() <= EPSILON)
        .map(|_| index)
}

/// Corridor pieces of the guide line at `position` running along `axis`.
fn corridors(position: f32, axis: Axis, extent: Interval, obstacles: &[Bounds]) -> Vec<Interval> {
    let cuts: Vec<Interval> = obstacles
        .iter()
        .filter(|obstacle| obstacle.interval(axis.cross()).contains_strict(position))
        .map(|obstacle| obstacle.interval(axis))
        .collect();
    extent.subtract(&cuts)
}

fn covers(pieces: &[Interval], from: f32, to: f32) -> bool {
    pieces
        .iter()
        .any(|piece| piece.contains(from) && piece.contains(to))
}
