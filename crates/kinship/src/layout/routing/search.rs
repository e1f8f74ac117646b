//! Priority-queue shortest path search over the visibility graph.
//!
//! States are `(vertex, direction of arrival)` so bends can be priced and
//! reversals forbidden. The estimate adds the Manhattan distance to the goal,
//! which never overestimates the remaining cost.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, HashSet},
};

use super::visibility::{Direction, Vertex, VisibilityGraph};

/// Fixed-point scale for path costs.
const COST_SCALE: f32 = 10.0;

/// Extra cost of one bend, in pixels.
const BEND_PENALTY: f32 = 20.0;

/// Upper bound on heap pops for one search.
const MAX_STEPS: usize = 100_000;

/// Endpoints of one search.
#[derive(Debug, Clone, Copy)]
pub(super) struct Request {
    pub start: Vertex,
    /// Direction the path leaves `start` in.
    pub leaving: Direction,
    pub goal: Vertex,
    /// Direction the path must continue in after `goal`.
    pub arriving: Direction,
}

/// A path found by [`shortest_path`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct Route {
    pub vertices: Vec<Vertex>,
    pub segments: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct State {
    vertex: Vertex,
    direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    estimate: u64,
    cost: u64,
    state: State,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.cost.cmp(&self.cost))
            .then_with(|| other.state.vertex.1.cmp(&self.state.vertex.1))
            .then_with(|| other.state.vertex.0.cmp(&self.state.vertex.0))
            .then_with(|| other.state.direction.cmp(&self.state.direction))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn scaled(pixels: f32) -> u64 {
    (pixels * COST_SCALE).round().max(0.0) as u64
}

/// Finds the cheapest path for `request` that avoids `used` segments.
///
/// Returns `None` when the goal is unreachable or the step budget runs out.
pub(super) fn shortest_path(
    graph: &VisibilityGraph,
    request: Request,
    used: &HashSet<usize>,
) -> Option<Route> {
    let goal_point = graph.point(request.goal);
    let estimate = |vertex: Vertex| scaled(graph.point(vertex).manhattan_distance(goal_point));
    let bend = scaled(BEND_PENALTY);

    if request.start == request.goal {
        return (request.leaving != request.arriving.opposite()).then(|| Route {
            vertices: vec![request.start],
            segments: Vec::new(),
        });
    }

    let start = State {
        vertex: request.start,
        direction: request.leaving,
    };
    let mut best: HashMap<State, u64> = HashMap::from([(start, 0)]);
    let mut previous: HashMap<State, (State, usize)> = HashMap::new();
    let mut heap = BinaryHeap::from([Entry {
        estimate: estimate(request.start),
        cost: 0,
        state: start,
    }]);

    let mut steps = 0;
    let mut reached = None;

    while let Some(Entry { cost, state, .. }) = heap.pop() {
        steps += 1;
        if steps > MAX_STEPS {
            break;
        }
        if best.get(&state).is_some_and(|known| cost > *known) {
            continue;
        }
        if state.vertex == request.goal {
            reached = Some(state);
            break;
        }

        for direction in Direction::ALL {
            if direction == state.direction.opposite() {
                continue;
            }
            let Some((segment, next)) = graph.step(state.vertex, direction) else {
                continue;
            };
            if used.contains(&segment) {
                continue;
            }

            let mut next_cost =
                cost + scaled(graph.point(state.vertex).manhattan_distance(graph.point(next)));
            if direction != state.direction {
                next_cost += bend;
            }
            if next == request.goal {
                if direction == request.arriving.opposite() {
                    continue;
                }
                if direction != request.arriving {
                    next_cost += bend;
                }
            }

            let next_state = State {
                vertex: next,
                direction,
            };
            if best.get(&next_state).is_some_and(|known| next_cost >= *known) {
                continue;
            }
            best.insert(next_state, next_cost);
            previous.insert(next_state, (state, segment));
            heap.push(Entry {
                estimate: next_cost + estimate(next),
                cost: next_cost,
                state: next_state,
            });
        }
    }

    let mut state = reached?;
    let mut route = Route {
        vertices: vec![state.vertex],
        segments: Vec::new(),
    };
    while let Some((before, segment)) = previous.get(&state) {
        route.vertices.push(before.vertex);
        route.segments.push(*segment);
        state = *before;
    }
    route.vertices.reverse();
    route.segments.reverse();
    Some(route)
}
