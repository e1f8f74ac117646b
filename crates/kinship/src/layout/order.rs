//! Crossing-minimizing ordering.
//!
//! Candidate orders are produced by permuting buckets of root and leaf
//! individuals and walking the pedigree from them depth-first and
//! breadth-first, with neighbours taken forward and reversed. Every candidate
//! is scored with a crossing heuristic and the one with fewest crossings
//! wins; ties go to the first candidate found.
//!
//! # Crossing heuristic
//!
//! - A link whose endpoints share a level counts one crossing for every node
//!   ranked strictly between them that has a link to another level.
//! - Links spanning levels are grouped by their `(upper, lower)` level pair;
//!   within a group every pair of links whose upper ranks and lower ranks are
//!   strictly inverted counts one crossing.

use std::{
    collections::{BTreeMap, HashSet, VecDeque},
    ops::ControlFlow,
};

use indexmap::IndexMap;
use log::{debug, info, trace};

use kinship_core::identifier::Id;

use crate::{layout::height::Heights, structure::Pedigree};

/// Upper bound on the number of candidate orders evaluated.
pub const MAX_CANDIDATES: usize = 480;

/// Left-to-right order of nodes on every level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Order {
    levels: Vec<Vec<Id>>,
    positions: IndexMap<Id, (usize, usize)>,
}

impl Order {
    pub(crate) fn from_levels(levels: Vec<Vec<Id>>) -> Self {
        let positions = levels
            .iter()
            .enumerate()
            .flat_map(|(level, ids)| {
                ids.iter()
                    .enumerate()
                    .map(move |(rank, id)| (*id, (level, rank)))
            })
            .collect();
        Self { levels, positions }
    }

    /// Nodes of `level`, left to right. Empty for unknown levels.
    pub fn level(&self, level: usize) -> &[Id] {
        self.levels.get(level).map_or(&[], Vec::as_slice)
    }

    /// All levels, bottom-most first.
    pub fn levels(&self) -> &[Vec<Id>] {
        &self.levels
    }

    /// Rank of `id` within its level.
    pub fn rank(&self, id: Id) -> Option<usize> {
        self.positions.get(&id).map(|(_, rank)| *rank)
    }

    /// `(level, rank)` of `id`.
    pub fn position(&self, id: Id) -> Option<(usize, usize)> {
        self.positions.get(&id).copied()
    }
}

/// The outcome of [`choose_order`].
#[derive(Debug, Clone)]
pub struct OrderSearch {
    pub order: Order,
    pub crossings: usize,
    /// Number of candidates scored before the search stopped.
    pub evaluated: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Traversal {
    DepthFirst,
    BreadthFirst,
}

const STRATEGIES: [(Traversal, bool); 4] = [
    (Traversal::DepthFirst, false),
    (Traversal::DepthFirst, true),
    (Traversal::BreadthFirst, false),
    (Traversal::BreadthFirst, true),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BucketKey {
    /// Roots whose only partnership is this relationship.
    Partners(Id),
    /// Childless siblings of this parental relationship.
    Siblings(Id),
    Single(Id),
}

/// Picks the candidate order with the fewest crossings.
///
/// Stops at the first zero-crossing candidate. If every candidate is worse
/// than the first one the first is kept.
pub fn choose_order(pedigree: &Pedigree, heights: &Heights) -> OrderSearch {
    info!(nodes = pedigree.node_count(); "Ordering nodes");

    let links = Links::new(pedigree, heights);
    let mut best: Option<(Order, usize)> = None;

    let evaluated = for_each_candidate(pedigree, heights, |candidate| {
        let crossings = links.count(&candidate);
        trace!(crossings; "Scored candidate order");
        let improved = best.as_ref().is_none_or(|(_, least)| crossings < *least);
        if improved {
            best = Some((candidate, crossings));
        }
        if crossings == 0 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    let (order, crossings) = best.unwrap_or_else(|| (canonical_order(heights), 0));

    debug!(evaluated, crossings; "Order chosen");

    OrderSearch {
        order,
        crossings,
        evaluated,
    }
}

/// Every candidate order the search may consider, in search order.
pub fn candidate_orders(pedigree: &Pedigree, heights: &Heights) -> Vec<Order> {
    let mut candidates = Vec::new();
    for_each_candidate(pedigree, heights, |candidate| {
        candidates.push(candidate);
        ControlFlow::Continue(())
    });
    candidates
}

/// Scores `order` with the crossing heuristic.
pub fn count_crossings(pedigree: &Pedigree, heights: &Heights, order: &Order) -> usize {
    Links::new(pedigree, heights).count(order)
}

/// Generates candidates until `visit` breaks or the cap is reached.
///
/// Returns the number of candidates generated.
fn for_each_candidate<F>(pedigree: &Pedigree, heights: &Heights, mut visit: F) -> usize
where
    F: FnMut(Order) -> ControlFlow<()>,
{
    let buckets = buckets(pedigree);
    let mut permutation: Vec<usize> = (0..buckets.len()).collect();
    let mut generated = 0;

    loop {
        let seeds: Vec<Id> = permutation
            .iter()
            .flat_map(|index| buckets[*index].iter().copied())
            .collect();

        for (traversal, reversed) in STRATEGIES {
            let candidate = traverse(pedigree, heights, &seeds, traversal, reversed);
            generated += 1;
            if visit(candidate).is_break() || generated >= MAX_CANDIDATES {
                return generated;
            }
        }

        if !next_permutation(&mut permutation) {
            return generated;
        }
    }
}

/// Groups root partners and childless siblings; other roots stand alone.
///
/// Root buckets come first, then sibling buckets, each in arena order.
fn buckets(pedigree: &Pedigree) -> Vec<Vec<Id>> {
    let mut roots: IndexMap<BucketKey, Vec<Id>> = IndexMap::new();
    let mut leaves: IndexMap<BucketKey, Vec<Id>> = IndexMap::new();

    for individual in pedigree.individuals() {
        let (buckets, key) = match (individual.child_of(), individual.partner_in().as_slice()) {
            (None, [only]) => (&mut roots, BucketKey::Partners(*only)),
            (None, _) => (&mut roots, BucketKey::Single(individual.id())),
            (Some(parental), _) if individual.children().is_empty() => {
                (&mut leaves, BucketKey::Siblings(parental))
            }
            (Some(_), _) => continue,
        };
        buckets.entry(key).or_default().push(individual.id());
    }

    roots.into_values().chain(leaves.into_values()).collect()
}

/// Assigns ranks in first-visit order, then appends unvisited nodes.
fn traverse(
    pedigree: &Pedigree,
    heights: &Heights,
    seeds: &[Id],
    traversal: Traversal,
    reversed: bool,
) -> Order {
    let mut levels: Vec<Vec<Id>> = vec![Vec::new(); heights.max() + 1];
    let mut visited: HashSet<Id> = HashSet::with_capacity(pedigree.node_count());
    let mut visit = |id: Id, levels: &mut Vec<Vec<Id>>| -> bool {
        if !visited.insert(id) {
            return false;
        }
        if let Some(level) = heights.get(id) {
            levels[level].push(id);
        }
        true
    };
    let neighbours = |id: Id| -> Vec<Id> {
        let mut neighbours = pedigree.neighbours(id);
        if reversed {
            neighbours.reverse();
        }
        neighbours
    };

    match traversal {
        Traversal::BreadthFirst => {
            let mut queue: VecDeque<Id> = VecDeque::new();
            for seed in seeds {
                if visit(*seed, &mut levels) {
                    queue.push_back(*seed);
                }
            }
            while let Some(id) = queue.pop_front() {
                for next in neighbours(id) {
                    if visit(next, &mut levels) {
                        queue.push_back(next);
                    }
                }
            }
        }
        Traversal::DepthFirst => {
            for seed in seeds {
                let mut stack = vec![*seed];
                while let Some(id) = stack.pop() {
                    if !visit(id, &mut levels) {
                        continue;
                    }
                    stack.extend(neighbours(id).into_iter().rev());
                }
            }
        }
    }

    for id in pedigree.node_ids() {
        visit(id, &mut levels);
    }

    Order::from_levels(levels)
}

fn canonical_order(heights: &Heights) -> Order {
    let mut levels: Vec<Vec<Id>> = vec![Vec::new(); heights.max() + 1];
    for (id, level) in heights.iter() {
        levels[level].push(id);
    }
    Order::from_levels(levels)
}

/// Rearranges `items` into the next lexicographic permutation.
///
/// Returns `false` once the last permutation has been reached.
fn next_permutation(items: &mut [usize]) -> bool {
    if items.len() < 2 {
        return false;
    }
    let mut pivot = items.len() - 1;
    while pivot > 0 && items[pivot - 1] >= items[pivot] {
        pivot -= 1;
    }
    if pivot == 0 {
        return false;
    }
    let mut successor = items.len() - 1;
    while items[successor] <= items[pivot - 1] {
        successor -= 1;
    }
    items.swap(pivot - 1, successor);
    items[pivot..].reverse();
    true
}

/// Partner and child links with the nodes that reach across levels.
struct Links {
    links: Vec<(Id, Id)>,
    attached: HashSet<Id>,
}

impl Links {
    fn new(pedigree: &Pedigree, heights: &Heights) -> Self {
        let mut links = Vec::new();
        for relationship in pedigree.relationships() {
            for partner in relationship.partners().iter() {
                links.push((partner, relationship.id()));
            }
            for child in relationship.children().iter() {
                links.push((relationship.id(), child));
            }
        }

        let attached = links
            .iter()
            .filter(|(a, b)| heights.get(*a) != heights.get(*b))
            .flat_map(|(a, b)| [*a, *b])
            .collect();

        Self { links, attached }
    }

    fn count(&self, order: &Order) -> usize {
        let mut crossings = 0;
        let mut spans: BTreeMap<(usize, usize), Vec<(usize, usize)>> = BTreeMap::new();

        for (a, b) in &self.links {
            let (Some((level_a, rank_a)), Some((level_b, rank_b))) =
                (order.position(*a), order.position(*b))
            else {
                continue;
            };

            if level_a == level_b {
                let (low, high) = (rank_a.min(rank_b), rank_a.max(rank_b));
                crossings += order.level(level_a)[low + 1..high]
                    .iter()
                    .filter(|id| self.attached.contains(id))
                    .count();
            } else if level_a > level_b {
                spans
                    .entry((level_a, level_b))
                    .or_default()
                    .push((rank_a, rank_b));
            } else {
                spans
                    .entry((level_b, level_a))
                    .or_default()
                    .push((rank_b, rank_a));
            }
        }

        for group in spans.values() {
            for (index, (upper, lower)) in group.iter().enumerate() {
                crossings += group[index + 1..]
                    .iter()
                    .filter(|(other_upper, other_lower)| {
                        (upper < other_upper && lower > other_lower)
                            || (upper > other_upper && lower < other_lower)
                    })
                    .count();
            }
        }

        crossings
    }
}

#[cfg(test)]
mod tests {
    use kinship_core::record::IndividualRecord;

    use super::*;
    use crate::{
        layout::height::assign_heights,
        structure::{BuildOptions, build},
    };

    fn child_of(id: &str, parents: &[&str]) -> IndividualRecord {
        let mut record = IndividualRecord::new(id);
        record.parents = parents.iter().map(|parent| (*parent).into()).collect();
        record
    }

    fn prepare(records: &[IndividualRecord]) -> (Pedigree, Heights) {
        let (pedigree, _) = build(records, &BuildOptions::default()).unwrap();
        let heights = assign_heights(&pedigree);
        (pedigree, heights)
    }

    fn nuclear_family() -> Vec<IndividualRecord> {
        let mut proband = child_of("a", &["f", "m"]);
        proband.is_proband = true;
        vec![
            proband,
            child_of("b", &["f", "m"]),
            child_of("c", &["f", "m"]),
            IndividualRecord::new("f"),
            IndividualRecord::new("m"),
        ]
    }

    fn ids(names: &[&str]) -> Vec<Id> {
        names.iter().map(|name| Id::new(name)).collect()
    }

    #[test]
    fn test_next_permutation_is_lexicographic() {
        let mut items = vec![0, 1, 2];
        let mut seen = vec![items.clone()];
        while next_permutation(&mut items) {
            seen.push(items.clone());
        }
        assert_eq!(
            seen,
            vec![
                vec![0, 1, 2],
                vec![0, 2, 1],
                vec![1, 0, 2],
                vec![1, 2, 0],
                vec![2, 0, 1],
                vec![2, 1, 0],
            ]
        );
    }

    #[test]
    fn test_buckets_group_partners_and_siblings() {
        let (pedigree, _) = prepare(&nuclear_family());
        assert_eq!(
            buckets(&pedigree),
            vec![ids(&["f", "m"]), ids(&["a", "b", "c"])]
        );
    }

    #[test]
    fn test_depth_first_keeps_relationship_between_partners() {
        let (pedigree, heights) = prepare(&nuclear_family());
        let search = choose_order(&pedigree, &heights);

        assert_eq!(search.crossings, 0);
        assert_eq!(search.evaluated, 1);
        assert_eq!(search.order.level(0), ids(&["a", "b", "c"]).as_slice());
        assert_eq!(
            search.order.level(1),
            ids(&["f", "relationship:f,m", "m"]).as_slice()
        );
    }

    #[test]
    fn test_candidates_cover_every_node() {
        let (pedigree, heights) = prepare(&nuclear_family());
        for candidate in candidate_orders(&pedigree, &heights) {
            let covered: usize = candidate.levels().iter().map(Vec::len).sum();
            assert_eq!(covered, pedigree.node_count());
        }
    }

    #[test]
    fn test_interposed_attached_node_counts() {
        let mut proband = child_of("a", &["f", "m"]);
        proband.is_proband = true;
        let records = vec![
            proband,
            IndividualRecord::new("f"),
            child_of("m", &["g"]),
            IndividualRecord::new("g"),
        ];
        let (pedigree, heights) = prepare(&records);

        // `m` links up to its own parents, so it counts when interposed.
        let apart = Order::from_levels(vec![
            ids(&["a"]),
            ids(&["f", "m", "relationship:f,m"]),
            ids(&["g", "relationship:g"]),
        ]);
        let adjacent = Order::from_levels(vec![
            ids(&["a"]),
            ids(&["f", "relationship:f,m", "m"]),
            ids(&["g", "relationship:g"]),
        ]);

        assert_eq!(count_crossings(&pedigree, &heights, &apart), 1);
        assert_eq!(count_crossings(&pedigree, &heights, &adjacent), 0);
    }

    #[test]
    fn test_inverted_links_cross() {
        // Two couples with one child each; placing the children in swapped
        // order inverts both child links.
        let mut proband = child_of("x", &["p1", "p2"]);
        proband.is_proband = true;
        let records = vec![
            proband,
            IndividualRecord::new("p1"),
            IndividualRecord::new("p2"),
            child_of("y", &["p2", "q2"]),
            IndividualRecord::new("q2"),
        ];
        let (pedigree, heights) = prepare(&records);

        let straight = Order::from_levels(vec![
            ids(&["x", "y"]),
            ids(&["p1", "relationship:p1,p2", "p2", "relationship:p2,q2", "q2"]),
        ]);
        let swapped = Order::from_levels(vec![
            ids(&["y", "x"]),
            ids(&["p1", "relationship:p1,p2", "p2", "relationship:p2,q2", "q2"]),
        ]);

        assert_eq!(count_crossings(&pedigree, &heights, &straight), 0);
        assert_eq!(count_crossings(&pedigree, &heights, &swapped), 1);
    }

    #[test]
    fn test_chosen_order_is_minimal_among_candidates() {
        let mut proband = child_of("x", &["p1", "p2"]);
        proband.is_proband = true;
        let records = vec![
            proband,
            IndividualRecord::new("p1"),
            IndividualRecord::new("p2"),
            child_of("y", &["p2", "q2"]),
            IndividualRecord::new("q2"),
            child_of("z", &["p1", "q1"]),
            IndividualRecord::new("q1"),
        ];
        let (pedigree, heights) = prepare(&records);
        let search = choose_order(&pedigree, &heights);

        for candidate in candidate_orders(&pedigree, &heights) {
            assert!(search.crossings <= count_crossings(&pedigree, &heights, &candidate));
        }
    }

    #[test]
    fn test_candidate_cap() {
        let mut records = vec![{
            let mut proband = IndividualRecord::new("0");
            proband.is_proband = true;
            proband
        }];
        // Eight unrelated roots give 8! permutations.
        for index in 1..8 {
            records.push(IndividualRecord::new(index.to_string()));
        }
        let (pedigree, heights) = prepare(&records);
        assert_eq!(candidate_orders(&pedigree, &heights).len(), MAX_CANDIDATES);
    }
}
