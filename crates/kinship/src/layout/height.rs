//! Generational height assignment.
//!
//! Height `0` is the bottom-most generation. Heights are first seeded by a
//! breadth-first walk from each component's first individual and then
//! rebalanced until every relationship sits at the minimum height of its
//! partners and every child sits strictly below its parental relationship.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use log::{debug, info, trace};

use kinship_core::identifier::Id;

use crate::structure::Pedigree;

/// Generation index of every individual and relationship.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heights {
    heights: IndexMap<Id, usize>,
    max: usize,
}

impl Heights {
    /// Height of `id`, if it is a node of the pedigree.
    pub fn get(&self, id: Id) -> Option<usize> {
        self.heights.get(&id).copied()
    }

    /// The highest generation index.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Iterates over `(id, height)` in canonical node order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, usize)> + '_ {
        self.heights.iter().map(|(id, height)| (*id, *height))
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}

/// Assigns a generational height to every node of `pedigree`.
pub fn assign_heights(pedigree: &Pedigree) -> Heights {
    info!(nodes = pedigree.node_count(); "Assigning heights");

    let mut raw = seed_heights(pedigree);
    let passes = rebalance(pedigree, &mut raw);

    let min = raw.values().copied().min().unwrap_or(0);
    let heights: IndexMap<Id, usize> = pedigree
        .node_ids()
        .map(|id| {
            let height = raw.get(&id).copied().unwrap_or(min);
            (id, usize::try_from(height - min).unwrap_or(0))
        })
        .collect();
    let max = heights.values().copied().max().unwrap_or(0);

    debug!(levels = max + 1, passes; "Heights assigned");

    Heights { heights, max }
}

/// Breadth-first seeding, one walk per connected component.
///
/// The first assignment of a node wins.
fn seed_heights(pedigree: &Pedigree) -> IndexMap<Id, i64> {
    let mut heights: IndexMap<Id, i64> = IndexMap::with_capacity(pedigree.node_count());
    let mut seeded_components: HashSet<usize> = HashSet::new();

    for seed in pedigree.individuals() {
        if heights.contains_key(&seed.id()) || !seeded_components.insert(seed.component()) {
            continue;
        }
        trace!(seed:% = seed.id(), component = seed.component(); "Seeding component");

        heights.insert(seed.id(), 0);
        let mut queue: VecDeque<Id> = VecDeque::from([seed.id()]);

        while let Some(id) = queue.pop_front() {
            let Some(individual) = pedigree.individual(id) else {
                continue;
            };
            let height = heights.get(&id).copied().unwrap_or(0);
            let mut assign = |node: Id, value: i64, queue: &mut VecDeque<Id>| {
                if heights.contains_key(&node) {
                    return;
                }
                heights.insert(node, value);
                if !node.is_relationship() {
                    queue.push_back(node);
                }
            };

            for parent in individual.parents().iter() {
                assign(parent, height + 1, &mut queue);
            }

            if let Some(parental) = individual
                .child_of()
                .and_then(|id| pedigree.relationship(id))
            {
                assign(parental.id(), height, &mut queue);
                for sibling in parental.children().iter() {
                    assign(sibling, height, &mut queue);
                }
            }

            for relationship in individual
                .partner_in()
                .iter()
                .filter_map(|id| pedigree.relationship(id))
            {
                assign(relationship.id(), height, &mut queue);
                for partner in relationship.partners().iter() {
                    assign(partner, height, &mut queue);
                }
                for child in relationship.children().iter() {
                    assign(child, height - 1, &mut queue);
                }
            }
        }
    }

    // Unreached relationships follow their partners.
    for relationship in pedigree.relationships() {
        if !heights.contains_key(&relationship.id()) {
            let height = relationship
                .partners()
                .iter()
                .filter_map(|partner| heights.get(&partner).copied())
                .min()
                .unwrap_or(0);
            heights.insert(relationship.id(), height);
        }
    }

    heights
}

/// Repeats relationship/children rebalancing until nothing changes.
///
/// Returns the number of passes run. The pass count is bounded by the node
/// count so cyclic ancestry cannot loop forever.
fn rebalance(pedigree: &Pedigree, heights: &mut IndexMap<Id, i64>) -> usize {
    let bound = pedigree.node_count().max(1);

    for pass in 1..=bound {
        let mut changed = false;

        for relationship in pedigree.relationships() {
            let Some(partner_min) = relationship
                .partners()
                .iter()
                .filter_map(|partner| heights.get(&partner).copied())
                .min()
            else {
                continue;
            };
            if heights.insert(relationship.id(), partner_min) != Some(partner_min) {
                changed = true;
            }
        }

        for relationship in pedigree.relationships() {
            let Some(level) = heights.get(&relationship.id()).copied() else {
                continue;
            };
            for child in relationship.children().iter() {
                if heights.get(&child).is_some_and(|height| *height >= level) {
                    let mut visited = HashSet::new();
                    pull_down(pedigree, heights, child, level - 1, &mut visited);
                    changed = true;
                }
            }
        }

        if !changed {
            return pass;
        }
    }

    bound
}

/// Moves `id` down to `target` and pushes its descendants below it.
fn pull_down(
    pedigree: &Pedigree,
    heights: &mut IndexMap<Id, i64>,
    id: Id,
    target: i64,
    visited: &mut HashSet<Id>,
) {
    if !visited.insert(id) {
        return;
    }
    let Some(individual) = pedigree.individual(id) else {
        return;
    };
    if heights.get(&id).is_some_and(|height| *height <= target) {
        return;
    }
    heights.insert(id, target);

    for relationship in individual
        .partner_in()
        .iter()
        .filter_map(|id| pedigree.relationship(id))
    {
        let level = heights
            .get(&relationship.id())
            .copied()
            .map_or(target, |height| height.min(target));
        heights.insert(relationship.id(), level);

        for child in relationship.children().iter() {
            if heights.get(&child).is_some_and(|height| *height >= level) {
                pull_down(pedigree, heights, child, level - 1, visited);
            }
        }
    }
}
