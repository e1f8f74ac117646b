//! The pedigree arena.
//!
//! Individuals and relationships live in two insertion-ordered maps keyed by
//! [`Id`]. Iteration order is stable, so every stage that walks the arena is
//! deterministic. The proband is always the first individual.

use indexmap::IndexMap;
use serde::Serialize;

use kinship_core::{
    identifier::Id,
    model::{Individual, Relationship},
};

/// A normalized pedigree with resolved links and synthesized relationships.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Pedigree {
    individuals: IndexMap<Id, Individual>,
    relationships: IndexMap<Id, Relationship>,
    #[serde(skip)]
    component_count: usize,
}

impl Pedigree {
    pub(crate) fn new(
        individuals: IndexMap<Id, Individual>,
        relationships: IndexMap<Id, Relationship>,
        component_count: usize,
    ) -> Self {
        Self {
            individuals,
            relationships,
            component_count,
        }
    }

    /// Returns the proband, the first individual of the arena.
    pub fn proband(&self) -> Option<&Individual> {
        self.individuals.first().map(|(_, individual)| individual)
    }

    pub fn individual(&self, id: Id) -> Option<&Individual> {
        self.individuals.get(&id)
    }

    pub fn relationship(&self, id: Id) -> Option<&Relationship> {
        self.relationships.get(&id)
    }

    /// Iterates over individuals in arena order.
    pub fn individuals(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.values()
    }

    /// Iterates over relationships in creation order.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    pub fn individual_count(&self) -> usize {
        self.individuals.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Number of connected components that were laid out.
    pub fn component_count(&self) -> usize {
        self.component_count
    }

    /// Returns `true` if `id` names an individual or a relationship.
    pub fn contains(&self, id: Id) -> bool {
        self.individuals.contains_key(&id) || self.relationships.contains_key(&id)
    }

    /// Every node id in canonical order: individuals first, then relationships.
    pub fn node_ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.individuals
            .keys()
            .chain(self.relationships.keys())
            .copied()
    }

    pub fn node_count(&self) -> usize {
        self.individuals.len() + self.relationships.len()
    }

    /// Graph neighbours of a node in a fixed order.
    ///
    /// For an individual: its parental relationship, then the relationships
    /// it partners in. For a relationship: its partners, then its children.
    pub(crate) fn neighbours(&self, id: Id) -> Vec<Id> {
        if let Some(individual) = self.individuals.get(&id) {
            individual
                .child_of()
                .into_iter()
                .chain(individual.partner_in().iter())
                .collect()
        } else if let Some(relationship) = self.relationships.get(&id) {
            relationship
                .partners()
                .iter()
                .chain(relationship.children().iter())
                .collect()
        } else {
            Vec::new()
        }
    }
}
