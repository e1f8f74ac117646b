//! Graph builder.
//!
//! Turns raw [`IndividualRecord`]s into a [`Pedigree`]: identifiers are
//! validated, parent/child links are made bidirectional, genders are
//! canonicalized, the proband is located, connected components are numbered
//! and relationship nodes are synthesized from shared parent sets.
//!
//! Validation errors do not stop the pass; every problem is collected and
//! reported together.

use indexmap::{IndexMap, map::Entry};
use log::{debug, info, trace};
use petgraph::{
    graph::{NodeIndex, UnGraph},
    visit::Bfs,
};

use kinship_core::{
    identifier::{Id, PARTNER_SEPARATOR, RELATIONSHIP_PREFIX},
    model::{Gender, Individual, Relationship},
    record::IndividualRecord,
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ValidationError},
    structure::Pedigree,
};

/// Options for [`build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Keep individuals that are not connected to the proband.
    pub keep_disconnected: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            keep_disconnected: true,
        }
    }
}

/// Builds a normalized pedigree from raw records.
///
/// The records are not modified. On success the pedigree is returned together
/// with the structural warnings raised while building it.
///
/// # Errors
///
/// Returns a [`ValidationError`] carrying every validation diagnostic (and
/// the warnings raised before validation failed) when any record is invalid.
pub fn build(
    records: &[IndividualRecord],
    options: &BuildOptions,
) -> Result<(Pedigree, Vec<Diagnostic>), ValidationError> {
    info!(records = records.len(); "Building pedigree");

    let mut collector = DiagnosticCollector::new();

    let mut individuals = create_individuals(records, &mut collector);
    link_individuals(records, &mut individuals, &mut collector);

    if collector.has_errors() {
        return Err(collector.into_error());
    }

    if individuals.is_empty() {
        collector.emit(
            Diagnostic::error("no individuals to lay out")
                .with_code(ErrorCode::E100)
                .with_help("supply at least one record with a non-empty `id`"),
        );
        return Err(collector.into_error());
    }

    select_proband(&mut individuals, &mut collector);
    let component_count = number_components(&mut individuals, options, &mut collector);
    let relationships = synthesize_relationships(&mut individuals, &mut collector);

    let warnings = collector.finish()?;
    let pedigree = Pedigree::new(individuals, relationships, component_count);

    debug!(
        individuals = pedigree.individual_count(),
        relationships = pedigree.relationship_count(),
        components = pedigree.component_count(),
        warnings = warnings.len();
        "Pedigree built"
    );

    Ok((pedigree, warnings))
}

/// Validates identifiers, genders and disease states and creates unlinked individuals.
fn create_individuals(
    records: &[IndividualRecord],
    collector: &mut DiagnosticCollector,
) -> IndexMap<Id, Individual> {
    let mut individuals: IndexMap<Id, Individual> = IndexMap::with_capacity(records.len());

    for (position, record) in records.iter().enumerate() {
        let raw_id = record.id.as_str();

        if raw_id.trim().is_empty() {
            collector.emit(
                Diagnostic::error(format!("record #{position} has an empty identifier"))
                    .with_code(ErrorCode::E100)
                    .with_help("every record needs a non-empty `id`"),
            );
            continue;
        }

        if raw_id.starts_with(RELATIONSHIP_PREFIX) {
            collector.emit(
                Diagnostic::error(format!("identifier `{raw_id}` uses a reserved prefix"))
                    .with_code(ErrorCode::E102)
                    .with_subject(raw_id)
                    .with_help(format!(
                        "identifiers starting with `{RELATIONSHIP_PREFIX}` are reserved"
                    )),
            );
            continue;
        }

        if raw_id.contains(PARTNER_SEPARATOR) {
            collector.emit(
                Diagnostic::error(format!(
                    "identifier `{raw_id}` contains the partner separator `{PARTNER_SEPARATOR}`"
                ))
                .with_code(ErrorCode::E106)
                .with_subject(raw_id)
                .with_help(format!(
                    "`{PARTNER_SEPARATOR}` joins partners in relationship identifiers"
                )),
            );
            continue;
        }

        let id = Id::new(raw_id);
        if individuals.contains_key(&id) {
            collector.emit(
                Diagnostic::error(format!("duplicate identifier `{raw_id}`"))
                    .with_code(ErrorCode::E101)
                    .with_subject(raw_id)
                    .with_help("each individual must appear exactly once"),
            );
            continue;
        }

        let gender = match record.gender.as_deref() {
            None => Gender::Undetermined,
            Some(token) => Gender::from_token(token).unwrap_or_else(|| {
                collector.emit(
                    Diagnostic::warning(format!(
                        "unrecognized gender `{token}` of `{raw_id}`, treated as undetermined"
                    ))
                    .with_code(ErrorCode::W204)
                    .with_subject(raw_id),
                );
                Gender::Undetermined
            }),
        };

        let individual = Individual::from_record(id, record, gender);
        for disease in individual.diseases().conflicts() {
            collector.emit(
                Diagnostic::error(format!(
                    "disease `{disease}` appears in more than one disease state of `{raw_id}`"
                ))
                .with_code(ErrorCode::E110)
                .with_subject(raw_id)
                .with_help(
                    "keep each disease in exactly one of diseases, carrierOfDiseases, presymptomaticDiseases",
                ),
            );
        }

        individuals.insert(id, individual);
    }

    individuals
}

/// Resolves parent and child references into bidirectional links.
///
/// Records rejected by [`create_individuals`] are skipped; a duplicate record
/// never contributes links.
fn link_individuals(
    records: &[IndividualRecord],
    individuals: &mut IndexMap<Id, Individual>,
    collector: &mut DiagnosticCollector,
) {
    let mut seen: Vec<Id> = Vec::with_capacity(individuals.len());

    for record in records {
        let raw_id = record.id.as_str();
        if raw_id.trim().is_empty()
            || raw_id.starts_with(RELATIONSHIP_PREFIX)
            || raw_id.contains(PARTNER_SEPARATOR)
        {
            continue;
        }
        let id = Id::new(raw_id);
        if seen.contains(&id) || !individuals.contains_key(&id) {
            continue;
        }
        seen.push(id);

        for parent in record.parent_refs() {
            let parent_id = Id::new(parent.as_str());
            if parent_id == id {
                emit_self_reference(collector, raw_id);
            } else if !individuals.contains_key(&parent_id) {
                collector.emit(
                    Diagnostic::error(format!(
                        "unknown parent `{parent}` referenced by `{raw_id}`"
                    ))
                    .with_code(ErrorCode::E103)
                    .with_subject(raw_id)
                    .with_help(format!("add a record for `{parent}` or remove the reference")),
                );
            } else {
                connect(individuals, parent_id, id);
            }
        }

        for child in &record.children {
            let child_id = Id::new(child.as_str());
            if child_id == id {
                emit_self_reference(collector, raw_id);
            } else if !individuals.contains_key(&child_id) {
                collector.emit(
                    Diagnostic::error(format!("unknown child `{child}` referenced by `{raw_id}`"))
                        .with_code(ErrorCode::E104)
                        .with_subject(raw_id)
                        .with_help(format!("add a record for `{child}` or remove the reference")),
                );
            } else {
                connect(individuals, id, child_id);
            }
        }
    }
}

fn emit_self_reference(collector: &mut DiagnosticCollector, raw_id: &str) {
    collector.emit(
        Diagnostic::error(format!("`{raw_id}` references itself as parent or child"))
            .with_code(ErrorCode::E105)
            .with_subject(raw_id),
    );
}

/// Inserts the parent link and its reciprocal child link.
fn connect(individuals: &mut IndexMap<Id, Individual>, parent: Id, child: Id) {
    if let Some(individual) = individuals.get_mut(&child) {
        individual.insert_parent(parent);
    }
    if let Some(individual) = individuals.get_mut(&parent) {
        individual.insert_child(child);
    }
}

/// Makes sure exactly one individual is flagged as proband and moves it first.
fn select_proband(individuals: &mut IndexMap<Id, Individual>, collector: &mut DiagnosticCollector) {
    let flagged: Vec<usize> = individuals
        .values()
        .enumerate()
        .filter(|(_, individual)| individual.is_proband())
        .map(|(index, _)| index)
        .collect();

    let proband_index = match flagged.as_slice() {
        [] => {
            if let Some((id, individual)) = individuals.get_index_mut(0) {
                individual.set_proband(true);
                collector.emit(
                    Diagnostic::warning(format!("no proband flagged, assuming `{id}`"))
                        .with_code(ErrorCode::W200)
                        .with_subject(id.as_string())
                        .with_help("set `isProband` on exactly one record"),
                );
            }
            0
        }
        [single] => *single,
        [first, rest @ ..] => {
            let mut extra = Vec::with_capacity(rest.len());
            for &index in rest {
                if let Some((id, individual)) = individuals.get_index_mut(index) {
                    individual.set_proband(false);
                    extra.push(id.as_string());
                }
            }
            let first_id = individuals
                .get_index(*first)
                .map(|(id, _)| id.as_string())
                .unwrap_or_default();
            collector.emit(
                Diagnostic::warning(format!(
                    "{} probands flagged, using `{first_id}`",
                    flagged.len()
                ))
                .with_code(ErrorCode::W201)
                .with_subject(first_id)
                .with_subjects(extra)
                .with_help("set `isProband` on exactly one record"),
            );
            *first
        }
    };

    individuals.move_index(proband_index, 0);
    if let Some(proband) = individuals.keys().next() {
        trace!(proband:%; "Proband selected");
    }
}

/// Numbers connected components, starting with the proband's.
///
/// Returns the number of components kept.
fn number_components(
    individuals: &mut IndexMap<Id, Individual>,
    options: &BuildOptions,
    collector: &mut DiagnosticCollector,
) -> usize {
    let mut graph: UnGraph<Id, ()> = UnGraph::with_capacity(individuals.len(), individuals.len());
    let nodes: IndexMap<Id, NodeIndex> = individuals
        .keys()
        .map(|id| (*id, graph.add_node(*id)))
        .collect();

    for (id, individual) in individuals.iter() {
        for child in individual.children().iter() {
            if let (Some(&from), Some(&to)) = (nodes.get(id), nodes.get(&child)) {
                graph.add_edge(from, to, ());
            }
        }
    }

    let mut component_of: Vec<Option<usize>> = vec![None; individuals.len()];
    let mut component_count = 0;

    while let Some(start) = component_of.iter().position(Option::is_none) {
        let mut bfs = Bfs::new(&graph, NodeIndex::new(start));
        while let Some(node) = bfs.next(&graph) {
            component_of[node.index()] = Some(component_count);
        }
        component_count += 1;

        if component_count == 1 && !options.keep_disconnected {
            break;
        }
    }

    let disconnected: Vec<Id> = individuals
        .keys()
        .zip(component_of.iter())
        .filter(|(_, component)| **component != Some(0))
        .map(|(id, _)| *id)
        .collect();

    if !disconnected.is_empty() {
        let action = if options.keep_disconnected {
            "laid out separately"
        } else {
            "dropped"
        };
        collector.emit(
            Diagnostic::warning(format!(
                "{} individuals are not connected to the proband and are {action}",
                disconnected.len()
            ))
            .with_code(ErrorCode::W203)
            .with_subjects(disconnected.iter().map(Id::as_string))
            .with_help("link them to the family through `parents` or `children`"),
        );
    }

    if options.keep_disconnected {
        for (individual, component) in individuals.values_mut().zip(component_of) {
            individual.set_component(component.unwrap_or(0));
        }
        component_count
    } else {
        individuals.retain(|id, _| !disconnected.contains(id));
        1
    }
}

/// Groups children by their sorted parent set into relationships.
fn synthesize_relationships(
    individuals: &mut IndexMap<Id, Individual>,
    collector: &mut DiagnosticCollector,
) -> IndexMap<Id, Relationship> {
    let mut relationships: IndexMap<Id, Relationship> = IndexMap::new();
    let mut memberships: Vec<(Id, Id, Vec<Id>)> = Vec::new();

    for (id, individual) in individuals.iter() {
        let parents = individual.parents();
        if parents.is_empty() {
            continue;
        }

        if parents.len() < 2 {
            collector.emit(
                Diagnostic::warning(format!(
                    "`{id}` has {} recorded parent, drawn with a single-partner relationship",
                    parents.len()
                ))
                .with_code(ErrorCode::W202)
                .with_subject(id.as_string()),
            );
        }

        let relationship = match relationships.entry(Id::for_relationship(parents.as_slice())) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Relationship::new(parents.as_slice())),
        };
        relationship.insert_child(*id);
        memberships.push((*id, relationship.id(), parents.as_slice().to_vec()));
    }

    for (child, relationship, partners) in memberships {
        if let Some(individual) = individuals.get_mut(&child) {
            individual.set_child_of(relationship);
        }
        for partner in partners {
            if let Some(individual) = individuals.get_mut(&partner) {
                individual.insert_partnership(relationship);
            }
        }
    }

    relationships
}
