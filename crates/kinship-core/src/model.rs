//! Node model of a normalized pedigree.
//!
//! The pedigree is stored as an arena: [`Individual`] and [`Relationship`]
//! nodes refer to each other only through [`Id`]s, which are resolved through
//! the owning lookup table. This keeps the cyclic parent/child/partner graph
//! free of reference cycles.

use serde::Serialize;

use crate::{identifier::Id, record::IndividualRecord};

/// Insertion-ordered id set used for node links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdSet(Vec<Id>);

impl IdSet {
    /// Inserts `id` unless already present. Returns `true` if inserted.
    pub fn insert(&mut self, id: Id) -> bool {
        if self.0.contains(&id) {
            false
        } else {
            self.0.push(id);
            true
        }
    }

    pub fn remove(&mut self, id: Id) {
        self.0.retain(|existing| *existing != id);
    }

    pub fn contains(&self, id: Id) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<Id> {
        self.0.first().copied()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Id> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Id] {
        &self.0
    }
}

impl FromIterator<Id> for IdSet {
    fn from_iter<T: IntoIterator<Item = Id>>(iter: T) -> Self {
        let mut ids = IdSet::default();
        for id in iter {
            ids.insert(id);
        }
        ids
    }
}

/// Canonical gender of an individual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Undetermined,
}

impl Gender {
    /// Canonicalizes a gender token.
    ///
    /// Returns `None` for non-empty tokens that are not a known synonym; the
    /// caller decides whether that deserves a warning.
    ///
    /// # Examples
    ///
    /// ```
    /// use kinship_core::model::Gender;
    ///
    /// assert_eq!(Gender::from_token("M"), Some(Gender::Male));
    /// assert_eq!(Gender::from_token("woman"), Some(Gender::Female));
    /// assert_eq!(Gender::from_token("unknown"), Some(Gender::Undetermined));
    /// assert_eq!(Gender::from_token("q"), None);
    /// ```
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "m" | "male" | "man" | "boy" | "masculine" => Some(Gender::Male),
            "f" | "female" | "woman" | "girl" | "feminine" => Some(Gender::Female),
            "" | "u" | "unknown" | "undetermined" | "other" | "x" => {
                Some(Gender::Undetermined)
            }
            _ => None,
        }
    }
}

/// Disease states of one individual.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiseaseStates {
    /// Diseases the individual is affected by.
    pub affected: Vec<String>,
    pub carrier: Vec<String>,
    pub presymptomatic: Vec<String>,
}

impl DiseaseStates {
    /// Returns the diseases that appear in more than one state list, in the
    /// order they first appear.
    pub fn conflicts(&self) -> Vec<&str> {
        let mut conflicts: Vec<&str> = Vec::new();
        let lists = [&self.affected, &self.carrier, &self.presymptomatic];
        for (idx, list) in lists.into_iter().enumerate() {
            for disease in list.iter() {
                let elsewhere = lists
                    .iter()
                    .enumerate()
                    .any(|(other_idx, other)| other_idx != idx && other.contains(disease));
                if elsewhere && !conflicts.contains(&disease.as_str()) {
                    conflicts.push(disease.as_str());
                }
            }
        }
        conflicts
    }

    /// Iterates over every disease name in all three lists.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.affected
            .iter()
            .chain(self.carrier.iter())
            .chain(self.presymptomatic.iter())
            .map(String::as_str)
    }
}

/// Pregnancy outcome flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pregnancy {
    pub is_pregnancy: bool,
    pub is_still_birth: bool,
    pub is_spontaneous_abortion: bool,
    pub is_therapeutic_abortion: bool,
}

/// A normalized individual.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Individual {
    id: Id,
    name: Option<String>,
    gender: Gender,
    age: Option<String>,
    diseases: DiseaseStates,
    is_deceased: bool,
    is_proband: bool,
    is_consultand: bool,
    pregnancy: Pregnancy,
    parents: IdSet,
    children: IdSet,
    partner_in: IdSet,
    child_of: Option<Id>,
    component: usize,
    data: Option<serde_json::Value>,
}

impl Individual {
    /// Creates an individual from a raw record.
    ///
    /// Links are left empty; the graph builder fills them once every
    /// identifier has been resolved.
    pub fn from_record(id: Id, record: &IndividualRecord, gender: Gender) -> Self {
        Self {
            id,
            name: record.name.clone(),
            gender,
            age: record.age.as_ref().map(|age| age.to_string()),
            diseases: DiseaseStates {
                affected: record.diseases.clone(),
                carrier: record.carrier_of_diseases.clone(),
                presymptomatic: record.presymptomatic_diseases.clone(),
            },
            is_deceased: record.is_deceased,
            is_proband: record.is_proband,
            is_consultand: record.is_consultand,
            pregnancy: Pregnancy {
                is_pregnancy: record.is_pregnancy,
                is_still_birth: record.is_still_birth,
                is_spontaneous_abortion: record.is_spontaneous_abortion,
                is_therapeutic_abortion: record.is_therapeutic_abortion,
            },
            parents: IdSet::default(),
            children: IdSet::default(),
            partner_in: IdSet::default(),
            child_of: None,
            component: 0,
            data: record.data.clone(),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Display name, if one was supplied.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn age(&self) -> Option<&str> {
        self.age.as_deref()
    }

    pub fn diseases(&self) -> &DiseaseStates {
        &self.diseases
    }

    pub fn is_deceased(&self) -> bool {
        self.is_deceased
    }

    pub fn is_proband(&self) -> bool {
        self.is_proband
    }

    pub fn is_consultand(&self) -> bool {
        self.is_consultand
    }

    pub fn pregnancy(&self) -> Pregnancy {
        self.pregnancy
    }

    /// Resolved parent ids.
    pub fn parents(&self) -> &IdSet {
        &self.parents
    }

    /// Resolved child ids.
    pub fn children(&self) -> &IdSet {
        &self.children
    }

    /// Relationships this individual is a partner in.
    pub fn partner_in(&self) -> &IdSet {
        &self.partner_in
    }

    /// The relationship this individual is a child of.
    pub fn child_of(&self) -> Option<Id> {
        self.child_of
    }

    /// Index of the connected component this individual was reached in.
    ///
    /// Component `0` is the proband's.
    pub fn component(&self) -> usize {
        self.component
    }

    pub fn data(&self) -> Option<&serde_json::Value> {
        self.data.as_ref()
    }

    /// Marks this individual as the proband (or clears the flag).
    pub fn set_proband(&mut self, is_proband: bool) {
        self.is_proband = is_proband;
    }

    pub fn insert_parent(&mut self, parent: Id) -> bool {
        self.parents.insert(parent)
    }

    pub fn insert_child(&mut self, child: Id) -> bool {
        self.children.insert(child)
    }

    pub fn insert_partnership(&mut self, relationship: Id) -> bool {
        self.partner_in.insert(relationship)
    }

    pub fn set_child_of(&mut self, relationship: Id) {
        self.child_of = Some(relationship);
    }

    pub fn set_component(&mut self, component: usize) {
        self.component = component;
    }
}

/// A synthesized partnership node.
///
/// Partners are sorted by identifier; children keep input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    id: Id,
    partners: IdSet,
    children: IdSet,
}

impl Relationship {
    /// Creates a relationship for `partners`, deriving its identifier from them.
    pub fn new(partners: &[Id]) -> Self {
        let mut sorted: Vec<Id> = partners.to_vec();
        sorted.sort();
        Self {
            id: Id::for_relationship(&sorted),
            partners: sorted.into_iter().collect(),
            children: IdSet::default(),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn partners(&self) -> &IdSet {
        &self.partners
    }

    pub fn children(&self) -> &IdSet {
        &self.children
    }

    pub fn insert_child(&mut self, child: Id) -> bool {
        self.children.insert(child)
    }
}
