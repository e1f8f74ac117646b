//! Identifier management using string interning for efficient string storage and comparison
//!
//! This module provides the [`Id`] type with an efficient string-interner based approach.
//! Individuals and synthesized relationships share the same identifier space; relationship
//! identifiers carry the reserved [`RELATIONSHIP_PREFIX`].

use std::{
    cmp::Ordering,
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Prefix reserved for synthesized relationship identifiers.
pub const RELATIONSHIP_PREFIX: &str = "relationship:";

/// Separator between partner identifiers inside a relationship identifier.
pub const PARTNER_SEPARATOR: char = ',';

/// Global string interner for efficient identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock")
}

/// Efficient identifier type using string interning
///
/// Comparison for equality and hashing works on the interned symbol. Ordering
/// works on the resolved strings so sorting is independent of interning order.
///
/// # Examples
///
/// ```
/// use kinship_core::identifier::Id;
///
/// let mother = Id::new("3");
/// let father = Id::new("2");
///
/// let relationship = Id::for_relationship(&[mother, father]);
/// assert_eq!(relationship, "relationship:2,3");
/// assert!(relationship.is_relationship());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// # Arguments
    ///
    /// * `name` - The string representation of the identifier
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates the identifier of the relationship formed by `partners`.
    ///
    /// Partner identifiers are sorted lexicographically so the same partnership
    /// always maps to the same identifier regardless of the order given.
    pub fn for_relationship(partners: &[Id]) -> Self {
        let mut names: Vec<String> = partners.iter().map(Id::as_string).collect();
        names.sort();
        names.dedup();
        let separator = PARTNER_SEPARATOR.to_string();
        Self::new(&format!("{RELATIONSHIP_PREFIX}{}", names.join(&separator)))
    }

    /// Canonicalizes a relationship lookup key.
    ///
    /// Accepts `relationship:<ids>` with the partner identifiers in any order
    /// and returns the key with the partners sorted. Returns `None` when the key
    /// does not carry the relationship prefix.
    pub fn canonical_relationship_key(key: &str) -> Option<String> {
        let partners = key.strip_prefix(RELATIONSHIP_PREFIX)?;
        let mut names: Vec<&str> = partners
            .split(PARTNER_SEPARATOR)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();
        names.sort_unstable();
        names.dedup();
        let separator = PARTNER_SEPARATOR.to_string();
        Some(format!("{RELATIONSHIP_PREFIX}{}", names.join(&separator)))
    }

    /// Returns `true` if this identifier names a synthesized relationship.
    pub fn is_relationship(&self) -> bool {
        let interner = interner();
        interner
            .resolve(self.0)
            .is_some_and(|name| name.starts_with(RELATIONSHIP_PREFIX))
    }

    /// Returns the string representation of this identifier.
    pub fn as_string(&self) -> String {
        interner()
            .resolve(self.0)
            .expect("Symbol should exist in interner")
            .to_string()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        let str_value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        write!(f, "{str_value}")
    }
}

impl Ord for Id {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            return Ordering::Equal;
        }
        let interner = interner();
        let lhs = interner.resolve(self.0).expect("Symbol should exist in interner");
        let rhs = interner
            .resolve(other.0)
            .expect("Symbol should exist in interner");
        lhs.cmp(rhs)
    }
}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// This is a convenience implementation that calls `Id::new`.
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        let interner = interner();
        let self_str = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        self_str == other
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}
