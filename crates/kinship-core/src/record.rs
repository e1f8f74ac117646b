//! Raw input records.
//!
//! [`IndividualRecord`] mirrors the JSON shape accepted by the layout engine.
//! Records are never mutated by the engine; the graph builder works on its own
//! normalized copy.
//!
//! # Example
//!
//! ```
//! use kinship_core::record::IndividualRecord;
//!
//! let json = r#"[
//!     {"id": 1, "isProband": true, "father": 2, "mother": 3},
//!     {"id": 2, "gender": "m"},
//!     {"id": 3, "gender": "f"}
//! ]"#;
//!
//! let records: Vec<IndividualRecord> = serde_json::from_str(json).unwrap();
//! assert_eq!(records[0].id.as_str(), "1");
//! assert_eq!(records[0].father.as_ref().map(|id| id.as_str()), Some("2"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar that may arrive as a JSON string or number and is kept as text.
///
/// Integral floating point values are rendered without a fractional part so
/// `7` and `7.0` name the same individual.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawScalar", into = "String")]
pub struct TextValue(String);

impl TextValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TextValue> for String {
    fn from(value: TextValue) -> Self {
        value.0
    }
}

impl From<&str> for TextValue {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<RawScalar> for TextValue {
    fn from(raw: RawScalar) -> Self {
        match raw {
            RawScalar::Text(text) => Self(text),
            RawScalar::Integer(value) => Self(value.to_string()),
            RawScalar::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                Self(format!("{}", value as i64))
            }
            RawScalar::Float(value) => Self(value.to_string()),
        }
    }
}

/// One individual as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualRecord {
    /// Identifier, coerced to text.
    pub id: TextValue,

    #[serde(default)]
    pub name: Option<String>,

    /// Gender token; synonyms are canonicalized by the graph builder.
    #[serde(default)]
    pub gender: Option<String>,

    #[serde(default)]
    pub age: Option<TextValue>,

    /// Diseases the individual is affected by.
    #[serde(default)]
    pub diseases: Vec<String>,

    #[serde(default)]
    pub carrier_of_diseases: Vec<String>,

    #[serde(default)]
    pub presymptomatic_diseases: Vec<String>,

    #[serde(default)]
    pub is_proband: bool,

    #[serde(default)]
    pub is_deceased: bool,

    #[serde(default)]
    pub is_consultand: bool,

    #[serde(default)]
    pub is_pregnancy: bool,

    #[serde(default)]
    pub is_still_birth: bool,

    #[serde(default)]
    pub is_spontaneous_abortion: bool,

    #[serde(default)]
    pub is_therapeutic_abortion: bool,

    #[serde(default)]
    pub mother: Option<TextValue>,

    #[serde(default)]
    pub father: Option<TextValue>,

    #[serde(default)]
    pub parents: Vec<TextValue>,

    #[serde(default)]
    pub children: Vec<TextValue>,

    /// Free-form auxiliary data carried through to the output untouched.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl IndividualRecord {
    /// Creates a record with only an identifier set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: TextValue::new(id),
            ..Self::default()
        }
    }

    /// Returns every parent reference: `mother`, `father` and `parents`, in that order.
    ///
    /// Duplicates are not removed here.
    pub fn parent_refs(&self) -> impl Iterator<Item = &TextValue> {
        self.mother
            .iter()
            .chain(self.father.iter())
            .chain(self.parents.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ids_are_coerced() {
        let json = r#"{"id": 12, "parents": [3, "4", 5.0], "age": 42}"#;
        let record: IndividualRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.id.as_str(), "12");
        let parents: Vec<&str> = record.parents.iter().map(TextValue::as_str).collect();
        assert_eq!(parents, vec!["3", "4", "5"]);
        assert_eq!(record.age.as_ref().map(TextValue::as_str), Some("42"));
    }

    #[test]
    fn test_camel_case_fields() {
        let json = r#"{
            "id": "a",
            "isProband": true,
            "isDeceased": true,
            "carrierOfDiseases": ["cf"],
            "presymptomaticDiseases": ["hd"],
            "isSpontaneousAbortion": true
        }"#;
        let record: IndividualRecord = serde_json::from_str(json).unwrap();

        assert!(record.is_proband);
        assert!(record.is_deceased);
        assert!(record.is_spontaneous_abortion);
        assert_eq!(record.carrier_of_diseases, vec!["cf".to_string()]);
        assert_eq!(record.presymptomatic_diseases, vec!["hd".to_string()]);
    }

    #[test]
    fn test_parent_refs_order() {
        let mut record = IndividualRecord::new("c");
        record.mother = Some("m".into());
        record.father = Some("f".into());
        record.parents = vec!["m".into()];

        let refs: Vec<&str> = record.parent_refs().map(TextValue::as_str).collect();
        assert_eq!(refs, vec!["m", "f", "m"]);
    }

    #[test]
    fn test_fractional_float_id() {
        let record: IndividualRecord = serde_json::from_str(r#"{"id": 1.5}"#).unwrap();
        assert_eq!(record.id.as_str(), "1.5");
    }

    #[test]
    fn test_auxiliary_data_kept() {
        let record: IndividualRecord =
            serde_json::from_str(r#"{"id": "x", "data": {"note": "twin"}}"#).unwrap();
        assert_eq!(record.data, Some(serde_json::json!({"note": "twin"})));
    }
}
