//! Error codes for the Kinship diagnostic system.
//!
//! Codes are organized by kind:
//! - `E1xx` - Validation errors (fatal)
//! - `W2xx` - Structural warnings (non-fatal)

use std::fmt;

use serde::Serialize;

/// Codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    // =========================================================================
    // Validation Errors (E1xx)
    // =========================================================================
    /// Empty identifier.
    ///
    /// A record has an identifier that is empty or only whitespace.
    E100,

    /// Duplicate identifier.
    ///
    /// Two records share the same identifier.
    E101,

    /// Reserved identifier.
    ///
    /// A record identifier starts with the prefix reserved for relationships.
    E102,

    /// Unknown parent reference.
    ///
    /// A record names a parent (`mother`, `father` or `parents`) that no record defines.
    E103,

    /// Unknown child reference.
    ///
    /// A record names a child that no record defines.
    E104,

    /// Self reference.
    ///
    /// A record lists itself as its own parent or child.
    E105,

    /// Identifier contains the partner separator.
    ///
    /// A record identifier contains `,`, which separates partners inside
    /// relationship identifiers.
    E106,

    /// Conflicting disease states.
    ///
    /// The same disease appears in more than one of the affected, carrier and
    /// presymptomatic lists of one individual.
    E110,

    // =========================================================================
    // Structural Warnings (W2xx)
    // =========================================================================
    /// No proband flagged; the first record is assumed.
    W200,

    /// Several probands flagged; the first is used.
    W201,

    /// A child has fewer than two recorded parents.
    W202,

    /// Individuals are not connected to the proband.
    W203,

    /// Gender token not recognized; treated as undetermined.
    W204,
}

impl ErrorCode {
    /// Returns the code as a string (e.g. `"E103"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E106 => "E106",
            ErrorCode::E110 => "E110",
            ErrorCode::W200 => "W200",
            ErrorCode::W201 => "W201",
            ErrorCode::W202 => "W202",
            ErrorCode::W203 => "W203",
            ErrorCode::W204 => "W204",
        }
    }

    /// Returns a short description of the code.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "empty identifier",
            ErrorCode::E101 => "duplicate identifier",
            ErrorCode::E102 => "reserved identifier",
            ErrorCode::E103 => "unknown parent reference",
            ErrorCode::E104 => "unknown child reference",
            ErrorCode::E105 => "self reference",
            ErrorCode::E106 => "separator in identifier",
            ErrorCode::E110 => "conflicting disease states",
            ErrorCode::W200 => "assumed proband",
            ErrorCode::W201 => "multiple probands",
            ErrorCode::W202 => "incomplete parents",
            ErrorCode::W203 => "disconnected individuals",
            ErrorCode::W204 => "unrecognized gender",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
