//! Error types for Kinship operations.
//!
//! This module provides the main error type [`KinshipError`] and the
//! diagnostic system used to report problems with the input records:
//! - Error codes for documentation and searchability
//! - Severity levels
//! - A collector for accumulating every problem found in one pass
//!
//! # Example
//!
//! ```
//! # use kinship::error::{Diagnostic, ErrorCode};
//! let diag = Diagnostic::error("disease `cf` appears in more than one disease state of `7`")
//!     .with_code(ErrorCode::E110)
//!     .with_subject("7")
//!     .with_help("keep each disease in exactly one list");
//! assert_eq!(diag.code(), Some(ErrorCode::E110));
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod severity;
mod validation_error;

use std::io;

use thiserror::Error;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use severity::Severity;
pub use validation_error::ValidationError;

/// The main error type for Kinship operations.
///
/// # Diagnostic Variants
///
/// The `Validation` variant carries structured diagnostics naming the
/// offending individuals, which callers can use for rich error reporting.
#[derive(Debug, Error)]
pub enum KinshipError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Input error: {0}")]
    Input(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Routing error: {0}")]
    Routing(String),

    #[error("Layout error: {0}")]
    Layout(String),
}

/// A type alias for `Result<T, KinshipError>`.
pub type Result<T> = std::result::Result<T, KinshipError>;
