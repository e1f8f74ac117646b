//! Error adapter for converting KinshipError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! # Multi-Error Support
//!
//! When a [`ValidationError`](kinship::error::ValidationError) carries several
//! diagnostics, each diagnostic is rendered independently.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, Severity as MietteSeverity};

use kinship::{
    KinshipError,
    error::{Diagnostic, Severity},
};

/// Adapter for a single kinship diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(diag: &'a Diagnostic) -> Self {
        Self { diag }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<MietteSeverity> {
        Some(match self.diag.severity() {
            Severity::Error => MietteSeverity::Error,
            Severity::Warning => MietteSeverity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }
}

/// Adapter for non-diagnostic [`KinshipError`] variants.
///
/// This adapter handles errors that don't have diagnostic information,
/// such as I/O errors, malformed JSON, routing errors and layout errors.
pub struct ErrorAdapter<'a>(pub &'a KinshipError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            KinshipError::Io(_) => "kinship::io",
            KinshipError::Input(_) => "kinship::input",
            KinshipError::Validation(_) => return None,
            KinshipError::Routing(_) => "kinship::routing",
            KinshipError::Layout(_) => "kinship::layout",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            KinshipError::Input(_) => Some(Box::new(
                "the input must be a JSON array of individual records",
            )),
            _ => None,
        }
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A validation diagnostic with code and help.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A plain error.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<MietteSeverity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }
}

/// Convert a [`KinshipError`] into a list of reportable errors.
///
/// For [`KinshipError::Validation`], this returns one [`Reportable`] for
/// each diagnostic in the error. For other error variants, this returns a
/// single [`Reportable`].
pub fn to_reportables(err: &KinshipError) -> Vec<Reportable<'_>> {
    match err {
        KinshipError::Validation(validation) => validation
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use kinship::error::{ErrorCode, ValidationError};

    use super::*;

    #[test]
    fn test_single_diagnostic() {
        let diag = Diagnostic::error("duplicate identifier `3`")
            .with_code(ErrorCode::E101)
            .with_help("give every individual a unique `id`");
        let err = KinshipError::from(ValidationError::from(diag));

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        match &reportables[0] {
            Reportable::Diagnostic(d) => {
                assert_eq!(d.to_string(), "duplicate identifier `3`");
                assert_eq!(d.code().unwrap().to_string(), "E101");
                assert_eq!(d.severity(), Some(MietteSeverity::Error));
            }
            Reportable::Error(_) => panic!("Expected Diagnostic"),
        }
    }

    #[test]
    fn test_multiple_diagnostics() {
        let diags = vec![
            Diagnostic::error("first error").with_code(ErrorCode::E103),
            Diagnostic::error("second error").with_code(ErrorCode::E104),
            Diagnostic::error("third error"),
        ];
        let err = KinshipError::from(ValidationError::from(diags));

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 3);
        assert_eq!(reportables[0].to_string(), "first error");
        assert_eq!(reportables[1].to_string(), "second error");
        assert_eq!(reportables[2].to_string(), "third error");
    }

    #[test]
    fn test_non_validation_error() {
        let err = KinshipError::Routing("no route from `2` to `relationship:2,3`".to_string());

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(
                    e.to_string(),
                    "Routing error: no route from `2` to `relationship:2,3`"
                );
                assert_eq!(e.code().unwrap().to_string(), "kinship::routing");
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_collected_warnings_keep_their_severity() {
        let diags = vec![
            Diagnostic::warning("no proband flagged").with_code(ErrorCode::W200),
            Diagnostic::error("unknown parent `9` referenced by `1`").with_code(ErrorCode::E103),
        ];
        let err = KinshipError::from(ValidationError::from(diags));

        let reportables = to_reportables(&err);
        assert_eq!(reportables[0].severity(), Some(MietteSeverity::Warning));
        assert_eq!(reportables[1].severity(), Some(MietteSeverity::Error));
    }
}
