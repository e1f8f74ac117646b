//! Collector for accumulating diagnostics while building a pedigree.
//!
//! The [`DiagnosticCollector`] lets the graph builder report every problem in
//! the input instead of failing on the first one.

use crate::error::{Diagnostic, ValidationError};

/// A collector for accumulating diagnostics.
///
/// # Example
///
/// ```text
/// let mut collector = DiagnosticCollector::new();
///
/// collector.emit(
///     Diagnostic::error("unknown parent `12` referenced by `4`")
///         .with_code(ErrorCode::E103)
///         .with_subject("4")
/// );
/// collector.emit(
///     Diagnostic::warning("no proband flagged")
///         .with_code(ErrorCode::W200)
/// );
///
/// // Err(ValidationError) because one error was emitted
/// let result = collector.finish();
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    ///
    /// If it is an error, the collector is marked as having errors.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Returns `true` if an error has been emitted so far.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Finish collection as a failure, keeping every diagnostic emitted so far.
    pub fn into_error(self) -> ValidationError {
        ValidationError::new(self.diagnostics)
    }

    /// Finish collection.
    ///
    /// - If there are errors, returns `Err(ValidationError)` with all diagnostics,
    ///   warnings included.
    /// - Otherwise returns the warnings.
    pub fn finish(self) -> Result<Vec<Diagnostic>, ValidationError> {
        if self.has_errors {
            Err(ValidationError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_collector_new_finish_ok() {
        let collector = DiagnosticCollector::new();
        assert_eq!(collector.finish().unwrap(), Vec::new());
    }

    #[test]
    fn test_collector_emit_warning_finish_ok() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("test warning").with_code(ErrorCode::W201));

        assert!(!collector.has_errors());
        let warnings = collector.finish().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code(), Some(ErrorCode::W201));
    }

    #[test]
    fn test_collector_emit_multiple_finish_err() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::error("error 1"));
        collector.emit(Diagnostic::warning("warning 1"));
        collector.emit(Diagnostic::error("error 2"));

        assert!(collector.has_errors());
        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 3);
        assert_eq!(err.diagnostics()[0].message(), "error 1");
        assert_eq!(err.diagnostics()[2].message(), "error 2");
    }
}
