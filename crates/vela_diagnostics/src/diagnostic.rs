//! The diagnostic record.

use crate::code::{DiagnosticCode, DiagnosticKind};
use crate::label::Label;
use crate::severity::Severity;
use crate::suggested_fix::SuggestedFix;
use serde::{Deserialize, Serialize};
use vela_source::{SourceDb, Span};

/// One problem found in the input.
///
/// `line` and `column` are 1-based and stay `0` until the diagnostic is
/// resolved against its source with [`Diagnostic::resolve_position`]. Entry
/// points resolve every diagnostic before returning, so callers always see
/// real positions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// How serious the problem is.
    pub severity: Severity,
    /// Stable code; its kind names the detecting phase.
    pub code: DiagnosticCode,
    /// One-line description.
    pub message: String,
    /// Where the problem was detected.
    pub span: Span,
    /// Line of `span.start`.
    pub line: u32,
    /// Column of `span.start`.
    pub column: u32,
    /// Extra annotated locations.
    pub labels: Vec<Label>,
    /// Footnotes rendered as `= note:`.
    pub notes: Vec<String>,
    /// Suggestions rendered as `= help:`.
    pub help: Vec<String>,
    /// An edit that would fix the problem.
    pub fix: Option<SuggestedFix>,
}

impl Diagnostic {
    /// Creates a diagnostic with the given severity.
    pub fn new(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            span,
            line: 0,
            column: 0,
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
            fix: None,
        }
    }

    /// A [`Severity::Fatal`] diagnostic.
    pub fn fatal(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Fatal, code, message, span)
    }

    /// A [`Severity::Error`] diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Error, code, message, span)
    }

    /// A [`Severity::Warning`] diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Warning, code, message, span)
    }

    /// A [`Severity::Note`] diagnostic.
    pub fn note(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Note, code, message, span)
    }

    /// The phase that reported this diagnostic.
    pub fn kind(&self) -> DiagnosticKind {
        self.code.kind
    }

    /// Sets an explicit position, for diagnostics whose span does not point
    /// into a registered source (e.g. line-based fixes).
    pub fn at_position(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Adds a label.
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Adds a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    /// Attaches a fix.
    pub fn with_fix(mut self, fix: SuggestedFix) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Fills `line`/`column` from the span. Diagnostics that already have a
    /// position or whose span is dummy are left alone.
    pub fn resolve_position(&mut self, db: &SourceDb) {
        if self.line != 0 {
            return;
        }
        if let Some(loc) = db.resolve_span(self.span) {
            self.line = loc.line;
            self.column = loc.column;
        }
    }
}

/// Resolves every diagnostic in `diags` against `db`.
pub fn resolve_positions(diags: &mut [Diagnostic], db: &SourceDb) {
    for d in diags {
        d.resolve_position(db);
    }
}
