//! Diagnostic kinds and stable codes such as `SYN001`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The phase that detected a problem.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Malformed lexeme: illegal character, unterminated string or literal.
    Lexical,
    /// Unexpected or missing token.
    Syntax,
    /// Well-formed but meaningless: undeclared or duplicate names, bad
    /// instance connections.
    Semantic,
    /// Reported while running a testbench.
    Simulation,
}

impl DiagnosticKind {
    /// Three-letter prefix used in codes.
    pub fn prefix(self) -> &'static str {
        match self {
            DiagnosticKind::Lexical => "LEX",
            DiagnosticKind::Syntax => "SYN",
            DiagnosticKind::Semantic => "SEM",
            DiagnosticKind::Simulation => "SIM",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::Lexical => "lexical",
            DiagnosticKind::Syntax => "syntax",
            DiagnosticKind::Semantic => "semantic",
            DiagnosticKind::Simulation => "simulation",
        };
        f.write_str(name)
    }
}

/// A kind plus a number, displayed as e.g. `SEM002`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// Phase that owns the code.
    pub kind: DiagnosticKind,
    /// Number within the phase.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a code.
    pub const fn new(kind: DiagnosticKind, number: u16) -> Self {
        Self { kind, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.kind.prefix(), self.number)
    }
}
