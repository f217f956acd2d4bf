//! Severity levels, least to most severe.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is.
///
/// Only [`Severity::Fatal`] blocks IR generation for a module. [`Severity::Error`]
/// makes the overall result unsuccessful for simulation but still lets
/// compilation produce IR.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// Informational, e.g. an applied automatic fix.
    Note,
    /// Suspicious but accepted input.
    Warning,
    /// A definite problem.
    Error,
    /// A problem that leaves the tree unsafe for code generation.
    Fatal,
}

impl Severity {
    /// `true` for `Error` and `Fatal`.
    pub fn is_error(self) -> bool {
        self >= Severity::Error
    }

    /// `true` for `Fatal`.
    pub fn is_fatal(self) -> bool {
        self == Severity::Fatal
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        f.write_str(s)
    }
}
