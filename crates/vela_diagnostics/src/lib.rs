//! Structured diagnostics shared by every Vela phase.
//!
//! Each phase appends [`Diagnostic`]s to a [`DiagnosticSink`] in detection
//! order. A diagnostic carries its [`DiagnosticKind`] (lexical, syntax,
//! semantic or simulation) inside its [`DiagnosticCode`], a [`Severity`],
//! a byte span, and once resolved against the source, a 1-based line and
//! column. [`TerminalRenderer`] prints diagnostics with surrounding source
//! lines; [`JsonRenderer`] emits them for machine consumers.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod label;
pub mod renderer;
pub mod severity;
pub mod sink;
pub mod suggested_fix;

pub use code::{DiagnosticCode, DiagnosticKind};
pub use diagnostic::{resolve_positions, Diagnostic};
pub use label::{Label, LabelStyle};
pub use renderer::{summary_line, DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
pub use suggested_fix::{Replacement, SuggestedFix};
