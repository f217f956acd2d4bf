//! Diagnostic codes and constructors for analysis-time checks.
//!
//! `SEM010`..`SEM013` cover module instances: an instantiated module missing
//! from the source text, and connections that do not match its ports.

use vela_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticKind, Label};
use vela_source::Span;

/// Instantiated module is not defined in the same source.
pub const SEM010: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Semantic, 10);

/// Named connection to a port the module does not have.
pub const SEM011: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Semantic, 11);

/// Port connected more than once.
pub const SEM012: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Semantic, 12);

/// More positional connections than the module has ports.
pub const SEM013: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Semantic, 13);

/// Creates a warning for an instance of a module not defined in this text.
pub fn warning_unknown_module(module: &str, instance: &str, span: Span) -> Diagnostic {
    Diagnostic::warning(
        SEM010,
        format!(
            "module '{module}' is not defined in this source; instance '{instance}' is not checked"
        ),
        span,
    )
    .with_note("modules from other files are not resolved")
}

/// Creates an error for a named connection to a missing port.
pub fn error_unknown_port(module: &str, port: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        SEM011,
        format!("module '{module}' has no port named '{port}'"),
        span,
    )
}

/// Creates an error for a port connected twice.
pub fn error_port_connected_twice(
    port: &str,
    instance: &str,
    span: Span,
    previous: Span,
) -> Diagnostic {
    Diagnostic::error(
        SEM012,
        format!("port '{port}' of instance '{instance}' is connected more than once"),
        span,
    )
    .with_label(Label::primary(span, "connected again here"))
    .with_label(Label::secondary(previous, "first connected here"))
}

/// Creates an error for too many positional connections.
pub fn error_too_many_connections(
    instance: &str,
    given: usize,
    module: &str,
    ports: usize,
    span: Span,
) -> Diagnostic {
    Diagnostic::error(
        SEM013,
        format!(
            "instance '{instance}' has {given} positional connections \
             but module '{module}' has {ports} ports"
        ),
        span,
    )
}
