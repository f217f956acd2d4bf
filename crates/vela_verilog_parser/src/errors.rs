//! Diagnostic codes emitted by the lexer and parser.
//!
//! `LEX` codes cover malformed lexemes, `SYN` codes grammar violations, and
//! `SEM` codes the name checks done while parsing (undeclared and duplicate
//! names, non-constant ranges). Analysis-time semantic checks live in
//! `vela_analyze`.

use vela_diagnostics::{DiagnosticCode, DiagnosticKind};

/// Character that cannot start any token.
pub const LEX001: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Lexical, 1);

/// String literal not closed before end of line.
pub const LEX002: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Lexical, 2);

/// Based literal with no digits, bad digits for its base, or zero size.
pub const LEX003: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Lexical, 3);

/// Block comment not closed before end of input.
pub const LEX004: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Lexical, 4);

/// `$` not followed by a name.
pub const LEX005: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Lexical, 5);

/// Unexpected token.
pub const SYN001: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Syntax, 1);

/// Unsupported module item skipped.
pub const SYN002: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Syntax, 2);

/// Input contains no module.
pub const SYN003: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Syntax, 3);

/// Expressions or statements nested deeper than [`crate::MAX_NESTING`].
pub const SYN004: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Syntax, 4);

/// Line rewritten by the syntax fixer.
pub const SYN100: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Syntax, 100);

/// Reference to a name with no visible declaration.
pub const SEM001: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Semantic, 1);

/// Name declared twice in one scope.
pub const SEM002: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Semantic, 2);

/// Range bound or parameter value is not a constant expression.
pub const SEM003: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Semantic, 3);

/// Instance parameter override ignored.
pub const SEM004: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Semantic, 4);

/// Direction declared in the body for a name missing from the header.
pub const SEM005: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Semantic, 5);

/// Header port never given a direction.
pub const SEM006: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Semantic, 6);

/// Declared range wider than [`vela_common::MAX_WIDTH`] bits.
pub const SEM007: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Semantic, 7);
