//! Human- and machine-readable diagnostic output.

use crate::diagnostic::Diagnostic;
use crate::label::LabelStyle;
use crate::severity::Severity;
use std::fmt::Write;
use vela_source::SourceDb;

/// Formats a diagnostic for output.
pub trait DiagnosticRenderer {
    /// Renders one diagnostic.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;

    /// Renders every diagnostic in order, one after another.
    fn render_all(&self, diags: &[Diagnostic], source_db: &SourceDb) -> String {
        diags.iter().map(|d| self.render(d, source_db)).collect()
    }
}

/// Compiler-style terminal output with surrounding source lines.
///
/// ```text
/// fatal[SYN001]: expected ';', found 'endmodule'
///   --> counter.v:4:1
///    |
///  3 |   reg [3:0] count
///  4 | endmodule
///    | ^^^^^^^^^ expected ';'
///    |
///    = help: terminate the declaration with ';'
/// ```
pub struct TerminalRenderer {
    /// Lines of context printed before the error line.
    pub context_before: u32,
    /// Lines of context printed after the error line.
    pub context_after: u32,
}

impl TerminalRenderer {
    /// Creates a renderer with the given context window.
    pub fn new(context_before: u32, context_after: u32) -> Self {
        Self {
            context_before,
            context_after,
        }
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(2, 1)
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}[{}]: {}", diag.severity, diag.code, diag.message);

        let file = source_db.get_file(diag.span.file);
        match (file, source_db.resolve_span(diag.span)) {
            (Some(file), Some(loc)) => {
                let _ = writeln!(out, "  --> {loc}");
                let first = loc.line.saturating_sub(self.context_before).max(1);
                let last = (loc.line + self.context_after).min(file.line_count());
                let gutter = last.to_string().len();
                let blank = " ".repeat(gutter);
                let _ = writeln!(out, "{blank} |");
                for n in first..=last {
                    let text = file.line_text(n).unwrap_or_default();
                    let _ = writeln!(out, "{n:>gutter$} | {text}");
                    if n == loc.line {
                        let width = if loc.end_line == loc.line {
                            loc.end_column.saturating_sub(loc.column).max(1)
                        } else {
                            (text.len() as u32 + 1).saturating_sub(loc.column).max(1)
                        };
                        let label = diag
                            .labels
                            .iter()
                            .find(|l| l.style == LabelStyle::Primary)
                            .map(|l| format!(" {}", l.message))
                            .unwrap_or_default();
                        let _ = writeln!(
                            out,
                            "{blank} | {}{}{label}",
                            " ".repeat(loc.column.saturating_sub(1) as usize),
                            "^".repeat(width as usize)
                        );
                    }
                }
                for label in diag.labels.iter().filter(|l| l.style == LabelStyle::Secondary) {
                    if let Some(at) = source_db.resolve_span(label.span) {
                        let _ = writeln!(out, "{blank} = {}: {}", at, label.message);
                    }
                }
                let _ = writeln!(out, "{blank} |");
            }
            _ if diag.line > 0 => {
                let _ = writeln!(out, "  --> line {}:{}", diag.line, diag.column);
            }
            _ => {}
        }

        for note in &diag.notes {
            let _ = writeln!(out, "   = note: {note}");
        }
        for help in &diag.help {
            let _ = writeln!(out, "   = help: {help}");
        }
        out
    }
}

/// One JSON object per line.
pub struct JsonRenderer;

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic, _source_db: &SourceDb) -> String {
        match serde_json::to_string(diag) {
            Ok(json) => json + "\n",
            Err(e) => format!("{{\"error\":\"{e}\"}}\n"),
        }
    }
}

/// `"2 errors, 1 warning"`-style summary.
pub fn summary_line(diags: &[Diagnostic]) -> String {
    let errors = diags.iter().filter(|d| d.severity.is_error()).count();
    let warnings = diags
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("{n} {word}")
        } else {
            format!("{n} {word}s")
        }
    };
    format!("{}, {}", plural(errors, "error"), plural(warnings, "warning"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{DiagnosticCode, DiagnosticKind};
    use crate::label::Label;
    use vela_source::Span;

    const SYN001: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Syntax, 1);

    fn db_with(text: &str) -> (SourceDb, vela_source::FileId) {
        let mut db = SourceDb::new();
        let id = db.add_source("counter.v", text);
        (db, id)
    }

    #[test]
    fn renders_context_and_caret() {
        let (db, id) = db_with("module c;\n  reg [3:0] count\nendmodule\n");
        let span = Span::new(id, 28, 37);
        let diag = Diagnostic::fatal(SYN001, "expected ';', found 'endmodule'", span)
            .with_label(Label::primary(span, "expected ';'"))
            .with_help("terminate the declaration with ';'");
        let out = TerminalRenderer::default().render(&diag, &db);
        assert!(out.starts_with("fatal[SYN001]: expected ';', found 'endmodule'\n"));
        assert!(out.contains("--> counter.v:3:1"));
        assert!(out.contains("2 |   reg [3:0] count"));
        assert!(out.contains("3 | endmodule"));
        assert!(out.contains("  | ^^^^^^^^^ expected ';'"));
        assert!(out.contains("= help: terminate the declaration with ';'"));
    }

    #[test]
    fn context_window_clamps_at_file_start() {
        let (db, id) = db_with("bad$\nmodule m;\n");
        let diag = Diagnostic::error(SYN001, "illegal", Span::new(id, 3, 4));
        let out = TerminalRenderer::new(5, 0).render(&diag, &db);
        assert!(out.contains("1 | bad$"));
        assert!(out.contains("  |    ^"));
        assert!(!out.contains("2 | module"));
    }

    #[test]
    fn dummy_span_with_explicit_position() {
        let db = SourceDb::new();
        let diag = Diagnostic::warning(SYN001, "fixed", Span::DUMMY).at_position(4, 1);
        let out = TerminalRenderer::default().render(&diag, &db);
        assert!(out.contains("warning[SYN001]: fixed"));
        assert!(out.contains("--> line 4:1"));
    }

    #[test]
    fn json_renderer_emits_one_line() {
        let db = SourceDb::new();
        let diag = Diagnostic::error(SYN001, "oops", Span::DUMMY);
        let out = JsonRenderer.render(&diag, &db);
        assert_eq!(out.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["message"], "oops");
        assert_eq!(value["severity"], "Error");
    }

    #[test]
    fn summary_pluralizes() {
        let diags = vec![
            Diagnostic::fatal(SYN001, "a", Span::DUMMY),
            Diagnostic::error(SYN001, "b", Span::DUMMY),
            Diagnostic::warning(SYN001, "c", Span::DUMMY),
        ];
        assert_eq!(summary_line(&diags), "2 errors, 1 warning");
        assert_eq!(summary_line(&[]), "0 errors, 0 warnings");
    }
}
