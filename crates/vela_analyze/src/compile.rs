//! The whole front end in one call.

use crate::check::check_instances;
use crate::module::analyze_module;
use crate::registry::ModuleRegistry;
use vela_config::CompileOptions;
use vela_diagnostics::{
    resolve_positions, summary_line, Diagnostic, DiagnosticRenderer, DiagnosticSink,
    TerminalRenderer,
};
use vela_ir::DesignAnalysis;
use vela_source::Span;
use vela_verilog_parser::errors::SYN100;
use vela_verilog_parser::{fix_source, parse_source, ParsedUnit, SyntaxFix};

/// Result of [`compile`].
#[derive(Debug)]
pub struct CompileOutput {
    /// `true` when no diagnostic is fatal and no module is marked fatal.
    pub success: bool,
    /// Every diagnostic, fixer notes first, then in detection order.
    pub diagnostics: Vec<Diagnostic>,
    /// Present iff `success`.
    pub ir: Option<DesignAnalysis>,
    /// Repairs made by the syntax fixer.
    pub fixes: Vec<SyntaxFix>,
    /// The parse the IR was built from.
    pub unit: ParsedUnit,
}

impl CompileOutput {
    /// Number of diagnostics at error severity or above.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_error())
            .count()
    }
}

/// Compiles `text` with default options.
pub fn compile(text: &str) -> CompileOutput {
    compile_with(text, &CompileOptions::default())
}

/// Compiles `text`: optional syntax fixing, parsing, instance checks, and
/// IR generation for every module when nothing is fatal.
pub fn compile_with(text: &str, options: &CompileOptions) -> CompileOutput {
    let (fixed, fixes) = if options.auto_fix {
        fix_source(text)
    } else {
        (text.to_string(), Vec::new())
    };
    let mut diagnostics: Vec<Diagnostic> = fixes
        .iter()
        .map(|f| {
            Diagnostic::note(SYN100, f.description.clone(), Span::DUMMY)
                .at_position(f.line, 1)
                .with_note(format!("`{}` became `{}`", f.original, f.fixed))
        })
        .collect();

    let mut unit = parse_source(&fixed);
    diagnostics.append(&mut unit.diagnostics);
    let success = !diagnostics.iter().any(|d| d.severity.is_fatal())
        && !unit.ast.modules.iter().any(|m| m.fatal);
    log::debug!(
        "parsed {} modules, {} diagnostics, success={success}",
        unit.ast.modules.len(),
        diagnostics.len()
    );

    let ir = if success {
        let sink = DiagnosticSink::new();
        let registry = ModuleRegistry::from_unit(&unit.ast);
        let mut modules = Vec::with_capacity(unit.ast.modules.len());
        for module in &unit.ast.modules {
            check_instances(module, &registry, &unit, &sink);
            modules.push(analyze_module(module, &unit));
        }
        let mut checks = sink.take_all();
        resolve_positions(&mut checks, &unit.source_db);
        diagnostics.append(&mut checks);
        let design = DesignAnalysis::new(modules);
        log::debug!(
            "generated IR for {} modules, fingerprint {}",
            design.module_count(),
            design.fingerprint.short()
        );
        Some(design)
    } else {
        None
    };

    if options.max_errors > 0 {
        truncate_errors(&mut diagnostics, options.max_errors);
    }

    CompileOutput {
        success,
        diagnostics,
        ir,
        fixes,
        unit,
    }
}

/// Drops everything after the `max`-th error.
fn truncate_errors(diagnostics: &mut Vec<Diagnostic>, max: usize) {
    let mut errors = 0;
    let cut = diagnostics.iter().position(|d| {
        if d.severity.is_error() {
            errors += 1;
        }
        errors > max
    });
    if let Some(cut) = cut {
        log::debug!("suppressing {} diagnostics", diagnostics.len() - cut);
        diagnostics.truncate(cut);
    }
}

/// Renders every diagnostic with source context, followed by a summary line.
pub fn render_report(output: &CompileOutput) -> String {
    let mut report =
        TerminalRenderer::default().render_all(&output.diagnostics, &output.unit.source_db);
    report.push_str(&summary_line(&output.diagnostics));
    report.push('\n');
    report
}
