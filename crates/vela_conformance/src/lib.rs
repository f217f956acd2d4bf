//! Conformance test helpers for the Vela front end and simulator.
//!
//! Provides pipeline functions that run source text through compilation or
//! simulation and return structured results for assertion in the
//! integration tests, plus the reference designs those tests share.

#![warn(missing_docs)]

pub mod designs;

use vela_analyze::{compile_with, CompileOutput};
use vela_config::{load_config_from_str, ConfigError, VelaConfig};
use vela_diagnostics::{Diagnostic, DiagnosticCode, Severity};
use vela_ir::DesignAnalysis;
use vela_sim::{simulate_with, Horizon, SimConfig, SimulationResult};
use vela_verilog_parser::parse_source;

/// Result of running the whole front end on one source text.
pub struct PipelineResult {
    /// The compiler output, including the parsed unit.
    pub output: CompileOutput,
    /// Whether any error-severity diagnostic was emitted.
    pub has_errors: bool,
    /// Number of error-severity diagnostics, fatal ones included.
    pub error_count: usize,
    /// Number of warning-severity diagnostics.
    pub warning_count: usize,
}

impl PipelineResult {
    /// The IR, present when nothing was fatal.
    pub fn ir(&self) -> Option<&DesignAnalysis> {
        self.output.ir.as_ref()
    }

    /// Every diagnostic in detection order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.output.diagnostics
    }

    /// Number of diagnostics carrying `code`.
    pub fn count(&self, code: DiagnosticCode) -> usize {
        count_code(&self.output.diagnostics, code)
    }
}

/// Parses a `vela.toml` document.
pub fn make_config(toml: &str) -> Result<VelaConfig, ConfigError> {
    load_config_from_str(toml)
}

/// Runs the front end on `source` with default options.
pub fn full_pipeline(source: &str) -> PipelineResult {
    full_pipeline_with(source, &VelaConfig::default())
}

/// Runs the front end on `source` with the `[compile]` section of `config`.
pub fn full_pipeline_with(source: &str, config: &VelaConfig) -> PipelineResult {
    let output = compile_with(source, &config.compile);
    let error_count = output.error_count();
    let warning_count = output
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    PipelineResult {
        has_errors: error_count > 0,
        error_count,
        warning_count,
        output,
    }
}

/// Simulates `testbench` against a device parsed from `device`.
pub fn simulate_design(device: &str, testbench: &str, horizon: Horizon) -> SimulationResult {
    simulate_design_with(device, testbench, &SimConfig::with_horizon(horizon))
}

/// Simulates `testbench` against a device parsed from `device` with explicit
/// settings.
pub fn simulate_design_with(device: &str, testbench: &str, config: &SimConfig) -> SimulationResult {
    let unit = parse_source(device);
    simulate_with(testbench, Some(&unit), config)
}

/// Number of diagnostics in `diagnostics` carrying `code`.
pub fn count_code(diagnostics: &[Diagnostic], code: DiagnosticCode) -> usize {
    diagnostics.iter().filter(|d| d.code == code).count()
}

/// Diagnostic codes as display strings, in order.
pub fn codes(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics.iter().map(|d| d.code.to_string()).collect()
}
