//! Analysis of parsed Verilog and the `compile` entry point.
//!
//! [`compile`] runs the front end end to end: optional syntax fixing,
//! parsing, instance checks against the other modules of the same text, and
//! one [`ModuleAnalysis`](vela_ir::ModuleAnalysis) per module when nothing
//! is fatal. [`process`] classifies `always` blocks for both the analyzer and
//! the simulator.

#![warn(missing_docs)]

/// Instance checks.
pub mod check;
/// Whole-pipeline entry points.
pub mod compile;
/// Diagnostic codes for analysis-time checks.
pub mod errors;
/// Per-module IR generation.
pub mod module;
/// Classification of procedural blocks.
pub mod process;
/// Name → module lookup.
pub mod registry;

pub use check::check_instances;
pub use compile::{compile, compile_with, render_report, CompileOutput};
pub use module::analyze_module;
pub use process::{classify_always, detect_reset, Accesses, ClockEdge, ProcessShape, ResetBranch};
pub use registry::ModuleRegistry;
