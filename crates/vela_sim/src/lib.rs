//! Discrete-time testbench simulator for the Vela Verilog front end.
//!
//! [`simulate`] parses a testbench text, elaborates the device it
//! instantiates, turns its `initial` blocks into a stimulus schedule and
//! steps through every scheduled time point. The result carries the
//! diagnostics, the sampled [`Waveform`] and a per-signal summary.
//!
//! # Time model
//!
//! At each distinct time point, in ascending order:
//!
//! 1. stimulus scheduled at that time is applied in source order;
//! 2. combinational processes run once, writers before readers;
//! 3. sequential processes whose clock has an edge run against the values
//!    from before the time point, and their writes commit together;
//! 4. processes whose reset is asserted take their reset values;
//! 5. combinational processes run again and every signal is sampled.
//!
//! `forever` loops are expanded up to the horizon, so a run always ends.
//!
//! # Modules
//!
//! - `config`: horizon and name hints
//! - `device`: testbench detection, port binding and process extraction
//! - `evaluator`: expression evaluation and statement execution
//! - `kernel`: the time-point loop
//! - `stimulus`: schedules from `initial` blocks
//! - `waveform`: samples, histories and VCD export

#![warn(missing_docs)]

pub mod config;
mod device;
pub mod error;
pub mod errors;
pub mod evaluator;
mod kernel;
pub mod stimulus;
pub mod value;
pub mod waveform;

pub use config::{Horizon, SimConfig};
pub use error::SimError;
pub use value::{SignalRole, SimSignal, SimSignalId};
pub use waveform::{Sample, SignalTrace, ValueChange, VcdRecorder, Waveform, WaveformRecorder};

use serde::{Deserialize, Serialize};
use std::io::Write;
use vela_config::TimeUnit;
use vela_diagnostics::Diagnostic;
use vela_verilog_parser::{parse_named, ParsedUnit};

/// Outcome of one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// `true` if no diagnostic is an error.
    pub success: bool,
    /// Testbench parse diagnostics, then elaboration and run diagnostics.
    pub diagnostics: Vec<Diagnostic>,
    /// Every sample taken, in time order.
    pub waveform: Waveform,
    /// Tracked signals with final values and change histories.
    pub signals: Vec<SignalTrace>,
    /// Time unit of the testbench's `` `timescale``, or the configured one.
    pub time_unit: TimeUnit,
    /// Last simulated time.
    pub end_time: u64,
    /// `true` if `$finish` or `$stop` ended the run.
    pub finished: bool,
    /// Name of the testbench module.
    pub testbench: Option<String>,
}

impl SimulationResult {
    /// Looks up a tracked signal by flat name.
    pub fn signal(&self, name: &str) -> Option<&SignalTrace> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// Writes the run as VCD.
    pub fn write_vcd<W: Write>(&self, writer: W) -> Result<(), SimError> {
        let signals: Vec<SimSignal> = self
            .signals
            .iter()
            .map(|s| SimSignal {
                name: s.name.clone(),
                width: s.width,
                role: s.role,
            })
            .collect();
        let mut recorder = VcdRecorder::new(writer, self.time_unit);
        let top = self.testbench.as_deref().unwrap_or("testbench");
        self.waveform.write_to(top, &signals, &mut recorder)
    }
}

/// Simulates `tb_text` with default settings and the given horizon.
///
/// `device` supplies modules the testbench instantiates; modules defined in
/// the testbench text itself are used when it is `None` or lacks them.
pub fn simulate(tb_text: &str, device: Option<&ParsedUnit>, horizon: Horizon) -> SimulationResult {
    simulate_with(tb_text, device, &SimConfig::with_horizon(horizon))
}

/// Simulates `tb_text` with explicit settings.
pub fn simulate_with(
    tb_text: &str,
    device: Option<&ParsedUnit>,
    config: &SimConfig,
) -> SimulationResult {
    let tb = parse_named("testbench.v", tb_text);
    let mut diagnostics = tb.diagnostics.clone();
    let time_unit = timescale_unit(&tb)
        .or_else(|| device.and_then(timescale_unit))
        .unwrap_or(config.time_unit);

    if tb.has_fatal() {
        log::debug!("testbench has syntax errors; not simulating");
        return SimulationResult {
            success: false,
            diagnostics,
            waveform: Waveform::new(),
            signals: Vec::new(),
            time_unit,
            end_time: 0,
            finished: false,
            testbench: None,
        };
    }

    let mut design = device::elaborate(&tb, device, config);
    diagnostics.append(&mut design.diagnostics);
    let testbench = design.top.as_ref().map(|(name, _)| name.clone());
    if testbench.is_none() {
        return SimulationResult {
            success: false,
            diagnostics,
            waveform: Waveform::new(),
            signals: Vec::new(),
            time_unit,
            end_time: 0,
            finished: false,
            testbench,
        };
    }

    let (waveform, run_diagnostics, summary) = kernel::SimKernel::new(&mut design, config).run();
    diagnostics.extend(run_diagnostics);
    let signals = waveform.traces(&design.table);
    let success = !diagnostics.iter().any(|d| d.severity.is_error());
    log::debug!(
        "simulation ended at t={} ({} signals, {} diagnostics)",
        summary.end_time,
        signals.len(),
        diagnostics.len()
    );
    SimulationResult {
        success,
        diagnostics,
        waveform,
        signals,
        time_unit,
        end_time: summary.end_time,
        finished: summary.finished,
        testbench,
    }
}

fn timescale_unit(unit: &ParsedUnit) -> Option<TimeUnit> {
    unit.directives
        .iter()
        .find(|d| d.name == "timescale")
        .and_then(|d| d.argument.split('/').next())
        .and_then(TimeUnit::from_timescale)
}
