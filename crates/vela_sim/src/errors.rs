//! Diagnostic codes for simulation.
//!
//! Every simulation diagnostic is an Error except `SIM003` (horizon reached
//! without `$finish`), `SIM004`, `SIM011`, `SIM012` (warnings) and `SIM006`
//! (a note). None of them stop the run: the waveform computed so far is
//! always returned.

use vela_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticKind};
use vela_source::Span;

/// Unresolved signal reference in a timed statement.
pub const SIM001: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Simulation, 1);

/// Sequential block without a driven clock.
pub const SIM002: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Simulation, 2);

/// Horizon reached before `$finish`.
pub const SIM003: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Simulation, 3);

/// Statement in an `initial` block that is not turned into stimulus.
pub const SIM004: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Simulation, 4);

/// No testbench module in the text.
pub const SIM005: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Simulation, 5);

/// Combinational processes form a cycle.
pub const SIM006: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Simulation, 6);

/// `forever` body that does not advance time.
pub const SIM007: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Simulation, 7);

/// Instantiated module is not available.
pub const SIM008: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Simulation, 8);

/// Delay amount is not a constant.
pub const SIM009: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Simulation, 9);

/// A process failed while running.
pub const SIM010: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Simulation, 10);

/// Instance inside the device is not elaborated.
pub const SIM011: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Simulation, 11);

/// Port and connected net differ in width.
pub const SIM012: DiagnosticCode = DiagnosticCode::new(DiagnosticKind::Simulation, 12);

/// Creates an error for a timed statement naming an unknown signal.
pub fn error_unresolved_signal(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        SIM001,
        format!("timed statement refers to unknown signal '{name}'"),
        span,
    )
    .with_note("the statement is not scheduled")
}

/// Creates an error for a sequential block whose clock nothing drives.
pub fn error_no_clock(block_owner: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        SIM002,
        format!("no recognizable clock for sequential block in '{block_owner}'"),
        span,
    )
    .with_help("drive the clock from the testbench, e.g. `forever #5 clk = ~clk;`")
}

/// Creates a warning for a run cut off by the horizon.
pub fn warning_horizon(end_time: u64, span: Span) -> Diagnostic {
    Diagnostic::warning(
        SIM003,
        format!("simulation horizon reached at t={end_time} before $finish"),
        span,
    )
}

/// Creates a warning for a statement skipped when building stimulus.
pub fn warning_skipped(what: &str, span: Span) -> Diagnostic {
    Diagnostic::warning(
        SIM004,
        format!("{what} in an initial block is not simulated; statement skipped"),
        span,
    )
}

/// Creates an error for a text without a testbench module.
pub fn error_no_testbench(span: Span) -> Diagnostic {
    Diagnostic::error(SIM005, "no testbench module found", span)
        .with_help("a testbench is a module without ports")
}

/// Creates a note for a combinational cycle.
pub fn note_combinational_cycle(signal: &str, span: Span) -> Diagnostic {
    Diagnostic::note(
        SIM006,
        format!(
            "combinational logic through '{signal}' forms a loop; evaluated in source order"
        ),
        span,
    )
}

/// Creates an error for a `forever` loop that never advances time.
pub fn error_zero_delay_forever(span: Span) -> Diagnostic {
    Diagnostic::error(SIM007, "forever loop body has no delay", span)
}

/// Creates an error for an instance whose module is not available.
pub fn error_missing_device(module: &str, instance: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        SIM008,
        format!("module '{module}' of instance '{instance}' is not available for simulation"),
        span,
    )
}

/// Creates an error for a delay that is not a constant.
pub fn error_delay_not_constant(span: Span) -> Diagnostic {
    Diagnostic::error(SIM009, "delay is not a constant expression", span)
}

/// Creates an error for a process that failed while running.
pub fn error_process_failed(reason: &str, time: u64, span: Span) -> Diagnostic {
    Diagnostic::error(SIM010, format!("process stopped at t={time}: {reason}"), span)
        .with_note("the process is disabled for the rest of the run")
}

/// Creates a warning for an instance nested inside the device.
pub fn warning_nested_instance(instance: &str, span: Span) -> Diagnostic {
    Diagnostic::warning(
        SIM011,
        format!("instance '{instance}' inside the device is not elaborated"),
        span,
    )
}

/// Creates a warning for a port connected to a net of another width.
pub fn warning_width_mismatch(
    port: &str,
    port_width: u32,
    net_width: u32,
    span: Span,
) -> Diagnostic {
    Diagnostic::warning(
        SIM012,
        format!("port '{port}' is {port_width} bits wide but its net is {net_width} bits"),
        span,
    )
}
