//! Time-point evaluation loop.
//!
//! [`SimKernel`] visits each distinct stimulus time in ascending order. At
//! each time point it applies the stimulus, settles combinational logic,
//! fires sequential processes on clock edges using the values from before
//! the time point, forces asserted resets, settles again and samples every
//! signal. A process that fails is reported once and disabled.

use crate::config::SimConfig;
use crate::device::{CombBody, Design};
use crate::error::SimError;
use crate::errors;
use crate::evaluator::{
    eval_expr, exec_statement, resolve_target, EvalContext, ExecResult, PendingUpdate,
};
use crate::waveform::Waveform;
use std::collections::BTreeSet;
use vela_common::{BitVec, Logic};
use vela_diagnostics::Diagnostic;
use vela_source::Span;
use vela_verilog_parser::ast::Edge;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunSummary {
    /// Last processed time point.
    pub end_time: u64,
    /// `true` if a `$finish` or `$stop` ended the run.
    pub finished: bool,
}

pub(crate) struct SimKernel<'d, 'a> {
    design: &'d mut Design<'a>,
    config: &'d SimConfig,
    waveform: Waveform,
    diagnostics: Vec<Diagnostic>,
}

impl<'d, 'a> SimKernel<'d, 'a> {
    pub fn new(design: &'d mut Design<'a>, config: &'d SimConfig) -> Self {
        Self {
            design,
            config,
            waveform: Waveform::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Runs every time point and returns the waveform and run diagnostics.
    pub fn run(mut self) -> (Waveform, Vec<Diagnostic>, RunSummary) {
        let schedule = &self.design.schedule;
        let mut times: BTreeSet<u64> = schedule.events.iter().map(|e| e.time).collect();
        times.insert(0);
        if let Some(finish) = schedule.finish {
            times.insert(finish);
            times.retain(|t| *t <= finish);
        } else if schedule.truncated {
            if let Some(limit) = self.config.time_limit() {
                times.insert(limit);
            }
        }
        let scheduled_finish = schedule.finish;
        let truncated = schedule.truncated;
        log::debug!(
            "running {} time points over {} signals",
            times.len(),
            self.design.table.len()
        );

        let mut cursor = 0;
        let mut summary = RunSummary {
            end_time: 0,
            finished: false,
        };
        for time in times {
            let device_finish = self.step(time, &mut cursor);
            summary.end_time = time;
            if device_finish || scheduled_finish == Some(time) {
                summary.finished = true;
                break;
            }
        }

        if !summary.finished && truncated {
            log::warn!("horizon reached at t={} before $finish", summary.end_time);
            let span = self.design.top.as_ref().map_or(Span::DUMMY, |(_, s)| *s);
            self.report(0, errors::warning_horizon(summary.end_time, span));
        }
        (self.waveform, self.diagnostics, summary)
    }

    /// Processes one time point. Returns `true` if a device process ran
    /// `$finish`.
    fn step(&mut self, time: u64, cursor: &mut usize) -> bool {
        let before = self.design.table.values().to_vec();

        while let Some(ev) = self.design.schedule.events.get(*cursor).copied() {
            if ev.time != time {
                break;
            }
            *cursor += 1;
            let scope = &self.design.scopes[ev.scope];
            let ctx = EvalContext {
                scope,
                values: self.design.table.values(),
                time,
            };
            let updates = eval_expr(&ctx, ev.value)
                .and_then(|v| resolve_target(&ctx, ev.target, &v));
            match updates {
                Ok(updates) => self.commit(&updates),
                Err(e) => {
                    let diag = errors::error_process_failed(&e.to_string(), time, ev.span);
                    self.report(ev.scope, diag);
                }
            }
        }

        self.settle(time);

        let mut finished = false;
        let mut pending = Vec::new();
        for index in 0..self.design.seq.len() {
            let process = &self.design.seq[index];
            if !process.enabled {
                continue;
            }
            let clock = process.clock.index();
            if !is_edge(&before[clock], &self.design.table.values()[clock], process.edge) {
                continue;
            }
            let mut frame = before.clone();
            let scope = &self.design.scopes[process.scope];
            match exec_statement(scope, &mut frame, time, process.body, &mut pending) {
                Ok(ExecResult::Finish) => finished = true,
                Ok(ExecResult::Continue) => {}
                Err(e) => self.disable_seq(index, &e, time),
            }
        }
        self.commit(&pending);

        for index in 0..self.design.seq.len() {
            let process = &self.design.seq[index];
            let Some(reset) = process.reset.as_ref().filter(|_| process.enabled) else {
                continue;
            };
            let level = self.design.table.value(reset.signal).bit(0);
            if !reset.branch.is_asserted(level) {
                continue;
            }
            let mut frame = self.design.table.values().to_vec();
            let mut forced = Vec::new();
            let scope = &self.design.scopes[process.scope];
            match exec_statement(scope, &mut frame, time, reset.branch.asserted, &mut forced) {
                Ok(_) => self.commit(&forced),
                Err(e) => self.disable_seq(index, &e, time),
            }
        }

        self.settle(time);
        self.waveform.record(time, &self.design.table);
        log::trace!("t={time} settled");
        finished
    }

    /// Runs every enabled combinational process once, in dependency order.
    fn settle(&mut self, time: u64) {
        for index in 0..self.design.comb.len() {
            let process = &self.design.comb[index];
            if !process.enabled {
                continue;
            }
            let scope = &self.design.scopes[process.scope];
            let mut pending = Vec::new();
            let result = match process.body {
                CombBody::Block(body) => {
                    let mut frame = self.design.table.values().to_vec();
                    exec_statement(scope, &mut frame, time, body, &mut pending).map(|_| ())
                }
                CombBody::Assign { target, value } => {
                    let ctx = EvalContext {
                        scope,
                        values: self.design.table.values(),
                        time,
                    };
                    eval_expr(&ctx, value)
                        .and_then(|v| resolve_target(&ctx, target, &v))
                        .map(|u| pending = u)
                }
                CombBody::Drive { target, value } => {
                    let ctx = EvalContext {
                        scope,
                        values: self.design.table.values(),
                        time,
                    };
                    eval_expr(&ctx, value).map(|v| {
                        pending.push(PendingUpdate {
                            target,
                            value: v,
                            range: None,
                        })
                    })
                }
                CombBody::Forward { target, source } => {
                    let ctx = EvalContext {
                        scope,
                        values: self.design.table.values(),
                        time,
                    };
                    let value = self.design.table.value(source).clone();
                    resolve_target(&ctx, target, &value).map(|u| pending = u)
                }
            };
            match result {
                Ok(()) => self.commit(&pending),
                Err(e) => {
                    let (scope, span) = (process.scope, process.span);
                    self.design.comb[index].enabled = false;
                    self.report(scope, errors::error_process_failed(&e.to_string(), time, span));
                }
            }
        }
    }

    fn commit(&mut self, updates: &[PendingUpdate]) {
        let values = self.design.table.values_mut();
        for update in updates {
            update.apply(values);
        }
    }

    fn disable_seq(&mut self, index: usize, error: &SimError, time: u64) {
        let process = &mut self.design.seq[index];
        process.enabled = false;
        let (scope, span) = (process.scope, process.span);
        self.report(scope, errors::error_process_failed(&error.to_string(), time, span));
    }

    fn report(&mut self, scope: usize, mut diag: Diagnostic) {
        if let Some(s) = self.design.scopes.get(scope) {
            diag.resolve_position(&s.unit.source_db);
        }
        self.diagnostics.push(diag);
    }
}

/// Verilog edge detection on bit 0: a rising edge is `0 -> 1`, `0 -> x/z`
/// or `x/z -> 1`; a falling edge mirrors it.
pub(crate) fn is_edge(before: &BitVec, after: &BitVec, edge: Edge) -> bool {
    let (b, a) = (before.bit(0), after.bit(0));
    if b == a {
        return false;
    }
    match edge {
        Edge::Posedge => b == Logic::Zero || a == Logic::One,
        Edge::Negedge => b == Logic::One || a == Logic::Zero,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Horizon;
    use crate::device::elaborate;
    use vela_verilog_parser::parse_source;

    fn bit(c: char) -> BitVec {
        BitVec::from_logic(Logic::from_char(c).unwrap())
    }

    #[test]
    fn edges() {
        assert!(is_edge(&bit('0'), &bit('1'), Edge::Posedge));
        assert!(is_edge(&bit('0'), &bit('x'), Edge::Posedge));
        assert!(is_edge(&bit('z'), &bit('1'), Edge::Posedge));
        assert!(!is_edge(&bit('x'), &bit('0'), Edge::Posedge));
        assert!(!is_edge(&bit('1'), &bit('1'), Edge::Posedge));
        assert!(is_edge(&bit('1'), &bit('0'), Edge::Negedge));
        assert!(is_edge(&bit('x'), &bit('0'), Edge::Negedge));
        assert!(!is_edge(&bit('0'), &bit('1'), Edge::Negedge));
    }

    fn run(text: &str, horizon: Horizon) -> (Waveform, Vec<Diagnostic>, RunSummary) {
        let unit = parse_source(text);
        let config = SimConfig::with_horizon(horizon);
        let mut design = elaborate(&unit, None, &config);
        assert!(design.diagnostics.is_empty(), "{:?}", design.diagnostics);
        SimKernel::new(&mut design, &config).run()
    }

    #[test]
    fn shift_register_uses_pre_edge_values() {
        let (w, diags, summary) = run(
            "module tb;
               reg clk; reg d; reg q1, q2;
               always @(posedge clk) begin q1 <= d; q2 <= q1; end
               initial begin clk = 0; forever #5 clk = ~clk; end
               initial begin d = 1; #30 $finish; end
             endmodule",
            Horizon::Time(100),
        );
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(summary, RunSummary { end_time: 30, finished: true });
        assert_eq!(w.value_at("q1", 5).unwrap().to_binary_string(), "1");
        assert_eq!(w.value_at("q2", 5).unwrap().to_binary_string(), "x");
        assert_eq!(w.value_at("q2", 15).unwrap().to_binary_string(), "1");
    }

    #[test]
    fn negedge_process() {
        let (w, ..) = run(
            "module tb;
               reg clk; reg [1:0] n;
               always @(negedge clk) n <= n + 1;
               initial begin n = 0; clk = 1; forever #5 clk = ~clk; end
             endmodule",
            Horizon::Time(20),
        );
        assert_eq!(w.value_at("n", 4).unwrap().to_u64(), Some(0));
        assert_eq!(w.value_at("n", 5).unwrap().to_u64(), Some(1));
        assert_eq!(w.value_at("n", 10).unwrap().to_u64(), Some(1));
        assert_eq!(w.value_at("n", 15).unwrap().to_u64(), Some(2));
    }

    #[test]
    fn combinational_chain_settles_in_one_pass() {
        let (w, ..) = run(
            "module tb;
               reg [3:0] a; wire [3:0] b, c;
               assign c = b + 4'd1;
               assign b = a + 4'd1;
               initial begin a = 0; #10 a = 5; end
             endmodule",
            Horizon::Time(10),
        );
        assert_eq!(w.value_at("c", 0).unwrap().to_u64(), Some(2));
        assert_eq!(w.value_at("c", 10).unwrap().to_u64(), Some(7));
    }

    #[test]
    fn horizon_without_finish_warns() {
        let (w, diags, summary) = run(
            "module tb; reg clk; initial begin clk = 0; forever #5 clk = ~clk; end endmodule",
            Horizon::Time(100),
        );
        assert_eq!(summary, RunSummary { end_time: 100, finished: false });
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, errors::SIM003);
        assert_eq!(w.times().len(), 21);
        assert_eq!(w.history("clk").len(), 21);
    }

    #[test]
    fn runtime_error_disables_process_once() {
        let (_, diags, _) = run(
            "module tb;
               reg clk; reg q;
               always @(posedge clk) #1 q <= 1;
               initial begin clk = 0; forever #5 clk = ~clk; end
             endmodule",
            Horizon::Time(50),
        );
        let failures: Vec<_> = diags.iter().filter(|d| d.code == errors::SIM010).collect();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].message.contains("t=5"));
    }
}
