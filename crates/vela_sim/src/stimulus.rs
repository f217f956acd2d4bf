//! Stimulus schedules built from `initial` blocks.
//!
//! An `initial` block is walked once with a running time cursor. Each
//! assignment becomes a [`Stimulus`] at the cursor's time; `#N` moves the
//! cursor. A `forever` loop is walked once to measure its period and its
//! events are then replicated until the horizon. Values are not computed
//! here: the kernel evaluates each event's right-hand side when it fires,
//! so `clk = ~clk` toggles the live value.

use crate::config::SimConfig;
use crate::errors;
use crate::evaluator::Scope;
use vela_common::Ident;
use vela_diagnostics::Diagnostic;
use vela_source::Span;
use vela_verilog_parser::ast::{Expr, Statement};
use vela_verilog_parser::const_eval::eval_const;

/// One timed assignment.
#[derive(Debug, Clone, Copy)]
pub struct Stimulus<'a> {
    /// When the assignment fires.
    pub time: u64,
    /// Index of the scope the assignment belongs to.
    pub scope: usize,
    /// Left-hand side.
    pub target: &'a Expr,
    /// Right-hand side, evaluated when the event fires.
    pub value: &'a Expr,
    /// Source span of the assignment.
    pub span: Span,
}

/// All stimulus of a run, ordered by time.
#[derive(Debug, Default)]
pub struct Schedule<'a> {
    /// Events sorted by time; events at the same time keep source order.
    pub events: Vec<Stimulus<'a>>,
    /// Earliest time a `$finish` or `$stop` is reached.
    pub finish: Option<u64>,
    /// `true` if the horizon cut off events or a later `$finish`.
    pub truncated: bool,
}

enum Flow {
    Next(u64),
    Stop,
}

/// Collects stimulus from several blocks.
pub struct ScheduleBuilder<'a, 'c> {
    config: &'c SimConfig,
    events: Vec<Stimulus<'a>>,
    finish: Option<u64>,
    truncated: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'a, 'c> ScheduleBuilder<'a, 'c> {
    /// Creates an empty builder.
    pub fn new(config: &'c SimConfig) -> Self {
        Self {
            config,
            events: Vec::new(),
            finish: None,
            truncated: false,
            diagnostics: Vec::new(),
        }
    }

    /// Walks the body of an `initial` block.
    pub fn add_initial(&mut self, scope_index: usize, scope: &Scope<'_>, body: &'a Statement) {
        let mut walker = Walker {
            builder: self,
            scope_index,
            scope,
        };
        walker.walk(body, 0);
    }

    /// Walks an `always` block without an event control, which repeats its
    /// body like `forever`.
    pub fn add_free_running(
        &mut self,
        scope_index: usize,
        scope: &Scope<'_>,
        body: &'a Statement,
        span: Span,
    ) {
        let mut walker = Walker {
            builder: self,
            scope_index,
            scope,
        };
        walker.repeat(body, 0, span);
    }

    /// Sorts the collected events and applies the horizon.
    pub fn finish(mut self) -> (Schedule<'a>, Vec<Diagnostic>) {
        self.events.sort_by_key(|e| e.time);
        if let Some(limit) = self.config.time_limit() {
            let before = self.events.len();
            self.events.retain(|e| e.time <= limit);
            if self.events.len() < before {
                self.truncated = true;
            }
            if self.finish.is_some_and(|f| f > limit) {
                self.finish = None;
                self.truncated = true;
            }
        }
        let limit = self.config.event_limit();
        if self.events.len() > limit {
            self.events.truncate(limit);
            self.truncated = true;
        }
        if let (Some(f), Some(last)) = (self.finish, self.events.last()) {
            if self.truncated && f > last.time && self.config.time_limit().is_none() {
                self.finish = None;
            }
        }
        log::debug!(
            "scheduled {} stimulus events, finish {:?}",
            self.events.len(),
            self.finish
        );
        (
            Schedule {
                events: self.events,
                finish: self.finish,
                truncated: self.truncated,
            },
            self.diagnostics,
        )
    }
}

struct Walker<'w, 'a, 'c, 's> {
    builder: &'w mut ScheduleBuilder<'a, 'c>,
    scope_index: usize,
    scope: &'s Scope<'s>,
}

impl<'a> Walker<'_, 'a, '_, '_> {
    fn report(&mut self, mut diag: Diagnostic) {
        diag.resolve_position(&self.scope.unit.source_db);
        self.builder.diagnostics.push(diag);
    }

    fn walk(&mut self, stmt: &'a Statement, time: u64) -> Flow {
        match stmt {
            Statement::Assign(a) => {
                let mut missing = None;
                let mut check = |name| {
                    if missing.is_none() && !self.scope.resolves(name) {
                        missing = Some(name);
                    }
                };
                a.target.for_each_name(&mut check);
                a.value.for_each_name(&mut check);
                match missing {
                    Some(name) => {
                        let name = self.scope.name_of(name).to_string();
                        self.report(errors::error_unresolved_signal(&name, a.span));
                    }
                    None => {
                        log::trace!("stimulus at t={time} in scope {}", self.scope_index);
                        self.builder.events.push(Stimulus {
                            time,
                            scope: self.scope_index,
                            target: &a.target,
                            value: &a.value,
                            span: a.span,
                        });
                    }
                }
                Flow::Next(time)
            }
            Statement::Delay(d) => {
                let lookup = |n: Ident| self.scope.params.get(&n).cloned();
                let amount = eval_const(&d.delay, &lookup).and_then(|v| v.to_u64());
                let amount = match amount {
                    Some(a) => a,
                    None => {
                        self.report(errors::error_delay_not_constant(d.delay.span()));
                        0
                    }
                };
                self.walk(&d.body, time.saturating_add(amount))
            }
            Statement::Block(b) => {
                let mut t = time;
                for s in &b.stmts {
                    match self.walk(s, t) {
                        Flow::Next(next) => t = next,
                        Flow::Stop => return Flow::Stop,
                    }
                }
                Flow::Next(t)
            }
            Statement::Forever(f) => self.repeat(&f.body, time, f.span),
            Statement::SystemTask(t) => match self.scope.name_of(t.name) {
                "$finish" | "$stop" => {
                    let finish = self.builder.finish.map_or(time, |f| f.min(time));
                    self.builder.finish = Some(finish);
                    Flow::Stop
                }
                _ => Flow::Next(time),
            },
            Statement::EventControl(e) => {
                self.report(errors::warning_skipped("event control", e.span));
                Flow::Next(time)
            }
            Statement::If(s) => {
                self.report(errors::warning_skipped("if statement", s.span));
                Flow::Next(time)
            }
            Statement::Case(s) => {
                self.report(errors::warning_skipped("case statement", s.span));
                Flow::Next(time)
            }
            Statement::Null(_) | Statement::Error(_) => Flow::Next(time),
        }
    }

    /// Walks `body` once from `start`, then replicates its events with the
    /// measured period until the horizon. Never returns [`Flow::Next`].
    fn repeat(&mut self, body: &'a Statement, start: u64, span: Span) -> Flow {
        let first = self.builder.events.len();
        let end = match self.walk(body, start) {
            Flow::Next(end) => end,
            Flow::Stop => return Flow::Stop,
        };
        let period = end - start;
        if period == 0 {
            self.report(errors::error_zero_delay_forever(span));
            return Flow::Stop;
        }
        let iteration: Vec<Stimulus<'a>> = self.builder.events[first..].to_vec();
        if iteration.is_empty() {
            return Flow::Stop;
        }
        let time_limit = self.builder.config.time_limit();
        let event_limit = self.builder.config.event_limit();
        let mut added = iteration.len();
        let mut shift = period;
        'outer: loop {
            for ev in &iteration {
                let time = ev.time.saturating_add(shift);
                if time_limit.is_some_and(|limit| time > limit) || added >= event_limit {
                    self.builder.truncated = true;
                    break 'outer;
                }
                self.builder.events.push(Stimulus { time, ..*ev });
                added += 1;
            }
            shift = shift.saturating_add(period);
        }
        log::trace!("forever loop with period {period} produced {added} events");
        Flow::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Horizon;
    use crate::value::SimSignalId;
    use vela_diagnostics::Severity;
    use vela_verilog_parser::ast::ModuleItem;
    use vela_verilog_parser::{parse_source, ParsedUnit};

    fn scope_of(unit: &ParsedUnit) -> Scope<'_> {
        let mut scope = Scope::new("", unit);
        for item in &unit.ast.modules[0].items {
            if let ModuleItem::VarDecl(d) = item {
                if d.kind.is_constant() {
                    let v = d.init.as_ref().and_then(|e| eval_const(e, &|_| None)).unwrap();
                    scope.params.insert(d.name, v);
                } else {
                    let id = SimSignalId::from_raw(scope.signals.len() as u32);
                    scope.signals.insert(d.name, id);
                }
            }
        }
        scope
    }

    fn schedule(text: &str, horizon: Horizon) -> (Vec<u64>, Option<u64>, bool, Vec<Diagnostic>) {
        let unit = parse_source(text);
        let scope = scope_of(&unit);
        let config = SimConfig::with_horizon(horizon);
        let mut builder = ScheduleBuilder::new(&config);
        for item in &unit.ast.modules[0].items {
            match item {
                ModuleItem::Initial(b) => builder.add_initial(0, &scope, &b.body),
                ModuleItem::Always(a) if a.sensitivity.is_none() => {
                    builder.add_free_running(0, &scope, &a.body, a.span)
                }
                _ => {}
            }
        }
        let (s, diags) = builder.finish();
        (
            s.events.iter().map(|e| e.time).collect(),
            s.finish,
            s.truncated,
            diags,
        )
    }

    #[test]
    fn clock_toggles_until_horizon() {
        let (times, finish, truncated, diags) = schedule(
            "module tb; reg clk; initial begin clk = 0; forever #5 clk = ~clk; end endmodule",
            Horizon::Time(100),
        );
        assert!(diags.is_empty(), "{diags:?}");
        let toggles: Vec<u64> = (1..=20).map(|k| k * 5).collect();
        assert_eq!(times[0], 0);
        assert_eq!(times[1..].to_vec(), toggles);
        assert_eq!(finish, None);
        assert!(truncated);
    }

    #[test]
    fn sequential_delays_accumulate() {
        let (times, finish, truncated, _) = schedule(
            "module tb; reg reset; reg [3:0] d;
               initial begin
                 reset = 1; d = 0;
                 #15 reset = 0;
                 #10 d = 4'd3;
                 #20 $finish;
               end
             endmodule",
            Horizon::Time(1000),
        );
        assert_eq!(times, vec![0, 0, 15, 25]);
        assert_eq!(finish, Some(45));
        assert!(!truncated);
    }

    #[test]
    fn parameter_delay() {
        let (times, ..) = schedule(
            "module tb; reg a; parameter HALF = 7;
               initial begin a = 0; #HALF a = 1; end
             endmodule",
            Horizon::Time(100),
        );
        assert_eq!(times, vec![0, 7]);
    }

    #[test]
    fn event_horizon_keeps_earliest() {
        let (times, _, truncated, _) = schedule(
            "module tb; reg clk; reg en;
               initial begin clk = 0; forever #5 clk = ~clk; end
               initial begin en = 0; #12 en = 1; end
             endmodule",
            Horizon::Events(5),
        );
        assert_eq!(times, vec![0, 0, 5, 10, 12]);
        assert!(truncated);
    }

    #[test]
    fn free_running_always() {
        let (times, ..) = schedule(
            "module tb; reg clk; initial clk = 0; always #10 clk = ~clk; endmodule",
            Horizon::Time(40),
        );
        assert_eq!(times, vec![0, 10, 20, 30, 40]);
    }

    #[test]
    fn zero_delay_forever_is_reported() {
        let (_, _, _, diags) = schedule(
            "module tb; reg a; initial forever a = ~a; endmodule",
            Horizon::Time(10),
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, errors::SIM007);
    }

    #[test]
    fn unresolved_target_is_skipped() {
        let (times, _, _, diags) = schedule(
            "module tb; reg a; initial begin a = 0; #5 b = 1; end endmodule",
            Horizon::Time(10),
        );
        assert_eq!(times, vec![0]);
        assert_eq!(diags[0].code, errors::SIM001);
        assert!(diags[0].message.contains("'b'"));
        assert_eq!(diags[0].line, 1);
    }

    #[test]
    fn event_control_is_skipped_with_warning() {
        let (times, _, _, diags) = schedule(
            "module tb; reg a; reg clk;
               initial begin a = 0; @(posedge clk) a = 1; #5 a = 0; end
             endmodule",
            Horizon::Time(10),
        );
        assert_eq!(times, vec![0, 5]);
        assert_eq!(diags[0].code, errors::SIM004);
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn finish_past_horizon_is_dropped() {
        let (times, finish, truncated, _) = schedule(
            "module tb; reg a; initial begin a = 0; #5 a = 1; #100 $finish; end endmodule",
            Horizon::Time(50),
        );
        assert_eq!(times, vec![0, 5]);
        assert_eq!(finish, None);
        assert!(truncated);
    }

    #[test]
    fn earliest_finish_wins() {
        let (_, finish, ..) = schedule(
            "module tb; reg a;
               initial #50 $finish;
               initial begin a = 0; #20 $stop; end
             endmodule",
            Horizon::Time(100),
        );
        assert_eq!(finish, Some(20));
    }
}
