//! Elaboration of a testbench and its device into flat processes.
//!
//! The testbench is the last module without ports (or the last module if
//! every module has ports). Each of its instances is looked up first in the
//! caller's device unit, then among the other modules of the testbench text.
//! Device ports connected to a plain testbench net alias that net; any other
//! connection gets an internal signal plus a forwarding process.

use crate::config::SimConfig;
use crate::errors;
use crate::evaluator::Scope;
use crate::stimulus::{Schedule, ScheduleBuilder};
use crate::value::{SignalRole, SignalTable, SimSignalId};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use std::collections::BTreeSet;
use vela_analyze::{classify_always, Accesses, ResetBranch};
use vela_common::{BitVec, Ident};
use vela_diagnostics::Diagnostic;
use vela_ir::ProcessKind;
use vela_source::Span;
use vela_verilog_parser::ast::{
    AlwaysBlock, Direction, Edge, Expr, Module, ModuleInstance, ModuleItem, Statement, VarDecl,
    VarKind,
};
use vela_verilog_parser::const_eval::eval_const;
use vela_verilog_parser::ParsedUnit;

/// What a combinational process computes.
#[derive(Debug, Clone, Copy)]
pub(crate) enum CombBody<'a> {
    /// `assign target = value;`
    Assign {
        target: &'a Expr,
        value: &'a Expr,
    },
    /// Body of an `always @*` or level-sensitive block.
    Block(&'a Statement),
    /// Drives a whole signal from an expression: wire initializers and
    /// input ports fed by an expression.
    Drive {
        target: SimSignalId,
        value: &'a Expr,
    },
    /// Copies an internal output-port signal into a testbench select or
    /// concatenation.
    Forward {
        target: &'a Expr,
        source: SimSignalId,
    },
}

#[derive(Debug)]
pub(crate) struct CombProcess<'a> {
    pub scope: usize,
    pub body: CombBody<'a>,
    pub reads: BTreeSet<SimSignalId>,
    pub writes: BTreeSet<SimSignalId>,
    pub span: Span,
    pub enabled: bool,
}

/// Reset branch resolved to a flat signal.
#[derive(Debug)]
pub(crate) struct SeqReset<'a> {
    pub signal: SimSignalId,
    pub branch: ResetBranch<'a>,
}

#[derive(Debug)]
pub(crate) struct SeqProcess<'a> {
    pub scope: usize,
    pub clock: SimSignalId,
    pub edge: Edge,
    pub body: &'a Statement,
    pub reset: Option<SeqReset<'a>>,
    pub writes: BTreeSet<SimSignalId>,
    pub span: Span,
    pub enabled: bool,
}

/// A testbench with its devices flattened into one signal table.
#[derive(Debug)]
pub(crate) struct Design<'a> {
    pub table: SignalTable,
    pub scopes: Vec<Scope<'a>>,
    /// Combinational processes in evaluation order.
    pub comb: Vec<CombProcess<'a>>,
    pub seq: Vec<SeqProcess<'a>>,
    pub schedule: Schedule<'a>,
    pub diagnostics: Vec<Diagnostic>,
    /// Name and name span of the testbench module.
    pub top: Option<(String, Span)>,
}

/// Picks the testbench among the modules of a text.
pub(crate) fn find_testbench(modules: &[Module]) -> Option<&Module> {
    modules
        .iter()
        .rev()
        .find(|m| m.ports.is_empty())
        .or_else(|| modules.last())
}

struct Elaborator<'a, 'c> {
    tb: &'a ParsedUnit,
    device: Option<&'a ParsedUnit>,
    config: &'c SimConfig,
    table: SignalTable,
    scopes: Vec<Scope<'a>>,
    modules: Vec<&'a Module>,
    comb: Vec<CombProcess<'a>>,
    seq: Vec<SeqProcess<'a>>,
    diagnostics: Vec<Diagnostic>,
}

/// Builds the flat design for a testbench text.
pub(crate) fn elaborate<'a>(
    tb: &'a ParsedUnit,
    device: Option<&'a ParsedUnit>,
    config: &SimConfig,
) -> Design<'a> {
    let mut el = Elaborator {
        tb,
        device,
        config,
        table: SignalTable::new(),
        scopes: Vec::new(),
        modules: Vec::new(),
        comb: Vec::new(),
        seq: Vec::new(),
        diagnostics: Vec::new(),
    };
    let Some(top) = find_testbench(&tb.ast.modules) else {
        el.diagnostics
            .push(errors::error_no_testbench(Span::DUMMY).at_position(1, 1));
        return el.into_design(Schedule::default());
    };
    log::debug!("testbench module '{}'", tb.name_of(top.name));

    el.declare_testbench(top);
    for item in &top.items {
        if let ModuleItem::Instance(inst) = item {
            el.instantiate(inst);
        }
    }

    let mut builder = ScheduleBuilder::new(config);
    for index in 0..el.scopes.len() {
        el.collect_processes(index, &mut builder);
    }
    let (schedule, stimulus_diags) = builder.finish();
    el.diagnostics.extend(stimulus_diags);
    el.drop_undriven_clocks(&schedule);
    el.order_comb();
    el.into_design(schedule)
}

impl<'a> Elaborator<'a, '_> {
    fn into_design(self, schedule: Schedule<'a>) -> Design<'a> {
        let top = self
            .modules
            .first()
            .map(|m| (self.tb.name_of(m.name).to_string(), m.name_span));
        Design {
            top,
            table: self.table,
            scopes: self.scopes,
            comb: self.comb,
            seq: self.seq,
            schedule,
            diagnostics: self.diagnostics,
        }
    }

    fn report(&mut self, scope: usize, mut diag: Diagnostic) {
        let unit = self.scopes.get(scope).map_or(self.tb, |s| s.unit);
        diag.resolve_position(&unit.source_db);
        self.diagnostics.push(diag);
    }

    fn declare_testbench(&mut self, top: &'a Module) {
        let mut scope = Scope::new("", self.tb);
        declare_params(&mut scope, &top.params);
        for port in &top.ports {
            let role = if port.is_reg {
                SignalRole::Stimulus
            } else {
                SignalRole::Observed
            };
            let id = self.table.add(self.tb.name_of(port.name), port.width, role);
            scope.signals.insert(port.name, id);
        }
        for item in &top.items {
            let ModuleItem::VarDecl(decl) = item else {
                continue;
            };
            if decl.kind.is_constant() {
                declare_params(&mut scope, std::slice::from_ref(decl));
            } else if !scope.signals.contains_key(&decl.name) {
                let role = match decl.kind {
                    VarKind::Wire => SignalRole::Observed,
                    _ => SignalRole::Stimulus,
                };
                let id = self.table.add(scope.flat_name(decl.name), decl.width, role);
                scope.signals.insert(decl.name, id);
            }
        }
        self.scopes.push(scope);
        self.modules.push(top);
    }

    /// Finds the module behind an instance.
    fn lookup_module(&self, inst: &ModuleInstance) -> Option<(&'a ParsedUnit, &'a Module)> {
        let name = self.tb.name_of(inst.module_name);
        if let Some(device) = self.device {
            if let Some(m) = device.module(name) {
                return Some((device, m));
            }
        }
        let top = self.modules.first().copied();
        self.tb
            .ast
            .modules
            .iter()
            .find(|m| m.name == inst.module_name && !top.is_some_and(|t| std::ptr::eq(t, *m)))
            .map(|m| (self.tb, m))
    }

    fn instantiate(&mut self, inst: &'a ModuleInstance) {
        let module_name = self.tb.name_of(inst.module_name);
        let instance_name = self.tb.name_of(inst.instance_name);
        let found = self
            .lookup_module(inst)
            .filter(|(unit, m)| !m.fatal && !unit.has_fatal());
        let Some((unit, module)) = found else {
            self.report(
                0,
                errors::error_missing_device(module_name, instance_name, inst.span),
            );
            return;
        };
        log::debug!("elaborating {module_name} as '{instance_name}'");

        let mut scope = Scope::new(instance_name, unit);
        declare_params(&mut scope, &module.params);
        for item in &module.items {
            if let ModuleItem::VarDecl(d) = item {
                if d.kind.is_constant() {
                    declare_params(&mut scope, std::slice::from_ref(d));
                }
            }
        }

        let mut port_procs = Vec::new();
        for (position, port) in module.ports.iter().enumerate() {
            let port_name = unit.name_of(port.name);
            let conn = inst.connections.iter().enumerate().find(|(i, c)| match c.port {
                Some(formal) => self.tb.name_of(formal) == port_name,
                None => *i == position,
            });
            let expr = conn.and_then(|(_, c)| c.expr.as_ref());
            let span = conn.map_or(inst.span, |(_, c)| c.span);

            if let Some(Expr::Identifier { name, .. }) = expr {
                if let Some(net) = self.scopes[0].signal(*name) {
                    let net_width = self.table.signal(net).width;
                    if net_width != port.width {
                        self.report(
                            0,
                            errors::warning_width_mismatch(port_name, port.width, net_width, span),
                        );
                    }
                    scope.signals.insert(port.name, net);
                    continue;
                }
            }

            let id = self
                .table
                .add(scope.flat_name(port.name), port.width, SignalRole::Internal);
            scope.signals.insert(port.name, id);
            let Some(expr) = expr else {
                continue;
            };
            let mut missing = None;
            expr.for_each_name(&mut |n| {
                if missing.is_none() && !self.scopes[0].resolves(n) {
                    missing = Some(n);
                }
            });
            if let Some(n) = missing {
                let text = self.tb.name_of(n).to_string();
                self.report(0, errors::error_unresolved_signal(&text, span));
                continue;
            }
            let body = match port.direction {
                Some(Direction::Input) => CombBody::Drive {
                    target: id,
                    value: expr,
                },
                _ => CombBody::Forward {
                    target: expr,
                    source: id,
                },
            };
            port_procs.push((body, span));
        }

        for item in &module.items {
            match item {
                ModuleItem::VarDecl(d) if !d.kind.is_constant() => {
                    if !scope.signals.contains_key(&d.name) {
                        let id = self
                            .table
                            .add(scope.flat_name(d.name), d.width, SignalRole::Internal);
                        scope.signals.insert(d.name, id);
                    }
                }
                ModuleItem::Instance(nested) => {
                    let nested_name =
                        format!("{instance_name}.{}", unit.name_of(nested.instance_name));
                    let mut diag = errors::warning_nested_instance(&nested_name, nested.span);
                    diag.resolve_position(&unit.source_db);
                    self.diagnostics.push(diag);
                }
                _ => {}
            }
        }

        self.scopes.push(scope);
        self.modules.push(module);
        for (body, span) in port_procs {
            self.push_comb(0, body, span);
        }
    }

    /// Creates the processes and stimulus of one scope.
    fn collect_processes(&mut self, index: usize, builder: &mut ScheduleBuilder<'a, '_>) {
        let module = self.modules[index];
        self.apply_initializers(index, module);
        for item in &module.items {
            match item {
                ModuleItem::ContinuousAssign(a) => self.push_comb(
                    index,
                    CombBody::Assign {
                        target: &a.target,
                        value: &a.value,
                    },
                    a.span,
                ),
                ModuleItem::Always(block) if block.sensitivity.is_none() => {
                    builder.add_free_running(index, &self.scopes[index], &block.body, block.span);
                }
                ModuleItem::Always(block) => self.push_always(index, block),
                ModuleItem::Initial(block) => {
                    builder.add_initial(index, &self.scopes[index], &block.body);
                }
                _ => {}
            }
        }
    }

    /// Loads constant `reg` initializers and turns `wire` initializers into
    /// drivers.
    fn apply_initializers(&mut self, index: usize, module: &'a Module) {
        for item in &module.items {
            let ModuleItem::VarDecl(d) = item else {
                continue;
            };
            let (Some(init), false) = (&d.init, d.kind.is_constant()) else {
                continue;
            };
            let Some(id) = self.scopes[index].signal(d.name) else {
                continue;
            };
            if d.kind == VarKind::Wire {
                self.push_comb(
                    index,
                    CombBody::Drive {
                        target: id,
                        value: init,
                    },
                    d.span,
                );
                continue;
            }
            let scope = &self.scopes[index];
            if let Some(v) = eval_const(init, &|n: Ident| scope.params.get(&n).cloned()) {
                let width = self.table.signal(id).width;
                self.table.values_mut()[id.index()] = v.resize(width);
            }
        }
    }

    fn push_always(&mut self, index: usize, block: &'a AlwaysBlock) {
        let shape = classify_always(block);
        if shape.kind != ProcessKind::Sequential {
            self.push_comb(index, CombBody::Block(&block.body), block.span);
            return;
        }
        let scope = &self.scopes[index];
        let edges: Vec<(Ident, Edge)> = block
            .sensitivity
            .iter()
            .flat_map(|s| s.items.iter())
            .filter_map(|item| Some((item.signal.target_name()?, item.edge?)))
            .collect();
        let preferred = edges
            .iter()
            .find(|(name, _)| self.config.is_clock_name(scope.name_of(*name)))
            .copied();
        let clock = preferred.or_else(|| shape.clock.map(|c| (c.signal, c.edge)));
        let Some(clock_id) = clock.and_then(|(name, _)| scope.signal(name)) else {
            let owner = owner_name(scope);
            self.report(index, errors::error_no_clock(&owner, block.span));
            return;
        };
        let edge = clock.map_or(Edge::Posedge, |(_, e)| e);
        let reset = shape
            .reset
            .filter(|r| {
                r.signal != clock.map_or(r.signal, |(n, _)| n)
                    && (edges.iter().any(|(n, _)| *n == r.signal)
                        || self.config.is_reset_name(scope.name_of(r.signal)))
            })
            .and_then(|branch| {
                Some(SeqReset {
                    signal: scope.signal(branch.signal)?,
                    branch,
                })
            });
        let mut access = Accesses::default();
        access.statement(&block.body);
        let writes = access.writes.iter().filter_map(|n| scope.signal(*n)).collect();
        log::trace!(
            "sequential process in '{}' on {edge} {}",
            owner_name(scope),
            self.table.signal(clock_id).name
        );
        self.seq.push(SeqProcess {
            scope: index,
            clock: clock_id,
            edge,
            body: &block.body,
            reset,
            writes,
            span: block.span,
            enabled: true,
        });
    }

    fn push_comb(&mut self, index: usize, body: CombBody<'a>, span: Span) {
        let scope = &self.scopes[index];
        let mut access = Accesses::default();
        let (mut reads, mut writes) = (BTreeSet::new(), BTreeSet::new());
        match body {
            CombBody::Assign { target, value } => {
                access.write(target);
                access.read(value);
            }
            CombBody::Block(stmt) => access.statement(stmt),
            CombBody::Drive { target, value } => {
                access.read(value);
                writes.insert(target);
            }
            CombBody::Forward { target, source } => {
                access.write(target);
                reads.insert(source);
            }
        }
        reads.extend(access.reads.iter().filter_map(|n| scope.signal(*n)));
        writes.extend(access.writes.iter().filter_map(|n| scope.signal(*n)));
        self.comb.push(CombProcess {
            scope: index,
            body,
            reads,
            writes,
            span,
            enabled: true,
        });
    }

    /// Removes sequential processes whose clock nothing drives.
    fn drop_undriven_clocks(&mut self, schedule: &Schedule<'a>) {
        let mut driven: BTreeSet<SimSignalId> = BTreeSet::new();
        for ev in &schedule.events {
            let mut access = Accesses::default();
            access.write(ev.target);
            let scope = &self.scopes[ev.scope];
            driven.extend(access.writes.iter().filter_map(|n| scope.signal(*n)));
        }
        driven.extend(self.comb.iter().flat_map(|p| p.writes.iter().copied()));
        driven.extend(self.seq.iter().flat_map(|p| p.writes.iter().copied()));

        let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut self.seq)
            .into_iter()
            .partition(|p| driven.contains(&p.clock));
        self.seq = kept;
        for p in dropped {
            let owner = owner_name(&self.scopes[p.scope]);
            self.report(p.scope, errors::error_no_clock(&owner, p.span));
        }
    }

    /// Sorts combinational processes so writers run before readers.
    fn order_comb(&mut self) {
        let mut graph = DiGraph::<usize, ()>::new();
        let nodes: Vec<_> = (0..self.comb.len()).map(|i| graph.add_node(i)).collect();
        for (a, pa) in self.comb.iter().enumerate() {
            for (b, pb) in self.comb.iter().enumerate() {
                if a != b && !pa.writes.is_disjoint(&pb.reads) {
                    graph.add_edge(nodes[a], nodes[b], ());
                }
            }
        }
        match toposort(&graph, None) {
            Ok(order) => {
                let mut slots: Vec<Option<CombProcess<'a>>> =
                    std::mem::take(&mut self.comb).into_iter().map(Some).collect();
                self.comb = order
                    .into_iter()
                    .filter_map(|n| slots[graph[n]].take())
                    .collect();
            }
            Err(cycle) => {
                let process = &self.comb[graph[cycle.node_id()]];
                let signal = process
                    .writes
                    .iter()
                    .next()
                    .map_or_else(String::new, |id| self.table.signal(*id).name.clone());
                let (scope, span) = (process.scope, process.span);
                self.report(scope, errors::note_combinational_cycle(&signal, span));
            }
        }
    }
}

/// Evaluates parameter declarations in order, later ones seeing earlier ones.
fn declare_params(scope: &mut Scope<'_>, decls: &[VarDecl]) {
    for decl in decls {
        let value = decl
            .init
            .as_ref()
            .and_then(|e| eval_const(e, &|n: Ident| scope.params.get(&n).cloned()));
        if let Some(v) = value {
            scope.params.insert(decl.name, v);
        } else {
            scope.params.insert(decl.name, BitVec::unknown(decl.width.max(1)));
        }
    }
}

fn owner_name(scope: &Scope<'_>) -> String {
    if scope.path.is_empty() {
        "testbench".to_string()
    } else {
        scope.path.clone()
    }
}
