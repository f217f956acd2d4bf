//! AST module → [`ModuleAnalysis`].
//!
//! One traversal per module. Statement counting, operator counting and
//! nesting depth are gathered by the same walk, so the three metrics always
//! describe the same tree.

use crate::process::{classify_always, Accesses};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use vela_common::Ident;
use vela_ir::{
    complexity_score, ConnectionInfo, Edge, InstanceInfo, ModuleAnalysis, ModuleStatistics,
    PortDirection, PortInfo, ProcessKind, ProcessSummary, SignalInfo, SignalKind,
};
use vela_verilog_parser::ast::{self, Direction, Expr, Module, ModuleItem, Statement, VarKind};
use vela_verilog_parser::ParsedUnit;

/// Builds the analysis record for one parsed module.
pub fn analyze_module(module: &Module, unit: &ParsedUnit) -> ModuleAnalysis {
    let mut walker = Walker::new(unit);
    walker.module(module);
    let statistics = walker.statistics(module);
    let occurrences = walker.operators.values().sum();
    let score = complexity_score(
        &statistics,
        walker.statements,
        occurrences,
        walker.operators.len(),
        walker.max_depth,
    );
    log::trace!(
        "analyzed '{}': {} statements, score {score}",
        unit.name_of(module.name),
        walker.statements
    );
    ModuleAnalysis {
        name: unit.name_of(module.name).to_string(),
        ports: module.ports.iter().map(|p| port_info(p, unit)).collect(),
        signals: signals(module, unit),
        statistics,
        statement_count: walker.statements,
        operator_counts: walker.operators,
        max_nesting_depth: walker.max_depth,
        complexity_score: score,
        instances: walker.instances,
        processes: walker.processes,
    }
}

fn direction(dir: Option<Direction>) -> PortDirection {
    match dir {
        Some(Direction::Input) => PortDirection::Input,
        Some(Direction::Output) => PortDirection::Output,
        Some(Direction::Inout) | None => PortDirection::Inout,
    }
}

fn port_info(port: &ast::PortDecl, unit: &ParsedUnit) -> PortInfo {
    PortInfo {
        name: unit.name_of(port.name).to_string(),
        width: port.width,
        direction: direction(port.direction),
        is_reg: port.is_reg,
    }
}

fn port_names(module: &Module) -> HashSet<Ident> {
    module.ports.iter().map(|p| p.name).collect()
}

/// Ports, then header parameters, then body declarations that are not
/// completions of a port.
fn signals(module: &Module, unit: &ParsedUnit) -> Vec<SignalInfo> {
    let ports = port_names(module);
    let mut out: Vec<SignalInfo> = module
        .ports
        .iter()
        .map(|p| SignalInfo {
            name: unit.name_of(p.name).to_string(),
            width: p.width,
            kind: SignalKind::Port,
        })
        .collect();
    let decls = module.params.iter().chain(module.items.iter().filter_map(|i| match i {
        ModuleItem::VarDecl(d) => Some(d),
        _ => None,
    }));
    for decl in decls {
        if ports.contains(&decl.name) {
            continue;
        }
        let kind = match decl.kind {
            VarKind::Wire => SignalKind::Wire,
            VarKind::Reg => SignalKind::Reg,
            VarKind::Integer => SignalKind::Integer,
            VarKind::Parameter | VarKind::Localparam => SignalKind::Parameter,
        };
        out.push(SignalInfo {
            name: unit.name_of(decl.name).to_string(),
            width: decl.width,
            kind,
        });
    }
    out
}

struct Walker<'a> {
    unit: &'a ParsedUnit,
    statements: usize,
    operators: BTreeMap<String, usize>,
    max_depth: u32,
    instances: Vec<InstanceInfo>,
    processes: Vec<ProcessSummary>,
}

impl<'a> Walker<'a> {
    fn new(unit: &'a ParsedUnit) -> Self {
        Self {
            unit,
            statements: 0,
            operators: BTreeMap::new(),
            max_depth: 0,
            instances: Vec::new(),
            processes: Vec::new(),
        }
    }

    fn statistics(&self, module: &Module) -> ModuleStatistics {
        let ports = port_names(module);
        let mut stats = ModuleStatistics {
            ports: module.ports.len(),
            regs: module.ports.iter().filter(|p| p.is_reg).count(),
            parameters: module.params.len(),
            ..Default::default()
        };
        for item in &module.items {
            match item {
                ModuleItem::VarDecl(d) => match d.kind {
                    VarKind::Parameter | VarKind::Localparam => stats.parameters += 1,
                    _ if ports.contains(&d.name) => {}
                    VarKind::Wire => stats.wires += 1,
                    VarKind::Reg | VarKind::Integer => stats.regs += 1,
                },
                ModuleItem::ContinuousAssign(_) => stats.assigns += 1,
                ModuleItem::Always(_) => stats.always_blocks += 1,
                ModuleItem::Initial(_) => stats.initial_blocks += 1,
                ModuleItem::Instance(_) => stats.instances += 1,
                ModuleItem::PortDecl(_) | ModuleItem::Error(_) => {}
            }
        }
        stats
    }

    fn module(&mut self, module: &Module) {
        for item in &module.items {
            match item {
                ModuleItem::ContinuousAssign(a) => {
                    self.statements += 1;
                    self.expr(&a.target);
                    self.expr(&a.value);
                }
                ModuleItem::Always(block) => {
                    if let Some(sens) = &block.sensitivity {
                        sens.items.iter().for_each(|i| self.expr(&i.signal));
                    }
                    self.statement(&block.body, 1);
                    self.always_summary(block);
                }
                ModuleItem::Initial(block) => {
                    self.statement(&block.body, 1);
                    self.process_summary(ProcessKind::Initial, None, &block.body, None);
                }
                ModuleItem::Instance(inst) => self.instance(inst),
                ModuleItem::PortDecl(_) | ModuleItem::VarDecl(_) | ModuleItem::Error(_) => {}
            }
        }
    }

    fn always_summary(&mut self, block: &ast::AlwaysBlock) {
        let shape = classify_always(block);
        let clock = shape.clock.map(|c| {
            let edge = match c.edge {
                ast::Edge::Posedge => Edge::Posedge,
                ast::Edge::Negedge => Edge::Negedge,
            };
            (c.signal, edge)
        });
        self.process_summary(shape.kind, clock, &block.body, block.sensitivity.as_ref());
    }

    fn process_summary(
        &mut self,
        kind: ProcessKind,
        clock: Option<(Ident, Edge)>,
        body: &Statement,
        sensitivity: Option<&ast::SensitivityList>,
    ) {
        let mut acc = Accesses::default();
        if let Some(sens) = sensitivity {
            sens.items.iter().for_each(|i| acc.read(&i.signal));
        }
        acc.statement(body);
        let sorted = |set: &BTreeSet<Ident>| {
            let names: BTreeSet<String> =
                set.iter().map(|n| self.unit.name_of(*n).to_string()).collect();
            names.into_iter().collect::<Vec<_>>()
        };
        let summary = ProcessSummary {
            kind,
            clock: clock.map(|(c, _)| self.unit.name_of(c).to_string()),
            edge: clock.map(|(_, e)| e),
            reads: sorted(&acc.reads),
            writes: sorted(&acc.writes),
        };
        self.processes.push(summary);
    }

    fn instance(&mut self, inst: &ast::ModuleInstance) {
        let connections = inst
            .connections
            .iter()
            .map(|c| ConnectionInfo {
                port: c.port.map(|p| self.unit.name_of(p).to_string()),
                signal: c
                    .expr
                    .as_ref()
                    .map(|e| self.unit.source_db.snippet(e.span()).to_string()),
            })
            .collect();
        self.instances.push(InstanceInfo {
            module: self.unit.name_of(inst.module_name).to_string(),
            name: self.unit.name_of(inst.instance_name).to_string(),
            connections,
        });
    }

    fn count_op(&mut self, symbol: &str) {
        *self.operators.entry(symbol.to_string()).or_insert(0) += 1;
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Unary { op, operand, .. } => {
                self.count_op(op.symbol());
                self.expr(operand);
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                self.count_op(op.symbol());
                self.expr(left);
                self.expr(right);
            }
            Expr::Ternary {
                cond,
                then_expr,
                else_expr,
                ..
            } => {
                self.count_op("?:");
                self.expr(cond);
                self.expr(then_expr);
                self.expr(else_expr);
            }
            Expr::BitSelect { index, .. } => self.expr(index),
            Expr::RangeSelect { msb, lsb, .. } => {
                self.expr(msb);
                self.expr(lsb);
            }
            Expr::Concat { parts, .. } => parts.iter().for_each(|p| self.expr(p)),
            Expr::Replicate { count, parts, .. } => {
                self.expr(count);
                parts.iter().for_each(|p| self.expr(p));
            }
            Expr::SystemCall { args, .. } => args.iter().for_each(|a| self.expr(a)),
            Expr::Identifier { .. } | Expr::Number(_) | Expr::String { .. } | Expr::Error(_) => {}
        }
    }

    fn statement(&mut self, stmt: &Statement, depth: u32) {
        if matches!(stmt, Statement::Error(_)) {
            return;
        }
        self.statements += 1;
        self.max_depth = self.max_depth.max(depth);
        let inner = depth + 1;
        match stmt {
            Statement::Assign(a) => {
                self.expr(&a.target);
                self.expr(&a.value);
            }
            Statement::If(s) => {
                self.expr(&s.cond);
                self.statement(&s.then_branch, inner);
                if let Some(e) = &s.else_branch {
                    self.statement(e, inner);
                }
            }
            Statement::Case(c) => {
                self.expr(&c.expr);
                for arm in &c.arms {
                    self.statements += 1;
                    arm.labels.iter().for_each(|l| self.expr(l));
                    self.statement(&arm.body, inner);
                }
                if let Some(d) = &c.default {
                    self.statements += 1;
                    self.statement(d, inner);
                }
            }
            Statement::Block(b) => b.stmts.iter().for_each(|s| self.statement(s, inner)),
            Statement::Delay(d) => {
                self.expr(&d.delay);
                self.statement(&d.body, inner);
            }
            Statement::Forever(f) => self.statement(&f.body, inner),
            Statement::EventControl(e) => {
                e.sensitivity.items.iter().for_each(|i| self.expr(&i.signal));
                self.statement(&e.body, inner);
            }
            Statement::SystemTask(t) => t.args.iter().for_each(|a| self.expr(a)),
            Statement::Null(_) | Statement::Error(_) => {}
        }
    }
}
