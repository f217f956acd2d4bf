//! Expression evaluation and statement execution over the signal table.
//!
//! Processes run directly on AST nodes. A [`Scope`] maps the names of one
//! module (testbench or device instance) to flat signals, so the same
//! evaluator serves every module regardless of which parse it came from.
//! Assignments produce [`PendingUpdate`]s; blocking ones are also applied
//! to the value slice immediately so later statements in the same block see
//! them.

use crate::error::SimError;
use crate::value::SimSignalId;
use std::collections::HashMap;
use vela_common::{BitVec, Ident, Logic, MAX_WIDTH};
use vela_verilog_parser::ast::{CaseKind, Expr, Statement};
use vela_verilog_parser::const_eval::{eval_binary, eval_unary};
use vela_verilog_parser::ParsedUnit;

/// Names visible inside one module instance.
#[derive(Debug)]
pub struct Scope<'a> {
    /// Instance path used to prefix internal signal names; empty for the
    /// testbench.
    pub path: String,
    /// Parse the module came from.
    pub unit: &'a ParsedUnit,
    /// Signals by declared name.
    pub signals: HashMap<Ident, SimSignalId>,
    /// Parameter values by name.
    pub params: HashMap<Ident, BitVec>,
}

impl<'a> Scope<'a> {
    /// Creates an empty scope.
    pub fn new(path: impl Into<String>, unit: &'a ParsedUnit) -> Self {
        Self {
            path: path.into(),
            unit,
            signals: HashMap::new(),
            params: HashMap::new(),
        }
    }

    /// Flat signal behind `name`.
    pub fn signal(&self, name: Ident) -> Option<SimSignalId> {
        self.signals.get(&name).copied()
    }

    /// Text of `name` in this scope's interner.
    pub fn name_of(&self, name: Ident) -> &'a str {
        self.unit.name_of(name)
    }

    /// Flat name for a signal declared in this scope.
    pub fn flat_name(&self, name: Ident) -> String {
        if self.path.is_empty() {
            self.name_of(name).to_string()
        } else {
            format!("{}.{}", self.path, self.name_of(name))
        }
    }

    /// `true` if `name` is a signal or parameter here.
    pub fn resolves(&self, name: Ident) -> bool {
        self.signals.contains_key(&name) || self.params.contains_key(&name)
    }

    fn unresolved(&self, name: Ident) -> SimError {
        SimError::UnresolvedSignal {
            name: self.name_of(name).to_string(),
        }
    }
}

/// A write produced by an assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpdate {
    /// Signal written.
    pub target: SimSignalId,
    /// Value written; resized to the target on commit.
    pub value: BitVec,
    /// `(msb, lsb)` for a partial write.
    pub range: Option<(u32, u32)>,
}

impl PendingUpdate {
    /// Writes this update into `values`.
    pub fn apply(&self, values: &mut [BitVec]) {
        let Some(slot) = values.get_mut(self.target.index()) else {
            return;
        };
        match self.range {
            None => *slot = self.value.resize(slot.width()),
            Some((hi, lo)) => slot.write_slice(hi, lo, &self.value.resize(hi.abs_diff(lo) + 1)),
        }
    }
}

/// How a statement finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecResult {
    /// Keep going.
    Continue,
    /// `$finish` or `$stop` ran.
    Finish,
}

/// Read-only view used to evaluate expressions.
pub struct EvalContext<'s, 'a> {
    /// Names of the running module.
    pub scope: &'s Scope<'a>,
    /// Current signal values.
    pub values: &'s [BitVec],
    /// Current simulation time, for `$time`.
    pub time: u64,
}

impl EvalContext<'_, '_> {
    fn read(&self, name: Ident) -> Result<BitVec, SimError> {
        if let Some(v) = self.scope.params.get(&name) {
            return Ok(v.clone());
        }
        let id = self.scope.signal(name).ok_or_else(|| self.scope.unresolved(name))?;
        Ok(self.values[id.index()].clone())
    }

    fn index(&self, expr: &Expr) -> Result<Option<u32>, SimError> {
        Ok(eval_expr(self, expr)?
            .to_u64()
            .and_then(|v| u32::try_from(v).ok()))
    }
}

/// Evaluates an expression.
pub fn eval_expr(ctx: &EvalContext<'_, '_>, expr: &Expr) -> Result<BitVec, SimError> {
    match expr {
        Expr::Number(n) => Ok(n.value.clone()),
        Expr::Identifier { name, .. } => ctx.read(*name),
        Expr::String { value, .. } => {
            let bytes: Vec<BitVec> = value.bytes().map(|b| BitVec::from_u64(b.into(), 8)).collect();
            Ok(BitVec::concat(&bytes))
        }
        Expr::BitSelect { name, index, .. } => {
            let base = ctx.read(*name)?;
            Ok(match ctx.index(index)? {
                Some(i) => BitVec::from_logic(base.bit(i)),
                None => BitVec::unknown(1),
            })
        }
        Expr::RangeSelect { name, msb, lsb, .. } => {
            let base = ctx.read(*name)?;
            match (ctx.index(msb)?, ctx.index(lsb)?) {
                (Some(hi), Some(lo)) => {
                    select_width(hi, lo)?;
                    Ok(base.slice(hi, lo))
                }
                _ => Err(SimError::Unsupported {
                    reason: "part-select with unknown bounds".into(),
                }),
            }
        }
        Expr::Unary { op, operand, .. } => Ok(eval_unary(*op, &eval_expr(ctx, operand)?)),
        Expr::Binary {
            op, left, right, ..
        } => {
            let l = eval_expr(ctx, left)?;
            let r = eval_expr(ctx, right)?;
            Ok(eval_binary(*op, &l, &r))
        }
        Expr::Ternary {
            cond,
            then_expr,
            else_expr,
            ..
        } => match eval_expr(ctx, cond)?.truth() {
            Logic::One => eval_expr(ctx, then_expr),
            Logic::Zero => eval_expr(ctx, else_expr),
            Logic::X | Logic::Z => {
                let t = eval_expr(ctx, then_expr)?;
                let e = eval_expr(ctx, else_expr)?;
                Ok(merge_unknown(&t, &e))
            }
        },
        Expr::Concat { parts, .. } => {
            let values = parts
                .iter()
                .map(|p| eval_expr(ctx, p))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(BitVec::concat(&values))
        }
        Expr::Replicate { count, parts, .. } => {
            let Some(n) = ctx.index(count)? else {
                return Err(SimError::Unsupported {
                    reason: "replication count is unknown".into(),
                });
            };
            let values = parts
                .iter()
                .map(|p| eval_expr(ctx, p))
                .collect::<Result<Vec<_>, _>>()?;
            let value = BitVec::concat(&values);
            let width = u64::from(value.width()) * u64::from(n);
            value.replicate(n).ok_or(SimError::WidthLimit { width })
        }
        Expr::SystemCall { name, args, .. } => match ctx.scope.name_of(*name) {
            "$time" | "$stime" | "$realtime" => Ok(BitVec::from_u64(ctx.time, 64)),
            "$signed" | "$unsigned" if args.len() == 1 => eval_expr(ctx, &args[0]),
            other => Err(SimError::Unsupported {
                reason: format!("system function {other}"),
            }),
        },
        Expr::Error(_) => Err(SimError::Unsupported {
            reason: "malformed expression".into(),
        }),
    }
}

/// Bitwise join of the two arms of a ternary with an unknown condition.
fn merge_unknown(a: &BitVec, b: &BitVec) -> BitVec {
    let width = a.width().max(b.width());
    let (a, b) = (a.resize(width), b.resize(width));
    let mut out = BitVec::unknown(width);
    for i in 0..width {
        if a.bit(i) == b.bit(i) {
            out.set_bit(i, a.bit(i));
        }
    }
    out
}

/// Width of an assignment target.
fn target_width(ctx: &EvalContext<'_, '_>, target: &Expr) -> Result<u32, SimError> {
    match target {
        Expr::Identifier { name, .. } => {
            let id = ctx.scope.signal(*name).ok_or_else(|| ctx.scope.unresolved(*name))?;
            Ok(ctx.values[id.index()].width())
        }
        Expr::BitSelect { .. } => Ok(1),
        Expr::RangeSelect { msb, lsb, .. } => match (ctx.index(msb)?, ctx.index(lsb)?) {
            (Some(hi), Some(lo)) => select_width(hi, lo),
            _ => Err(SimError::InvalidTarget {
                reason: "part-select with unknown bounds".into(),
            }),
        },
        Expr::Concat { parts, .. } => parts.iter().map(|p| target_width(ctx, p)).sum(),
        _ => Err(SimError::InvalidTarget {
            reason: "expression is not assignable".into(),
        }),
    }
}

/// Width of `[hi:lo]`, refusing selects wider than [`MAX_WIDTH`].
fn select_width(hi: u32, lo: u32) -> Result<u32, SimError> {
    let width = u64::from(hi.abs_diff(lo)) + 1;
    u32::try_from(width)
        .ok()
        .filter(|w| *w <= MAX_WIDTH)
        .ok_or(SimError::WidthLimit { width })
}

/// Turns `target = value` into updates. A bit-select with an unknown index
/// writes nothing.
pub fn resolve_target(
    ctx: &EvalContext<'_, '_>,
    target: &Expr,
    value: &BitVec,
) -> Result<Vec<PendingUpdate>, SimError> {
    let signal = |name: Ident| ctx.scope.signal(name).ok_or_else(|| ctx.scope.unresolved(name));
    match target {
        Expr::Identifier { name, .. } => Ok(vec![PendingUpdate {
            target: signal(*name)?,
            value: value.clone(),
            range: None,
        }]),
        Expr::BitSelect { name, index, .. } => {
            let target = signal(*name)?;
            Ok(ctx
                .index(index)?
                .map(|i| PendingUpdate {
                    target,
                    value: value.resize(1),
                    range: Some((i, i)),
                })
                .into_iter()
                .collect())
        }
        Expr::RangeSelect { name, msb, lsb, .. } => {
            let target = signal(*name)?;
            let (Some(hi), Some(lo)) = (ctx.index(msb)?, ctx.index(lsb)?) else {
                return Err(SimError::InvalidTarget {
                    reason: "part-select with unknown bounds".into(),
                });
            };
            select_width(hi, lo)?;
            Ok(vec![PendingUpdate {
                target,
                value: value.clone(),
                range: Some((hi, lo)),
            }])
        }
        Expr::Concat { parts, .. } => {
            let total = target_width(ctx, target)?;
            let value = value.resize(total);
            let mut updates = Vec::new();
            let mut offset = 0u32;
            for part in parts.iter().rev() {
                let width = target_width(ctx, part)?;
                let piece = value.slice(offset + width - 1, offset);
                updates.extend(resolve_target(ctx, part, &piece)?);
                offset += width;
            }
            Ok(updates)
        }
        _ => Err(SimError::InvalidTarget {
            reason: "expression is not assignable".into(),
        }),
    }
}

fn case_matches(kind: CaseKind, subject: &BitVec, label: &BitVec) -> bool {
    let width = subject.width().max(label.width());
    let (s, l) = (subject.resize(width), label.resize(width));
    (0..width).all(|i| {
        let (a, b) = (s.bit(i), l.bit(i));
        match kind {
            CaseKind::Case => a == b,
            CaseKind::Casez => a == Logic::Z || b == Logic::Z || a == b,
            CaseKind::Casex => !a.is_known() || !b.is_known() || a == b,
        }
    })
}

/// Runs a statement of an `always` block or a reset branch.
///
/// Blocking writes land in `values` at once and in `pending`; non-blocking
/// writes only in `pending`. Delays and event controls are rejected.
pub fn exec_statement(
    scope: &Scope<'_>,
    values: &mut [BitVec],
    time: u64,
    stmt: &Statement,
    pending: &mut Vec<PendingUpdate>,
) -> Result<ExecResult, SimError> {
    match stmt {
        Statement::Assign(a) => {
            let updates = {
                let ctx = EvalContext { scope, values, time };
                let value = eval_expr(&ctx, &a.value)?;
                resolve_target(&ctx, &a.target, &value)?
            };
            if a.blocking {
                updates.iter().for_each(|u| u.apply(values));
            }
            pending.extend(updates);
            Ok(ExecResult::Continue)
        }
        Statement::If(s) => {
            let cond = eval_expr(&EvalContext { scope, values, time }, &s.cond)?;
            if cond.truth() == Logic::One {
                exec_statement(scope, values, time, &s.then_branch, pending)
            } else if let Some(e) = &s.else_branch {
                exec_statement(scope, values, time, e, pending)
            } else {
                Ok(ExecResult::Continue)
            }
        }
        Statement::Case(c) => {
            let selected = {
                let ctx = EvalContext { scope, values, time };
                let subject = eval_expr(&ctx, &c.expr)?;
                let mut selected = None;
                'arms: for arm in &c.arms {
                    for label in &arm.labels {
                        if case_matches(c.kind, &subject, &eval_expr(&ctx, label)?) {
                            selected = Some(&arm.body);
                            break 'arms;
                        }
                    }
                }
                selected.or(c.default.as_deref())
            };
            match selected {
                Some(body) => exec_statement(scope, values, time, body, pending),
                None => Ok(ExecResult::Continue),
            }
        }
        Statement::Block(b) => {
            for s in &b.stmts {
                if exec_statement(scope, values, time, s, pending)? == ExecResult::Finish {
                    return Ok(ExecResult::Finish);
                }
            }
            Ok(ExecResult::Continue)
        }
        Statement::SystemTask(t) => match scope.name_of(t.name) {
            "$finish" | "$stop" => Ok(ExecResult::Finish),
            _ => Ok(ExecResult::Continue),
        },
        Statement::Null(_) | Statement::Error(_) => Ok(ExecResult::Continue),
        Statement::Delay(_) => Err(SimError::Unsupported {
            reason: "delay control inside an always block".into(),
        }),
        Statement::Forever(_) => Err(SimError::Unsupported {
            reason: "forever inside an always block".into(),
        }),
        Statement::EventControl(_) => Err(SimError::Unsupported {
            reason: "event control inside an always block".into(),
        }),
    }
}
