//! Classification of procedural blocks.
//!
//! Shared by IR generation and the simulator: both need to know whether an
//! `always` block is combinational or clocked, which signal clocks it, and
//! whether its body opens with a reset branch.

use std::collections::BTreeSet;
use vela_common::{Ident, Logic};
use vela_ir::ProcessKind;
use vela_verilog_parser::ast::{AlwaysBlock, BinaryOp, Edge, Expr, Statement, UnaryOp};

/// Clock signal and edge of a sequential block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockEdge {
    /// Clock signal.
    pub signal: Ident,
    /// Triggering edge.
    pub edge: Edge,
}

/// An outer `if` on a reset signal whose taken branch only loads constants.
#[derive(Debug, Clone, Copy)]
pub struct ResetBranch<'a> {
    /// Reset signal.
    pub signal: Ident,
    /// `true` for `if (rst)`, `false` for `if (!rst_n)`.
    pub active_high: bool,
    /// Statements run while reset is asserted.
    pub asserted: &'a Statement,
    /// Statements run otherwise.
    pub otherwise: Option<&'a Statement>,
}

impl ResetBranch<'_> {
    /// `true` if `value` asserts this reset.
    pub fn is_asserted(&self, value: Logic) -> bool {
        match value {
            Logic::One => self.active_high,
            Logic::Zero => !self.active_high,
            Logic::X | Logic::Z => false,
        }
    }
}

/// How an `always` block behaves.
#[derive(Debug, Clone, Copy)]
pub struct ProcessShape<'a> {
    /// Combinational or sequential.
    pub kind: ProcessKind,
    /// Clock of a sequential block.
    pub clock: Option<ClockEdge>,
    /// Reset branch, if the body opens with one.
    pub reset: Option<ResetBranch<'a>>,
}

/// Classifies an `always` block.
///
/// Blocks with at least one edge term are sequential. The clock is the first
/// edge term that is not the reset signal.
pub fn classify_always(block: &AlwaysBlock) -> ProcessShape<'_> {
    let reset = detect_reset(&block.body);
    let edges: Vec<ClockEdge> = block
        .sensitivity
        .iter()
        .flat_map(|s| s.items.iter())
        .filter_map(|item| {
            Some(ClockEdge {
                signal: item.signal.target_name()?,
                edge: item.edge?,
            })
        })
        .collect();
    if edges.is_empty() {
        return ProcessShape {
            kind: ProcessKind::Combinational,
            clock: None,
            reset: None,
        };
    }
    let reset_signal = reset.map(|r| r.signal);
    let clock = edges
        .iter()
        .find(|e| Some(e.signal) != reset_signal)
        .or_else(|| edges.first())
        .copied();
    ProcessShape {
        kind: ProcessKind::Sequential,
        clock,
        reset,
    }
}

/// Recognizes `if (rst)`, `if (!rst_n)`, `if (~rst_n)`, `if (rst_n == 0)` and
/// `if (rst == 1)` at the top of `body`, when the taken branch assigns only
/// constants.
pub fn detect_reset(body: &Statement) -> Option<ResetBranch<'_>> {
    let stmt = match body {
        Statement::Block(b) if b.stmts.len() == 1 => &b.stmts[0],
        other => other,
    };
    let Statement::If(if_stmt) = stmt else {
        return None;
    };
    let (signal, active_high) = reset_condition(&if_stmt.cond)?;
    if !loads_only_constants(&if_stmt.then_branch) {
        return None;
    }
    Some(ResetBranch {
        signal,
        active_high,
        asserted: &if_stmt.then_branch,
        otherwise: if_stmt.else_branch.as_deref(),
    })
}

fn reset_condition(cond: &Expr) -> Option<(Ident, bool)> {
    match cond {
        Expr::Identifier { name, .. } => Some((*name, true)),
        Expr::Unary {
            op: UnaryOp::LogicalNot | UnaryOp::BitNot,
            operand,
            ..
        } => match operand.as_ref() {
            Expr::Identifier { name, .. } => Some((*name, false)),
            _ => None,
        },
        Expr::Binary {
            op: op @ (BinaryOp::Eq | BinaryOp::Neq),
            left,
            right,
            ..
        } => {
            let (Expr::Identifier { name, .. }, Expr::Number(n)) = (left.as_ref(), right.as_ref())
            else {
                return None;
            };
            let one = match n.value.to_u64()? {
                0 => false,
                1 => true,
                _ => return None,
            };
            Some((*name, one == (*op == BinaryOp::Eq)))
        }
        _ => None,
    }
}

fn is_constant(expr: &Expr) -> bool {
    let mut names = 0;
    expr.for_each_name(&mut |_| names += 1);
    names == 0 && !matches!(expr, Expr::Error(_) | Expr::String { .. })
}

fn loads_only_constants(stmt: &Statement) -> bool {
    match stmt {
        Statement::Assign(a) => is_constant(&a.value),
        Statement::Block(b) => !b.stmts.is_empty() && b.stmts.iter().all(loads_only_constants),
        _ => false,
    }
}

/// Signals read and written by a statement tree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Accesses {
    /// Names read, including select indices of assignment targets.
    pub reads: BTreeSet<Ident>,
    /// Names assigned.
    pub writes: BTreeSet<Ident>,
}

impl Accesses {
    /// Records the names an expression reads.
    pub fn read(&mut self, expr: &Expr) {
        expr.for_each_name(&mut |n| {
            self.reads.insert(n);
        });
    }

    /// Records an assignment target.
    pub fn write(&mut self, target: &Expr) {
        match target {
            Expr::Identifier { name, .. } => {
                self.writes.insert(*name);
            }
            Expr::BitSelect { name, index, .. } => {
                self.writes.insert(*name);
                self.read(index);
            }
            Expr::RangeSelect { name, msb, lsb, .. } => {
                self.writes.insert(*name);
                self.read(msb);
                self.read(lsb);
            }
            Expr::Concat { parts, .. } => parts.iter().for_each(|p| self.write(p)),
            _ => {}
        }
    }

    /// Walks a statement tree.
    pub fn statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Assign(a) => {
                self.write(&a.target);
                self.read(&a.value);
            }
            Statement::If(s) => {
                self.read(&s.cond);
                self.statement(&s.then_branch);
                if let Some(e) = &s.else_branch {
                    self.statement(e);
                }
            }
            Statement::Case(c) => {
                self.read(&c.expr);
                for arm in &c.arms {
                    arm.labels.iter().for_each(|l| self.read(l));
                    self.statement(&arm.body);
                }
                if let Some(d) = &c.default {
                    self.statement(d);
                }
            }
            Statement::Block(b) => b.stmts.iter().for_each(|s| self.statement(s)),
            Statement::Delay(d) => {
                self.read(&d.delay);
                self.statement(&d.body);
            }
            Statement::Forever(f) => self.statement(&f.body),
            Statement::EventControl(e) => {
                e.sensitivity.items.iter().for_each(|i| self.read(&i.signal));
                self.statement(&e.body);
            }
            Statement::SystemTask(t) => t.args.iter().for_each(|a| self.read(a)),
            Statement::Null(_) | Statement::Error(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_verilog_parser::ast::ModuleItem;
    use vela_verilog_parser::{parse_source, ParsedUnit};

    fn always_blocks(unit: &ParsedUnit) -> Vec<&AlwaysBlock> {
        unit.ast.modules[0]
            .items
            .iter()
            .filter_map(|i| match i {
                ModuleItem::Always(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn async_reset_counter() {
        let unit = parse_source(
            "module c(input clk, input reset, output reg [3:0] q);
               always @(posedge reset or posedge clk)
                 if (reset) q <= 0; else q <= q + 1;
             endmodule",
        );
        let shape = classify_always(always_blocks(&unit)[0]);
        assert_eq!(shape.kind, ProcessKind::Sequential);
        let clock = shape.clock.unwrap();
        assert_eq!(unit.name_of(clock.signal), "clk");
        assert_eq!(clock.edge, Edge::Posedge);
        let reset = shape.reset.unwrap();
        assert_eq!(unit.name_of(reset.signal), "reset");
        assert!(reset.active_high);
        assert!(reset.is_asserted(Logic::One));
        assert!(!reset.is_asserted(Logic::X));
        assert!(reset.otherwise.is_some());
    }

    #[test]
    fn active_low_reset_forms() {
        for cond in ["!rst_n", "~rst_n", "rst_n == 0", "rst_n != 1"] {
            let text = format!(
                "module c(input clk, input rst_n, output reg q);
                   always @(posedge clk or negedge rst_n) begin
                     if ({cond}) q <= 1'b0; else q <= ~q;
                   end
                 endmodule"
            );
            let unit = parse_source(&text);
            let shape = classify_always(always_blocks(&unit)[0]);
            let reset = shape.reset.unwrap_or_else(|| panic!("no reset for {cond}"));
            assert!(!reset.active_high, "{cond}");
            assert!(reset.is_asserted(Logic::Zero));
            assert_eq!(unit.name_of(shape.clock.unwrap().signal), "clk");
        }
    }

    #[test]
    fn enable_is_not_a_reset() {
        let unit = parse_source(
            "module c(input clk, input en, input d, output reg q);
               always @(posedge clk) if (en) q <= d;
             endmodule",
        );
        let shape = classify_always(always_blocks(&unit)[0]);
        assert!(shape.reset.is_none());
        assert_eq!(unit.name_of(shape.clock.unwrap().signal), "clk");
    }

    #[test]
    fn level_sensitive_is_combinational() {
        let unit = parse_source(
            "module c(input a, input b, output reg y);
               always @(a or b) y = a & b;
               always @* y = a;
             endmodule",
        );
        for block in always_blocks(&unit) {
            let shape = classify_always(block);
            assert_eq!(shape.kind, ProcessKind::Combinational);
            assert!(shape.clock.is_none());
        }
    }

    #[test]
    fn accesses_of_case_block() {
        let unit = parse_source(
            "module m(input [1:0] s, input a, input b, output reg y, output reg [3:0] v);
               always @(*) begin
                 case (s)
                   2'd0: y = a;
                   default: begin y = b; v[s] = 1'b1; end
                 endcase
               end
             endmodule",
        );
        let mut acc = Accesses::default();
        acc.statement(&always_blocks(&unit)[0].body);
        let names = |set: &BTreeSet<Ident>| {
            let mut v: Vec<_> = set.iter().map(|n| unit.name_of(*n).to_string()).collect();
            v.sort();
            v
        };
        assert_eq!(names(&acc.reads), ["a", "b", "s"]);
        assert_eq!(names(&acc.writes), ["v", "y"]);
    }
}
