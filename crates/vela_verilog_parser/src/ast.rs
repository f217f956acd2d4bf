//! AST node types.
//!
//! The node set is closed: every consumer matches exhaustively, so adding a
//! variant is a compile error until each phase handles it. Every node carries
//! a [`Span`]. Identifier leaves hold an interned [`Ident`] that is also the
//! key of the declaring [`Symbol`](crate::symbols::Symbol); they never own
//! or point at the symbol itself. `Error(Span)` variants stand in for
//! constructs the parser could not make sense of.

use serde::{Deserialize, Serialize};
use std::fmt;
use vela_common::{BitVec, Ident};
use vela_source::Span;

// ============================================================================
// Top level
// ============================================================================

/// All modules parsed from one source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Modules in source order.
    pub modules: Vec<Module>,
    /// Span of the whole text.
    pub span: Span,
}

/// A `module ... endmodule` declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// Module name.
    pub name: Ident,
    /// Span of the name token.
    pub name_span: Span,
    /// Parameters from a `#(parameter ...)` header list.
    pub params: Vec<VarDecl>,
    /// Ports in header order, with directions merged in from body
    /// declarations for non-ANSI headers.
    pub ports: Vec<PortDecl>,
    /// Body items in source order.
    pub items: Vec<ModuleItem>,
    /// Set when a fatal syntax error occurred inside this module; such a
    /// module must not reach code generation.
    pub fatal: bool,
    /// Span from `module` to `endmodule`.
    pub span: Span,
}

// ============================================================================
// Declarations
// ============================================================================

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// `input`
    Input,
    /// `output`
    Output,
    /// `inout`
    Inout,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Input => "input",
            Direction::Output => "output",
            Direction::Inout => "inout",
        };
        f.write_str(s)
    }
}

/// A `[msb:lsb]` packed range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Range {
    /// Left bound.
    pub msb: Expr,
    /// Right bound.
    pub lsb: Expr,
    /// Span including the brackets.
    pub span: Span,
}

/// A port, either from an ANSI header or a body direction declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDecl {
    /// Port name.
    pub name: Ident,
    /// Direction; `None` only for a non-ANSI header name never given one.
    pub direction: Option<Direction>,
    /// Declared `reg` (inline or by a separate `reg` declaration).
    pub is_reg: bool,
    /// Declared range, if any.
    pub range: Option<Range>,
    /// Bit width computed from `range`.
    pub width: u32,
    /// Span of the declaration.
    pub span: Span,
}

/// Kind of a body variable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarKind {
    /// `wire`
    Wire,
    /// `reg`
    Reg,
    /// `integer`, a 32-bit reg.
    Integer,
    /// `parameter`
    Parameter,
    /// `localparam`
    Localparam,
}

impl VarKind {
    /// Keyword text.
    pub fn keyword(self) -> &'static str {
        match self {
            VarKind::Wire => "wire",
            VarKind::Reg => "reg",
            VarKind::Integer => "integer",
            VarKind::Parameter => "parameter",
            VarKind::Localparam => "localparam",
        }
    }

    /// `true` for `parameter` and `localparam`.
    pub fn is_constant(self) -> bool {
        matches!(self, VarKind::Parameter | VarKind::Localparam)
    }
}

/// One declared name of a `wire`/`reg`/`integer`/`parameter`/`localparam`
/// statement. `wire [3:0] a, b;` yields two `VarDecl`s sharing a range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDecl {
    /// Declaration kind.
    pub kind: VarKind,
    /// Declared name.
    pub name: Ident,
    /// Declared range, if any.
    pub range: Option<Range>,
    /// Bit width computed from `range` (32 for `integer`).
    pub width: u32,
    /// Initializer: the value of a parameter, or `wire w = expr` / `reg r = expr`.
    pub init: Option<Expr>,
    /// Span of the name (and initializer).
    pub span: Span,
}

// ============================================================================
// Module items
// ============================================================================

/// An item in a module body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModuleItem {
    /// Body direction declaration completing a non-ANSI header port.
    PortDecl(PortDecl),
    /// `wire`, `reg`, `integer`, `parameter`, `localparam`.
    VarDecl(VarDecl),
    /// `assign target = value;`
    ContinuousAssign(ContinuousAssign),
    /// `always ...`
    Always(AlwaysBlock),
    /// `initial ...`
    Initial(InitialBlock),
    /// `name inst (...);`
    Instance(ModuleInstance),
    /// Unparseable item.
    Error(Span),
}

/// `assign target = value;`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousAssign {
    /// Net being driven.
    pub target: Expr,
    /// Driving expression.
    pub value: Expr,
    /// Span of the statement.
    pub span: Span,
}

/// `always [@(...)] body`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlwaysBlock {
    /// Event control; `None` for `always #5 clk = ~clk;`-style blocks.
    pub sensitivity: Option<SensitivityList>,
    /// Body statement.
    pub body: Statement,
    /// Span of the block.
    pub span: Span,
}

/// `initial body`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialBlock {
    /// Body statement.
    pub body: Statement,
    /// Span of the block.
    pub span: Span,
}

/// The event list of `@(...)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityList {
    /// `@*` or `@(*)`.
    pub star: bool,
    /// Items joined by `or` or `,`.
    pub items: Vec<SensitivityItem>,
    /// Span from `@` to the closing paren.
    pub span: Span,
}

impl SensitivityList {
    /// `true` if any item is edge-triggered.
    pub fn is_edge_triggered(&self) -> bool {
        self.items.iter().any(|i| i.edge.is_some())
    }
}

/// One entry in a sensitivity list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityItem {
    /// `posedge`/`negedge`, or `None` for a level term.
    pub edge: Option<Edge>,
    /// Signal watched.
    pub signal: Expr,
    /// Span of the item.
    pub span: Span,
}

/// Clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    /// Rising.
    Posedge,
    /// Falling.
    Negedge,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Edge::Posedge => "posedge",
            Edge::Negedge => "negedge",
        })
    }
}

/// `module_name [#(...)] instance_name (connections);`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleInstance {
    /// Instantiated module. Resolved at analysis time, not while parsing.
    pub module_name: Ident,
    /// Instance name.
    pub instance_name: Ident,
    /// Expressions from a `#(...)` override list; recorded but not applied.
    pub param_overrides: Vec<Expr>,
    /// Port connections in source order.
    pub connections: Vec<PortConnection>,
    /// Span of the statement.
    pub span: Span,
}

/// `.port(expr)` or a positional `expr`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortConnection {
    /// Formal port name; `None` for positional connections.
    pub port: Option<Ident>,
    /// Actual expression; `None` for an explicit `.port()`.
    pub expr: Option<Expr>,
    /// Span of the connection.
    pub span: Span,
}

// ============================================================================
// Statements
// ============================================================================

/// A procedural statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    /// `target = value;` or `target <= value;`
    Assign(ProceduralAssign),
    /// `if (cond) then [else other]`
    If(IfStmt),
    /// `case (expr) ... endcase`
    Case(CaseStmt),
    /// `begin [: label] ... end`
    Block(Block),
    /// `#delay body`
    Delay(DelayStmt),
    /// `forever body`
    Forever(ForeverStmt),
    /// `@(events) body`
    EventControl(EventStmt),
    /// `$display(...);`, `$finish;`, ...
    SystemTask(SystemTaskCall),
    /// A lone `;`.
    Null(Span),
    /// Unparseable statement.
    Error(Span),
}

impl Statement {
    /// Source span.
    pub fn span(&self) -> Span {
        match self {
            Statement::Assign(s) => s.span,
            Statement::If(s) => s.span,
            Statement::Case(s) => s.span,
            Statement::Block(s) => s.span,
            Statement::Delay(s) => s.span,
            Statement::Forever(s) => s.span,
            Statement::EventControl(s) => s.span,
            Statement::SystemTask(s) => s.span,
            Statement::Null(span) | Statement::Error(span) => *span,
        }
    }
}

/// Procedural assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProceduralAssign {
    /// Left-hand side.
    pub target: Expr,
    /// Right-hand side.
    pub value: Expr,
    /// `=` when true, `<=` when false.
    pub blocking: bool,
    /// Span of the statement.
    pub span: Span,
}

/// `if`/`else`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfStmt {
    /// Condition.
    pub cond: Expr,
    /// Taken when the condition is true.
    pub then_branch: Box<Statement>,
    /// Taken otherwise.
    pub else_branch: Option<Box<Statement>>,
    /// Span of the statement.
    pub span: Span,
}

/// Which `case` keyword was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseKind {
    /// `case`
    Case,
    /// `casez`
    Casez,
    /// `casex`
    Casex,
}

/// `case (expr) arms [default] endcase`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseStmt {
    /// Keyword used.
    pub kind: CaseKind,
    /// Selector.
    pub expr: Expr,
    /// Labelled arms in source order.
    pub arms: Vec<CaseArm>,
    /// The `default` arm.
    pub default: Option<Box<Statement>>,
    /// Span of the statement.
    pub span: Span,
}

/// `label, label: body`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseArm {
    /// Values matched by this arm.
    pub labels: Vec<Expr>,
    /// Statement executed on a match.
    pub body: Statement,
    /// Span of the arm.
    pub span: Span,
}

/// `begin ... end`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Name from `begin : name`.
    pub label: Option<Ident>,
    /// Statements in order.
    pub stmts: Vec<Statement>,
    /// Span from `begin` to `end`.
    pub span: Span,
}

/// `#delay body`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayStmt {
    /// Delay amount.
    pub delay: Expr,
    /// Statement executed after the delay (often [`Statement::Null`]).
    pub body: Box<Statement>,
    /// Span of the statement.
    pub span: Span,
}

/// `forever body`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeverStmt {
    /// Repeated statement.
    pub body: Box<Statement>,
    /// Span of the statement.
    pub span: Span,
}

/// `@(events) body`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventStmt {
    /// Events waited for.
    pub sensitivity: SensitivityList,
    /// Statement executed after the event.
    pub body: Box<Statement>,
    /// Span of the statement.
    pub span: Span,
}

/// A system task statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemTaskCall {
    /// Task name including `$`.
    pub name: Ident,
    /// Arguments.
    pub args: Vec<Expr>,
    /// Span of the statement.
    pub span: Span,
}

// ============================================================================
// Expressions
// ============================================================================

/// An expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// A name.
    Identifier {
        /// The referenced name.
        name: Ident,
        /// Source span.
        span: Span,
    },
    /// A numeric literal.
    Number(NumberLiteral),
    /// A string literal with its quotes removed.
    String {
        /// Literal text, escapes left as written.
        value: String,
        /// Source span.
        span: Span,
    },
    /// `name[index]`
    BitSelect {
        /// Selected signal.
        name: Ident,
        /// Bit index.
        index: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// `name[msb:lsb]`
    RangeSelect {
        /// Selected signal.
        name: Ident,
        /// Upper bound.
        msb: Box<Expr>,
        /// Lower bound.
        lsb: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// Prefix operator.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// Infix operator.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// `cond ? then_expr : else_expr`
    Ternary {
        /// Condition.
        cond: Box<Expr>,
        /// Value when true.
        then_expr: Box<Expr>,
        /// Value when false.
        else_expr: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// `{a, b, c}`
    Concat {
        /// Parts, most significant first.
        parts: Vec<Expr>,
        /// Source span.
        span: Span,
    },
    /// `{count{a, b}}`
    Replicate {
        /// Repetition count.
        count: Box<Expr>,
        /// Parts being repeated.
        parts: Vec<Expr>,
        /// Source span.
        span: Span,
    },
    /// `$time` and other system functions used as values.
    SystemCall {
        /// Function name including `$`.
        name: Ident,
        /// Arguments.
        args: Vec<Expr>,
        /// Source span.
        span: Span,
    },
    /// Unparseable expression.
    Error(Span),
}

/// A numeric literal with its decoded value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberLiteral {
    /// Decoded bits.
    pub value: BitVec,
    /// `true` if the literal had an explicit width.
    pub sized: bool,
    /// Source span.
    pub span: Span,
}

impl Expr {
    /// Source span.
    pub fn span(&self) -> Span {
        match self {
            Expr::Identifier { span, .. }
            | Expr::String { span, .. }
            | Expr::BitSelect { span, .. }
            | Expr::RangeSelect { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Ternary { span, .. }
            | Expr::Concat { span, .. }
            | Expr::Replicate { span, .. }
            | Expr::SystemCall { span, .. } => *span,
            Expr::Number(n) => n.span,
            Expr::Error(span) => *span,
        }
    }

    /// The signal written when this expression is an assignment target.
    pub fn target_name(&self) -> Option<Ident> {
        match self {
            Expr::Identifier { name, .. }
            | Expr::BitSelect { name, .. }
            | Expr::RangeSelect { name, .. } => Some(*name),
            _ => None,
        }
    }

    /// Calls `f` for every signal name read by this expression, in
    /// left-to-right order. Names may repeat.
    pub fn for_each_name(&self, f: &mut impl FnMut(Ident)) {
        match self {
            Expr::Identifier { name, .. } => f(*name),
            Expr::BitSelect { name, index, .. } => {
                f(*name);
                index.for_each_name(f);
            }
            Expr::RangeSelect { name, msb, lsb, .. } => {
                f(*name);
                msb.for_each_name(f);
                lsb.for_each_name(f);
            }
            Expr::Unary { operand, .. } => operand.for_each_name(f),
            Expr::Binary { left, right, .. } => {
                left.for_each_name(f);
                right.for_each_name(f);
            }
            Expr::Ternary {
                cond,
                then_expr,
                else_expr,
                ..
            } => {
                cond.for_each_name(f);
                then_expr.for_each_name(f);
                else_expr.for_each_name(f);
            }
            Expr::Concat { parts, .. } => parts.iter().for_each(|p| p.for_each_name(f)),
            Expr::Replicate { count, parts, .. } => {
                count.for_each_name(f);
                parts.iter().for_each(|p| p.for_each_name(f));
            }
            Expr::SystemCall { args, .. } => args.iter().for_each(|a| a.for_each_name(f)),
            Expr::Number(_) | Expr::String { .. } | Expr::Error(_) => {}
        }
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `+`
    Plus,
    /// `-`
    Neg,
    /// `!`
    LogicalNot,
    /// `~`
    BitNot,
    /// `&`
    ReduceAnd,
    /// `~&`
    ReduceNand,
    /// `|`
    ReduceOr,
    /// `~|`
    ReduceNor,
    /// `^`
    ReduceXor,
    /// `~^`
    ReduceXnor,
}

impl UnaryOp {
    /// Operator text.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::LogicalNot => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::ReduceAnd => "&",
            UnaryOp::ReduceNand => "~&",
            UnaryOp::ReduceOr => "|",
            UnaryOp::ReduceNor => "~|",
            UnaryOp::ReduceXor => "^",
            UnaryOp::ReduceXnor => "~^",
        }
    }
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `**`
    Pow,
    /// `==`
    Eq,
    /// `!=`
    Neq,
    /// `===`
    CaseEq,
    /// `!==`
    CaseNeq,
    /// `<`
    Lt,
    /// `<=` in expression context
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `&&`
    LogicalAnd,
    /// `||`
    LogicalOr,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `~^`
    BitXnor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `<<<`
    AShl,
    /// `>>>`
    AShr,
}

impl BinaryOp {
    /// Operator text.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::CaseEq => "===",
            BinaryOp::CaseNeq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitXnor => "~^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::AShl => "<<<",
            BinaryOp::AShr => ">>>",
        }
    }

    /// `true` for operators whose result is a single bit.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::Neq
                | BinaryOp::CaseEq
                | BinaryOp::CaseNeq
                | BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge
                | BinaryOp::LogicalAnd
                | BinaryOp::LogicalOr
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(raw: u32) -> Expr {
        Expr::Identifier {
            name: Ident::from_raw(raw),
            span: Span::DUMMY,
        }
    }

    #[test]
    fn for_each_name_visits_in_order() {
        let e = Expr::Ternary {
            cond: Box::new(ident(1)),
            then_expr: Box::new(Expr::BitSelect {
                name: Ident::from_raw(2),
                index: Box::new(ident(3)),
                span: Span::DUMMY,
            }),
            else_expr: Box::new(Expr::Concat {
                parts: vec![ident(4), ident(1)],
                span: Span::DUMMY,
            }),
            span: Span::DUMMY,
        };
        let mut seen = Vec::new();
        e.for_each_name(&mut |n| seen.push(n.as_raw()));
        assert_eq!(seen, [1, 2, 3, 4, 1]);
    }

    #[test]
    fn target_names() {
        assert_eq!(ident(5).target_name(), Some(Ident::from_raw(5)));
        assert_eq!(Expr::Error(Span::DUMMY).target_name(), None);
    }

    #[test]
    fn operator_symbols() {
        assert_eq!(BinaryOp::Le.symbol(), "<=");
        assert!(BinaryOp::Le.is_comparison());
        assert!(!BinaryOp::Add.is_comparison());
        assert_eq!(UnaryOp::ReduceXnor.symbol(), "~^");
        assert_eq!(Direction::Inout.to_string(), "inout");
    }

    #[test]
    fn serde_roundtrip() {
        let stmt = Statement::Assign(ProceduralAssign {
            target: ident(1),
            value: Expr::Number(NumberLiteral {
                value: BitVec::from_u64(3, 4),
                sized: true,
                span: Span::DUMMY,
            }),
            blocking: false,
            span: Span::DUMMY,
        });
        let json = serde_json::to_string(&stmt).unwrap();
        let back: Statement = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, Statement::Assign(a) if !a.blocking));
    }
}
