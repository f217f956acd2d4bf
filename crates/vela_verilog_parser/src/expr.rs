//! Pratt expression parser.
//!
//! | BP (L,R) | Operators |
//! |----------|-----------|
//! | (1,2)    | `\|\|` |
//! | (3,4)    | `&&` |
//! | (5,6)    | `\|` |
//! | (7,8)    | `^` `~^` |
//! | (9,10)   | `&` |
//! | (11,12)  | `==` `!=` `===` `!==` |
//! | (13,14)  | `<` `<=` `>` `>=` |
//! | (15,16)  | `<<` `>>` `<<<` `>>>` |
//! | (17,18)  | `+` `-` |
//! | (19,20)  | `*` `/` `%` |
//! | (22,21)  | `**` (right-assoc) |
//! | prefix 23 | `+` `-` `!` `~` `&` `~&` `\|` `~\|` `^` `~^` |
//!
//! Ternary `? :` binds loosest and is only taken at min_bp 0.

use crate::ast::*;
use crate::const_eval::{parse_number_literal, INTEGER_WIDTH};
use crate::errors::SEM003;
use crate::parser::Parser;
use crate::token::TokenKind;
use vela_common::BitVec;

const PREFIX_BP: u8 = 23;

fn infix_binding_power(op: BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::LogicalOr => (1, 2),
        BinaryOp::LogicalAnd => (3, 4),
        BinaryOp::BitOr => (5, 6),
        BinaryOp::BitXor | BinaryOp::BitXnor => (7, 8),
        BinaryOp::BitAnd => (9, 10),
        BinaryOp::Eq | BinaryOp::Neq | BinaryOp::CaseEq | BinaryOp::CaseNeq => (11, 12),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => (13, 14),
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::AShl | BinaryOp::AShr => (15, 16),
        BinaryOp::Add | BinaryOp::Sub => (17, 18),
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => (19, 20),
        BinaryOp::Pow => (22, 21),
    }
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::DoublePipe => BinaryOp::LogicalOr,
        TokenKind::DoubleAmpersand => BinaryOp::LogicalAnd,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::TildeCaret => BinaryOp::BitXnor,
        TokenKind::Ampersand => BinaryOp::BitAnd,
        TokenKind::DoubleEquals => BinaryOp::Eq,
        TokenKind::BangEquals => BinaryOp::Neq,
        TokenKind::TripleEquals => BinaryOp::CaseEq,
        TokenKind::BangDoubleEquals => BinaryOp::CaseNeq,
        TokenKind::LessThan => BinaryOp::Lt,
        TokenKind::LessEquals => BinaryOp::Le,
        TokenKind::GreaterThan => BinaryOp::Gt,
        TokenKind::GreaterEquals => BinaryOp::Ge,
        TokenKind::ShiftLeft => BinaryOp::Shl,
        TokenKind::ShiftRight => BinaryOp::Shr,
        TokenKind::ArithShiftLeft => BinaryOp::AShl,
        TokenKind::ArithShiftRight => BinaryOp::AShr,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::DoubleStar => BinaryOp::Pow,
        _ => return None,
    })
}

fn unary_op(kind: TokenKind) -> Option<UnaryOp> {
    Some(match kind {
        TokenKind::Plus => UnaryOp::Plus,
        TokenKind::Minus => UnaryOp::Neg,
        TokenKind::Bang => UnaryOp::LogicalNot,
        TokenKind::Tilde => UnaryOp::BitNot,
        TokenKind::Ampersand => UnaryOp::ReduceAnd,
        TokenKind::TildeAmpersand => UnaryOp::ReduceNand,
        TokenKind::Pipe => UnaryOp::ReduceOr,
        TokenKind::TildePipe => UnaryOp::ReduceNor,
        TokenKind::Caret => UnaryOp::ReduceXor,
        TokenKind::TildeCaret => UnaryOp::ReduceXnor,
        _ => return None,
    })
}

impl Parser<'_> {
    /// Parses an expression.
    pub(crate) fn parse_expr(&mut self) -> Expr {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Expr {
        if !self.enter_nesting() {
            return Expr::Error(self.current_span());
        }
        let expr = self.parse_operators(min_bp);
        self.leave_nesting();
        expr
    }

    fn parse_operators(&mut self, min_bp: u8) -> Expr {
        let mut lhs = self.parse_prefix_expr();
        loop {
            if self.at(TokenKind::Question) && min_bp == 0 {
                self.advance();
                let then_expr = self.parse_expr_bp(0);
                self.expect(TokenKind::Colon);
                let else_expr = self.parse_expr_bp(0);
                let span = lhs.span().merge(else_expr.span());
                lhs = Expr::Ternary {
                    cond: Box::new(lhs),
                    then_expr: Box::new(then_expr),
                    else_expr: Box::new(else_expr),
                    span,
                };
                continue;
            }

            let Some(op) = binary_op(self.current()) else {
                break;
            };
            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr_bp(r_bp);
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
                span,
            };
        }
        lhs
    }

    fn parse_prefix_expr(&mut self) -> Expr {
        let Some(op) = unary_op(self.current()) else {
            return self.parse_primary();
        };
        let start = self.current_span();
        self.advance();
        let operand = self.parse_expr_bp(PREFIX_BP);
        Expr::Unary {
            op,
            span: start.merge(operand.span()),
            operand: Box::new(operand),
        }
    }

    /// Literals, names, selects, calls, parenthesized expressions and
    /// concatenations.
    pub(crate) fn parse_primary(&mut self) -> Expr {
        let span = self.current_span();
        match self.current() {
            TokenKind::Number | TokenKind::BasedNumber => {
                let text = self.current_text();
                self.advance();
                match parse_number_literal(text) {
                    Some((value, sized)) => Expr::Number(NumberLiteral { value, sized, span }),
                    None => {
                        self.semantic_error(SEM003, format!("malformed number '{text}'"), span);
                        Expr::Number(NumberLiteral {
                            value: BitVec::unknown(INTEGER_WIDTH),
                            sized: false,
                            span,
                        })
                    }
                }
            }
            TokenKind::StringLiteral => {
                let text = self.current_text();
                self.advance();
                let value = text
                    .strip_prefix('"')
                    .map(|t| t.strip_suffix('"').unwrap_or(t))
                    .unwrap_or(text)
                    .to_string();
                Expr::String { value, span }
            }
            TokenKind::Identifier => self.parse_name_expr(),
            TokenKind::SystemName => {
                let name = self.interner.get_or_intern(self.current_text());
                self.advance();
                let args = if self.at(TokenKind::LeftParen) {
                    self.parse_call_args()
                } else {
                    Vec::new()
                };
                Expr::SystemCall {
                    name,
                    args,
                    span: span.merge(self.prev_span()),
                }
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr();
                self.expect(TokenKind::RightParen);
                inner
            }
            TokenKind::LeftBrace => self.parse_concat(),
            TokenKind::Error => {
                self.expected("expression");
                self.advance();
                Expr::Error(span)
            }
            _ => {
                self.expected("expression");
                Expr::Error(span)
            }
        }
    }

    /// `name`, `name[i]` or `name[msb:lsb]`.
    pub(crate) fn parse_name_expr(&mut self) -> Expr {
        let (name, span) = self.expect_ident();
        self.check_declared(name, span);
        if !self.eat(TokenKind::LeftBracket) {
            return Expr::Identifier { name, span };
        }
        let first = self.parse_expr();
        if self.eat(TokenKind::Colon) {
            let lsb = self.parse_expr();
            self.expect(TokenKind::RightBracket);
            Expr::RangeSelect {
                name,
                msb: Box::new(first),
                lsb: Box::new(lsb),
                span: span.merge(self.prev_span()),
            }
        } else {
            self.expect(TokenKind::RightBracket);
            Expr::BitSelect {
                name,
                index: Box::new(first),
                span: span.merge(self.prev_span()),
            }
        }
    }

    /// `{a, b}` or `{n{a, b}}`.
    fn parse_concat(&mut self) -> Expr {
        let start = self.current_span();
        self.expect(TokenKind::LeftBrace);
        let first = self.parse_expr();
        if self.at(TokenKind::LeftBrace) {
            self.advance();
            let parts = self.parse_expr_list(TokenKind::RightBrace);
            self.expect(TokenKind::RightBrace);
            self.expect(TokenKind::RightBrace);
            return Expr::Replicate {
                count: Box::new(first),
                parts,
                span: start.merge(self.prev_span()),
            };
        }
        let mut parts = vec![first];
        if self.eat(TokenKind::Comma) {
            parts.extend(self.parse_expr_list(TokenKind::RightBrace));
        }
        self.expect(TokenKind::RightBrace);
        Expr::Concat {
            parts,
            span: start.merge(self.prev_span()),
        }
    }

    fn parse_expr_list(&mut self, close: TokenKind) -> Vec<Expr> {
        let mut exprs = Vec::new();
        while !self.at(close) && !self.at_eof() {
            let before = self.position();
            exprs.push(self.parse_expr());
            if !self.eat(TokenKind::Comma) || self.position() == before {
                break;
            }
        }
        exprs
    }

    /// `( args )` of a system task or function call.
    pub(crate) fn parse_call_args(&mut self) -> Vec<Expr> {
        self.expect(TokenKind::LeftParen);
        let args = self.parse_expr_list(TokenKind::RightParen);
        self.expect(TokenKind::RightParen);
        args
    }

    /// Assignment target: a name, a select, or a concatenation of them.
    pub(crate) fn parse_lvalue(&mut self) -> Expr {
        match self.current() {
            TokenKind::Identifier => self.parse_name_expr(),
            TokenKind::LeftBrace => self.parse_concat(),
            _ => {
                let span = self.current_span();
                self.expected("assignment target");
                Expr::Error(span)
            }
        }
    }

    /// The value after `#`: a number, a name, or a parenthesized expression.
    pub(crate) fn parse_delay_value(&mut self) -> Expr {
        match self.current() {
            TokenKind::LeftParen | TokenKind::Number | TokenKind::BasedNumber | TokenKind::Identifier => {
                self.parse_primary()
            }
            _ => {
                let span = self.current_span();
                self.expected("delay value");
                Expr::Error(span)
            }
        }
    }
}
