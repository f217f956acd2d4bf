//! Operator semantics on [`BitVec`] values.
//!
//! [`eval_unary`] and [`eval_binary`] are shared by the parser's constant
//! folding (range bounds, parameter values) and by the simulator's
//! expression evaluator. Result widths follow the self-determined rules:
//! comparisons, logical operators and reductions give one bit, shifts keep
//! the left operand's width, and everything else takes the wider operand.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use std::cmp::Ordering;
use vela_common::bits::{MAX_WIDTH, UNSIZED_WIDTH};
use vela_common::{BitVec, Ident, Logic};

/// Width of an unsized literal or integer.
pub const INTEGER_WIDTH: u32 = UNSIZED_WIDTH;

/// Decodes the text of a number token.
///
/// Returns the value and whether the literal carried an explicit size.
/// `None` if the text is not a well-formed literal.
pub fn parse_number_literal(text: &str) -> Option<(BitVec, bool)> {
    let Some(tick) = text.find('\'') else {
        let value = BitVec::parse_based(None, 'd', text)?;
        return Some((value, false));
    };
    let size: String = text[..tick].chars().filter(|c| *c != '_').collect();
    let width = if size.is_empty() {
        None
    } else {
        Some(
            size.parse::<u32>()
                .ok()
                .filter(|w| (1..=MAX_WIDTH).contains(w))?,
        )
    };
    let mut rest = text[tick + 1..].chars();
    let mut base = rest.next()?;
    if base == 's' || base == 'S' {
        base = rest.next()?;
    }
    let digits = rest.as_str().trim_start();
    let value = BitVec::parse_based(width, base, digits)?;
    Some((value, width.is_some()))
}

/// Applies a prefix operator.
pub fn eval_unary(op: UnaryOp, value: &BitVec) -> BitVec {
    match op {
        UnaryOp::Plus => value.clone(),
        UnaryOp::Neg => BitVec::zeros(value.width()).sub(value, value.width()),
        UnaryOp::LogicalNot => BitVec::from_logic(!value.truth()),
        UnaryOp::BitNot => !value,
        UnaryOp::ReduceAnd => BitVec::from_logic(value.reduce_and()),
        UnaryOp::ReduceNand => BitVec::from_logic(!value.reduce_and()),
        UnaryOp::ReduceOr => BitVec::from_logic(value.reduce_or()),
        UnaryOp::ReduceNor => BitVec::from_logic(!value.reduce_or()),
        UnaryOp::ReduceXor => BitVec::from_logic(value.reduce_xor()),
        UnaryOp::ReduceXnor => BitVec::from_logic(!value.reduce_xor()),
    }
}

/// Applies an infix operator.
pub fn eval_binary(op: BinaryOp, left: &BitVec, right: &BitVec) -> BitVec {
    let width = left.width().max(right.width());
    match op {
        BinaryOp::Add => left.add(right, width),
        BinaryOp::Sub => left.sub(right, width),
        BinaryOp::Mul => left.mul(right, width),
        BinaryOp::Div => left.div(right, width),
        BinaryOp::Mod => left.rem(right, width),
        BinaryOp::Pow => pow(left, right, width),
        BinaryOp::Eq => BitVec::from_logic(left.logic_eq(right)),
        BinaryOp::Neq => BitVec::from_logic(!left.logic_eq(right)),
        BinaryOp::CaseEq => BitVec::from_bool(left.resize(width) == right.resize(width)),
        BinaryOp::CaseNeq => BitVec::from_bool(left.resize(width) != right.resize(width)),
        BinaryOp::Lt => compare(left, right, |o| o == Ordering::Less),
        BinaryOp::Le => compare(left, right, |o| o != Ordering::Greater),
        BinaryOp::Gt => compare(left, right, |o| o == Ordering::Greater),
        BinaryOp::Ge => compare(left, right, |o| o != Ordering::Less),
        BinaryOp::LogicalAnd => BitVec::from_logic(left.truth() & right.truth()),
        BinaryOp::LogicalOr => BitVec::from_logic(left.truth() | right.truth()),
        BinaryOp::BitAnd => left & right,
        BinaryOp::BitOr => left | right,
        BinaryOp::BitXor => left ^ right,
        BinaryOp::BitXnor => !&(left ^ right),
        BinaryOp::Shl | BinaryOp::AShl => left.shl(right),
        BinaryOp::Shr | BinaryOp::AShr => left.shr(right),
    }
}

fn compare(left: &BitVec, right: &BitVec, pred: impl Fn(Ordering) -> bool) -> BitVec {
    match left.compare(right) {
        Some(ord) => BitVec::from_bool(pred(ord)),
        None => BitVec::from_logic(Logic::X),
    }
}

fn pow(base: &BitVec, exp: &BitVec, width: u32) -> BitVec {
    let (Some(b), Some(e)) = (base.to_u64(), exp.to_u64()) else {
        return BitVec::unknown(width);
    };
    let Ok(e) = u32::try_from(e) else {
        return BitVec::unknown(width);
    };
    match b.checked_pow(e) {
        Some(v) if width <= 64 => BitVec::from_u64(v, width),
        _ => BitVec::unknown(width),
    }
}

/// Folds a constant expression.
///
/// `lookup` supplies the values of named constants; a name it does not know
/// makes the whole expression non-constant.
pub fn eval_const(expr: &Expr, lookup: &impl Fn(Ident) -> Option<BitVec>) -> Option<BitVec> {
    match expr {
        Expr::Number(n) => Some(n.value.clone()),
        Expr::Identifier { name, .. } => lookup(*name),
        Expr::Unary { op, operand, .. } => Some(eval_unary(*op, &eval_const(operand, lookup)?)),
        Expr::Binary {
            op, left, right, ..
        } => {
            let l = eval_const(left, lookup)?;
            let r = eval_const(right, lookup)?;
            Some(eval_binary(*op, &l, &r))
        }
        Expr::Ternary {
            cond,
            then_expr,
            else_expr,
            ..
        } => match eval_const(cond, lookup)?.truth() {
            Logic::One => eval_const(then_expr, lookup),
            Logic::Zero => eval_const(else_expr, lookup),
            Logic::X | Logic::Z => None,
        },
        Expr::Concat { parts, .. } => {
            let values = parts
                .iter()
                .map(|p| eval_const(p, lookup))
                .collect::<Option<Vec<_>>>()?;
            Some(BitVec::concat(&values))
        }
        Expr::Replicate { count, parts, .. } => {
            let n = u32::try_from(eval_const(count, lookup)?.to_u64()?).ok()?;
            let values = parts
                .iter()
                .map(|p| eval_const(p, lookup))
                .collect::<Option<Vec<_>>>()?;
            BitVec::concat(&values).replicate(n)
        }
        Expr::BitSelect { name, index, .. } => {
            let value = lookup(*name)?;
            let i = u32::try_from(eval_const(index, lookup)?.to_u64()?).ok()?;
            Some(BitVec::from_logic(value.bit(i)))
        }
        Expr::RangeSelect { name, msb, lsb, .. } => {
            let value = lookup(*name)?;
            let hi = u32::try_from(eval_const(msb, lookup)?.to_u64()?).ok()?;
            let lo = u32::try_from(eval_const(lsb, lookup)?.to_u64()?).ok()?;
            (hi.abs_diff(lo) < MAX_WIDTH).then(|| value.slice(hi, lo))
        }
        Expr::String { .. } | Expr::SystemCall { .. } | Expr::Error(_) => None,
    }
}

/// Folds a constant to a non-negative integer, as needed for range bounds.
pub fn eval_const_u32(expr: &Expr, lookup: &impl Fn(Ident) -> Option<BitVec>) -> Option<u32> {
    eval_const(expr, lookup)?
        .to_u64()
        .and_then(|v| u32::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NumberLiteral;
    use vela_source::Span;

    fn num(v: u64, w: u32) -> BitVec {
        BitVec::from_u64(v, w)
    }

    fn lit(v: u64) -> Expr {
        Expr::Number(NumberLiteral {
            value: num(v, 32),
            sized: false,
            span: Span::DUMMY,
        })
    }

    #[test]
    fn literal_forms() {
        let (v, sized) = parse_number_literal("4'b1010").unwrap();
        assert!(sized);
        assert_eq!(v.to_binary_string(), "1010");
        let (v, _) = parse_number_literal("8'hF_f").unwrap();
        assert_eq!(v.to_u64(), Some(255));
        let (v, _) = parse_number_literal("6'o17").unwrap();
        assert_eq!(v.to_u64(), Some(15));
        let (v, _) = parse_number_literal("12'd100").unwrap();
        assert_eq!((v.width(), v.to_u64()), (12, Some(100)));
        let (v, sized) = parse_number_literal("1_000").unwrap();
        assert!(!sized);
        assert_eq!((v.width(), v.to_u64()), (32, Some(1000)));
        let (v, sized) = parse_number_literal("'b1").unwrap();
        assert!(!sized);
        assert_eq!(v.width(), 32);
        assert_eq!(parse_number_literal("4'b1x0z").unwrap().0.to_binary_string(), "1x0z");
        assert!(parse_number_literal("4'b102").is_none());
        assert!(parse_number_literal("0'b1").is_none());
    }

    #[test]
    fn arithmetic_wraps_at_operand_width() {
        assert_eq!(eval_binary(BinaryOp::Add, &num(15, 4), &num(1, 4)).to_u64(), Some(0));
        assert_eq!(eval_binary(BinaryOp::Sub, &num(0, 4), &num(1, 4)).to_u64(), Some(15));
        assert_eq!(eval_binary(BinaryOp::Pow, &num(2, 8), &num(3, 8)).to_u64(), Some(8));
        assert!(!eval_binary(BinaryOp::Div, &num(4, 8), &num(0, 8)).is_known());
    }

    #[test]
    fn comparisons_are_one_bit() {
        let r = eval_binary(BinaryOp::Lt, &num(3, 4), &num(9, 8));
        assert_eq!((r.width(), r.to_u64()), (1, Some(1)));
        let x = BitVec::unknown(4);
        assert_eq!(eval_binary(BinaryOp::Eq, &x, &num(1, 4)).bit(0), Logic::X);
        assert_eq!(eval_binary(BinaryOp::CaseEq, &x, &x).to_u64(), Some(1));
    }

    #[test]
    fn unary_operators() {
        assert_eq!(eval_unary(UnaryOp::Neg, &num(1, 4)).to_u64(), Some(15));
        assert_eq!(eval_unary(UnaryOp::ReduceAnd, &num(15, 4)).to_u64(), Some(1));
        assert_eq!(eval_unary(UnaryOp::ReduceNor, &num(0, 4)).to_u64(), Some(1));
        assert_eq!(eval_unary(UnaryOp::LogicalNot, &num(2, 4)).to_u64(), Some(0));
        assert_eq!(eval_unary(UnaryOp::BitNot, &num(5, 4)).to_u64(), Some(10));
    }

    #[test]
    fn const_folding_uses_lookup() {
        let width = Ident::from_raw(1);
        let expr = Expr::Binary {
            op: BinaryOp::Sub,
            left: Box::new(Expr::Identifier {
                name: width,
                span: Span::DUMMY,
            }),
            right: Box::new(lit(1)),
            span: Span::DUMMY,
        };
        let lookup = |n: Ident| (n == width).then(|| num(8, 32));
        assert_eq!(eval_const_u32(&expr, &lookup), Some(7));
        assert_eq!(eval_const_u32(&expr, &|_| None), None);
    }
}
