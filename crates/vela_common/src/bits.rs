//! Four-state bit vectors with Verilog operator semantics.
//!
//! [`BitVec`] is the value type shared by constant evaluation in the parser
//! and by the simulator's signal table. Bits are stored least significant
//! first. Arithmetic follows the usual pessimistic rule: if any operand bit
//! is `x` or `z`, every result bit is `x`.

use crate::logic::Logic;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// Width given to unsized literals such as `42` or `'hff`.
pub const UNSIZED_WIDTH: u32 = 32;

/// Widest vector a declaration, literal or replication may produce.
pub const MAX_WIDTH: u32 = 1 << 16;

/// A fixed-width vector of [`Logic`] values.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitVec {
    bits: Vec<Logic>,
}

impl BitVec {
    /// A vector of `width` unknown bits.
    pub fn unknown(width: u32) -> Self {
        Self::filled(width, Logic::X)
    }

    /// A vector of `width` zero bits.
    pub fn zeros(width: u32) -> Self {
        Self::filled(width, Logic::Zero)
    }

    /// A vector with every bit set to `value`.
    pub fn filled(width: u32, value: Logic) -> Self {
        Self {
            bits: vec![value; width as usize],
        }
    }

    /// Builds a vector from the low `width` bits of `value`.
    pub fn from_u64(value: u64, width: u32) -> Self {
        let bits = (0..width)
            .map(|i| Logic::from_bool(i < 64 && (value >> i) & 1 == 1))
            .collect();
        Self { bits }
    }

    /// A one-bit vector.
    pub fn from_logic(value: Logic) -> Self {
        Self { bits: vec![value] }
    }

    /// A one-bit vector holding `0` or `1`.
    pub fn from_bool(value: bool) -> Self {
        Self::from_logic(Logic::from_bool(value))
    }

    /// Parses an MSB-first string of `0`, `1`, `x`, `z` characters.
    /// Underscores are ignored.
    pub fn from_binary_str(s: &str) -> Option<Self> {
        let mut bits = Vec::with_capacity(s.len());
        for c in s.chars().rev().filter(|c| *c != '_') {
            bits.push(Logic::from_char(c)?);
        }
        Some(Self { bits })
    }

    /// Parses the digits of a based literal such as the `1010` in `4'b1010`.
    ///
    /// `base` is one of `b`, `o`, `d`, `h` (either case). When `width` is
    /// `None` the literal is unsized and gets [`UNSIZED_WIDTH`] bits. Returns
    /// `None` if a digit is illegal for the base or a decimal value does not
    /// fit in 64 bits.
    pub fn parse_based(width: Option<u32>, base: char, digits: &str) -> Option<Self> {
        let digits: String = digits.chars().filter(|c| *c != '_').collect();
        if digits.is_empty() {
            return None;
        }
        let per_digit = match base.to_ascii_lowercase() {
            'b' => 1,
            'o' => 3,
            'h' => 4,
            'd' => {
                return Self::parse_decimal(width.unwrap_or(UNSIZED_WIDTH), &digits);
            }
            _ => return None,
        };

        let mut bits = Vec::with_capacity(digits.len() * per_digit as usize);
        for c in digits.chars().rev() {
            match Logic::from_char(c) {
                Some(l @ (Logic::X | Logic::Z)) => {
                    bits.extend(std::iter::repeat(l).take(per_digit as usize));
                }
                _ => {
                    let v = c.to_digit(1 << per_digit)?;
                    for i in 0..per_digit {
                        bits.push(Logic::from_bool((v >> i) & 1 == 1));
                    }
                }
            }
        }
        let natural = Self { bits };
        Some(natural.extend_literal(width.unwrap_or(UNSIZED_WIDTH)))
    }

    fn parse_decimal(width: u32, digits: &str) -> Option<Self> {
        if digits.len() == 1 {
            if let Some(l @ (Logic::X | Logic::Z)) = digits.chars().next().and_then(Logic::from_char)
            {
                return Some(Self::filled(width, l));
            }
        }
        let value: u64 = digits.parse().ok()?;
        Some(Self::from_u64(value, width))
    }

    /// Resizes a literal, extending with `x`/`z` if the top digit was one.
    fn extend_literal(mut self, width: u32) -> Self {
        let fill = match self.bits.last() {
            Some(l @ (Logic::X | Logic::Z)) => *l,
            _ => Logic::Zero,
        };
        self.bits.resize(width as usize, fill);
        self
    }

    /// Number of bits.
    pub fn width(&self) -> u32 {
        self.bits.len() as u32
    }

    /// Bit at `index`, or `x` if out of range.
    pub fn bit(&self, index: u32) -> Logic {
        self.bits.get(index as usize).copied().unwrap_or(Logic::X)
    }

    /// Overwrites bit `index`. Out-of-range writes are ignored.
    pub fn set_bit(&mut self, index: u32, value: Logic) {
        if let Some(b) = self.bits.get_mut(index as usize) {
            *b = value;
        }
    }

    /// Returns `true` if no bit is `x` or `z`.
    pub fn is_known(&self) -> bool {
        self.bits.iter().all(|b| b.is_known())
    }

    /// Numeric value if every bit is known and the value fits in 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        let mut value = 0u64;
        for (i, b) in self.bits.iter().enumerate() {
            match b {
                Logic::Zero => {}
                Logic::One if i < 64 => value |= 1 << i,
                _ => return None,
            }
        }
        Some(value)
    }

    /// Verilog truth value: `1` if any bit is `1`, `0` if all bits are `0`,
    /// otherwise `x`.
    pub fn truth(&self) -> Logic {
        if self.bits.contains(&Logic::One) {
            Logic::One
        } else if self.bits.iter().all(|b| *b == Logic::Zero) {
            Logic::Zero
        } else {
            Logic::X
        }
    }

    /// Zero-extends or truncates to `width`.
    pub fn resize(&self, width: u32) -> Self {
        let mut bits = self.bits.clone();
        bits.resize(width as usize, Logic::Zero);
        Self { bits }
    }

    /// Bits `hi` down to `lo` inclusive. Indices past the end read as `x`.
    pub fn slice(&self, hi: u32, lo: u32) -> Self {
        let (hi, lo) = if hi >= lo { (hi, lo) } else { (lo, hi) };
        let bits = (lo..=hi).map(|i| self.bit(i)).collect();
        Self { bits }
    }

    /// Writes `value` into bits `hi` down to `lo`.
    pub fn write_slice(&mut self, hi: u32, lo: u32, value: &BitVec) {
        let (hi, lo) = if hi >= lo { (hi, lo) } else { (lo, hi) };
        for (k, i) in (lo..=hi).enumerate() {
            self.set_bit(i, value.bit(k as u32));
        }
    }

    /// Concatenates `parts`, the first part landing in the most significant bits.
    pub fn concat(parts: &[BitVec]) -> Self {
        let bits = parts
            .iter()
            .rev()
            .flat_map(|p| p.bits.iter().copied())
            .collect();
        Self { bits }
    }

    /// `{count{self}}`, or `None` if the result would be wider than
    /// [`MAX_WIDTH`].
    pub fn replicate(&self, count: u32) -> Option<Self> {
        let width = u64::from(self.width()) * u64::from(count);
        if width > u64::from(MAX_WIDTH) {
            return None;
        }
        let parts = vec![self.clone(); count as usize];
        Some(Self::concat(&parts))
    }

    /// Wrapping addition at `width` bits.
    pub fn add(&self, rhs: &BitVec, width: u32) -> Self {
        if !self.is_known() || !rhs.is_known() {
            return Self::unknown(width);
        }
        let mut carry = false;
        let bits = (0..width)
            .map(|i| {
                let a = self.bit_or_zero(i);
                let b = rhs.bit_or_zero(i);
                let sum = a ^ b ^ carry;
                carry = (a && b) || (carry && (a ^ b));
                Logic::from_bool(sum)
            })
            .collect();
        Self { bits }
    }

    /// Wrapping subtraction at `width` bits.
    pub fn sub(&self, rhs: &BitVec, width: u32) -> Self {
        if !self.is_known() || !rhs.is_known() {
            return Self::unknown(width);
        }
        let negated = !&rhs.resize(width);
        let twos = negated.add(&BitVec::from_u64(1, width), width);
        self.add(&twos, width)
    }

    /// Wrapping multiplication. Results wider than 64 bits are `x`.
    pub fn mul(&self, rhs: &BitVec, width: u32) -> Self {
        self.arith64(rhs, width, |a, b| Some(a.wrapping_mul(b)))
    }

    /// Unsigned division. Division by zero yields `x`.
    pub fn div(&self, rhs: &BitVec, width: u32) -> Self {
        self.arith64(rhs, width, |a, b| a.checked_div(b))
    }

    /// Unsigned remainder. Division by zero yields `x`.
    pub fn rem(&self, rhs: &BitVec, width: u32) -> Self {
        self.arith64(rhs, width, |a, b| a.checked_rem(b))
    }

    fn arith64(&self, rhs: &BitVec, width: u32, op: impl Fn(u64, u64) -> Option<u64>) -> Self {
        if width > 64 {
            return Self::unknown(width);
        }
        match (self.to_u64(), rhs.to_u64()) {
            (Some(a), Some(b)) => match op(a, b) {
                Some(v) => Self::from_u64(v, width),
                None => Self::unknown(width),
            },
            _ => Self::unknown(width),
        }
    }

    /// Logical left shift, keeping the width of `self`.
    pub fn shl(&self, amount: &BitVec) -> Self {
        let Some(n) = amount.to_u64() else {
            return Self::unknown(self.width());
        };
        let bits = (0..self.width() as u64)
            .map(|i| {
                if i < n {
                    Logic::Zero
                } else {
                    self.bit((i - n) as u32)
                }
            })
            .collect();
        Self { bits }
    }

    /// Logical right shift, keeping the width of `self`.
    pub fn shr(&self, amount: &BitVec) -> Self {
        let Some(n) = amount.to_u64() else {
            return Self::unknown(self.width());
        };
        let width = self.width() as u64;
        let bits = (0..width)
            .map(|i| match i.checked_add(n) {
                Some(src) if src < width => self.bit(src as u32),
                _ => Logic::Zero,
            })
            .collect();
        Self { bits }
    }

    /// `==`: `0` if any pair of known bits differs, `x` if unknown bits
    /// prevent a decision.
    pub fn logic_eq(&self, rhs: &BitVec) -> Logic {
        let width = self.width().max(rhs.width());
        let mut unknown = false;
        for i in 0..width {
            match (self.bit_or(i, Logic::Zero).to_bool(), rhs.bit_or(i, Logic::Zero).to_bool()) {
                (Some(a), Some(b)) if a != b => return Logic::Zero,
                (Some(_), Some(_)) => {}
                _ => unknown = true,
            }
        }
        if unknown {
            Logic::X
        } else {
            Logic::One
        }
    }

    /// Unsigned ordering, or `None` if either side has unknown bits.
    pub fn compare(&self, rhs: &BitVec) -> Option<Ordering> {
        if !self.is_known() || !rhs.is_known() {
            return None;
        }
        let width = self.width().max(rhs.width());
        for i in (0..width).rev() {
            match (self.bit_or_zero(i), rhs.bit_or_zero(i)) {
                (true, false) => return Some(Ordering::Greater),
                (false, true) => return Some(Ordering::Less),
                _ => {}
            }
        }
        Some(Ordering::Equal)
    }

    /// `&vec`.
    pub fn reduce_and(&self) -> Logic {
        self.bits.iter().fold(Logic::One, |acc, b| acc & *b)
    }

    /// `|vec`.
    pub fn reduce_or(&self) -> Logic {
        self.bits.iter().fold(Logic::Zero, |acc, b| acc | *b)
    }

    /// `^vec`.
    pub fn reduce_xor(&self) -> Logic {
        self.bits.iter().fold(Logic::Zero, |acc, b| acc ^ *b)
    }

    /// MSB-first binary text, e.g. `"0101"`.
    pub fn to_binary_string(&self) -> String {
        self.bits.iter().rev().map(|b| b.to_char()).collect()
    }

    /// MSB-first hex text. A nibble with any unknown bit prints as `x`.
    pub fn to_hex_string(&self) -> String {
        let nibbles = self.width().div_ceil(4).max(1);
        (0..nibbles)
            .rev()
            .map(|n| {
                let nibble = self.slice(n * 4 + 3, n * 4);
                let mut v = 0u32;
                for i in 0..4 {
                    let idx = n * 4 + i;
                    if idx >= self.width() {
                        break;
                    }
                    match nibble.bit(i) {
                        Logic::Zero => {}
                        Logic::One => v |= 1 << i,
                        Logic::Z if (0..4).all(|k| n * 4 + k >= self.width() || nibble.bit(k) == Logic::Z) => {
                            return 'z';
                        }
                        _ => return 'x',
                    }
                }
                char::from_digit(v, 16).unwrap_or('x')
            })
            .collect()
    }

    fn bit_or(&self, index: u32, default: Logic) -> Logic {
        self.bits.get(index as usize).copied().unwrap_or(default)
    }

    fn bit_or_zero(&self, index: u32) -> bool {
        self.bit_or(index, Logic::Zero) == Logic::One
    }

    fn zip_with(&self, rhs: &BitVec, op: impl Fn(Logic, Logic) -> Logic) -> BitVec {
        let width = self.width().max(rhs.width());
        let bits = (0..width)
            .map(|i| op(self.bit_or(i, Logic::Zero), rhs.bit_or(i, Logic::Zero)))
            .collect();
        BitVec { bits }
    }
}

impl fmt::Display for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_binary_string())
    }
}

impl fmt::Debug for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'b{}", self.width(), self)
    }
}

impl BitAnd for &BitVec {
    type Output = BitVec;

    fn bitand(self, rhs: Self) -> BitVec {
        self.zip_with(rhs, |a, b| a & b)
    }
}

impl BitOr for &BitVec {
    type Output = BitVec;

    fn bitor(self, rhs: Self) -> BitVec {
        self.zip_with(rhs, |a, b| a | b)
    }
}

impl BitXor for &BitVec {
    type Output = BitVec;

    fn bitxor(self, rhs: Self) -> BitVec {
        self.zip_with(rhs, |a, b| a ^ b)
    }
}

impl Not for &BitVec {
    type Output = BitVec;

    fn not(self) -> BitVec {
        BitVec {
            bits: self.bits.iter().map(|b| !*b).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bv(s: &str) -> BitVec {
        BitVec::from_binary_str(s).unwrap()
    }

    #[test]
    fn from_u64_truncates_to_width() {
        let v = BitVec::from_u64(0b1_0110, 4);
        assert_eq!(v.to_binary_string(), "0110");
        assert_eq!(v.to_u64(), Some(6));
    }

    #[test]
    fn based_literals() {
        assert_eq!(BitVec::parse_based(Some(4), 'b', "1010").unwrap(), bv("1010"));
        assert_eq!(BitVec::parse_based(Some(8), 'h', "Ff").unwrap().to_u64(), Some(255));
        assert_eq!(BitVec::parse_based(Some(6), 'o', "17").unwrap().to_u64(), Some(15));
        assert_eq!(BitVec::parse_based(Some(8), 'd', "200").unwrap().to_u64(), Some(200));
        assert_eq!(BitVec::parse_based(None, 'h', "1").unwrap().width(), UNSIZED_WIDTH);
    }

    #[test]
    fn based_literal_unknown_extension() {
        let v = BitVec::parse_based(Some(8), 'b', "x1").unwrap();
        assert_eq!(v.to_binary_string(), "xxxxxxx1");
        let z = BitVec::parse_based(Some(4), 'd', "z").unwrap();
        assert_eq!(z.to_binary_string(), "zzzz");
    }

    #[test]
    fn based_literal_rejects_bad_digit() {
        assert!(BitVec::parse_based(Some(4), 'b', "102").is_none());
        assert!(BitVec::parse_based(Some(4), 'o', "8").is_none());
        assert!(BitVec::parse_based(Some(4), 'h', "").is_none());
    }

    #[test]
    fn add_wraps_modulo_width() {
        let a = BitVec::from_u64(15, 4);
        let one = BitVec::from_u64(1, 32);
        assert_eq!(a.add(&one, 4).to_u64(), Some(0));
        assert_eq!(BitVec::from_u64(7, 4).add(&one, 4).to_u64(), Some(8));
    }

    #[test]
    fn sub_wraps() {
        let a = BitVec::from_u64(2, 4);
        let b = BitVec::from_u64(3, 4);
        assert_eq!(a.sub(&b, 4).to_u64(), Some(15));
    }

    #[test]
    fn unknown_operand_poisons_arithmetic() {
        let a = bv("1x01");
        let b = BitVec::from_u64(1, 4);
        assert_eq!(a.add(&b, 4).to_binary_string(), "xxxx");
        assert_eq!(a.mul(&b, 4).to_binary_string(), "xxxx");
    }

    #[test]
    fn division_by_zero_is_unknown() {
        let a = BitVec::from_u64(9, 8);
        let zero = BitVec::zeros(8);
        assert!(!a.div(&zero, 8).is_known());
        assert_eq!(a.rem(&BitVec::from_u64(4, 8), 8).to_u64(), Some(1));
    }

    #[test]
    fn shifts_keep_width() {
        let v = bv("0011");
        assert_eq!(v.shl(&BitVec::from_u64(2, 32)), bv("1100"));
        assert_eq!(v.shr(&BitVec::from_u64(1, 32)), bv("0001"));
        assert_eq!(v.shr(&BitVec::from_u64(u64::MAX, 64)), bv("0000"));
    }

    #[test]
    fn equality_with_unknowns() {
        assert_eq!(bv("10").logic_eq(&bv("10")), Logic::One);
        assert_eq!(bv("1x").logic_eq(&bv("00")), Logic::Zero);
        assert_eq!(bv("1x").logic_eq(&bv("10")), Logic::X);
        assert_eq!(bv("0010").logic_eq(&bv("10")), Logic::One);
    }

    #[test]
    fn compare_unsigned() {
        assert_eq!(bv("0100").compare(&bv("11")), Some(Ordering::Greater));
        assert_eq!(bv("x").compare(&bv("1")), None);
    }

    #[test]
    fn slicing_and_concat() {
        let v = bv("11010010");
        assert_eq!(v.slice(7, 4), bv("1101"));
        assert_eq!(v.bit(1), Logic::One);
        assert_eq!(v.bit(20), Logic::X);
        assert_eq!(BitVec::concat(&[bv("10"), bv("01")]), bv("1001"));
        assert_eq!(bv("10").replicate(3), Some(bv("101010")));
        assert_eq!(bv("1").replicate(MAX_WIDTH).map(|v| v.width()), Some(MAX_WIDTH));
        assert_eq!(bv("10").replicate(MAX_WIDTH), None);
        assert_eq!(bv("1").replicate(u32::MAX), None);
    }

    #[test]
    fn write_slice_updates_range() {
        let mut v = BitVec::zeros(8);
        v.write_slice(5, 2, &bv("1111"));
        assert_eq!(v, bv("00111100"));
    }

    #[test]
    fn reductions_and_truth() {
        assert_eq!(bv("111").reduce_and(), Logic::One);
        assert_eq!(bv("100").reduce_xor(), Logic::One);
        assert_eq!(bv("000").reduce_or(), Logic::Zero);
        assert_eq!(bv("0x0").truth(), Logic::X);
        assert_eq!(bv("0x1").truth(), Logic::One);
    }

    #[test]
    fn hex_rendering() {
        assert_eq!(BitVec::from_u64(0xA5, 8).to_hex_string(), "a5");
        assert_eq!(BitVec::from_u64(5, 3).to_hex_string(), "5");
        assert_eq!(bv("x0001").to_hex_string(), "x1");
        assert_eq!(BitVec::unknown(4).to_hex_string(), "x");
    }
}
