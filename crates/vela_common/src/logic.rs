//! Four-state scalar logic values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// A single Verilog bit: `0`, `1`, unknown `x`, or high-impedance `z`.
///
/// Every binary operator treats `z` inputs as `x`. `0` dominates AND and `1`
/// dominates OR, as in the Verilog truth tables.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum Logic {
    /// Driven low.
    Zero,
    /// Driven high.
    One,
    /// Unknown. Registers start here.
    #[default]
    X,
    /// Undriven.
    Z,
}

impl Logic {
    /// Parses a digit character of a binary literal.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Logic::Zero),
            '1' => Some(Logic::One),
            'x' | 'X' => Some(Logic::X),
            'z' | 'Z' | '?' => Some(Logic::Z),
            _ => None,
        }
    }

    /// Converts a boolean to `One` or `Zero`.
    pub fn from_bool(b: bool) -> Self {
        if b {
            Logic::One
        } else {
            Logic::Zero
        }
    }

    /// Returns the boolean value, or `None` for `x`/`z`.
    pub fn to_bool(self) -> Option<bool> {
        match self {
            Logic::Zero => Some(false),
            Logic::One => Some(true),
            Logic::X | Logic::Z => None,
        }
    }

    /// Returns `true` for `0` and `1`.
    pub fn is_known(self) -> bool {
        matches!(self, Logic::Zero | Logic::One)
    }

    /// The lowercase character used in waveform dumps.
    pub fn to_char(self) -> char {
        match self {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::X => 'x',
            Logic::Z => 'z',
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl BitAnd for Logic {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Logic::Zero, _) | (_, Logic::Zero) => Logic::Zero,
            (Logic::One, Logic::One) => Logic::One,
            _ => Logic::X,
        }
    }
}

impl BitOr for Logic {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Logic::One, _) | (_, Logic::One) => Logic::One,
            (Logic::Zero, Logic::Zero) => Logic::Zero,
            _ => Logic::X,
        }
    }
}

impl BitXor for Logic {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        match (self.to_bool(), rhs.to_bool()) {
            (Some(a), Some(b)) => Logic::from_bool(a != b),
            _ => Logic::X,
        }
    }
}

impl Not for Logic {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Logic::Zero => Logic::One,
            Logic::One => Logic::Zero,
            Logic::X | Logic::Z => Logic::X,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Logic::{self, *};

    #[test]
    fn zero_dominates_and() {
        for v in [Zero, One, X, Z] {
            assert_eq!(Zero & v, Zero);
            assert_eq!(v & Zero, Zero);
        }
        assert_eq!(One & One, One);
        assert_eq!(One & Z, X);
    }

    #[test]
    fn one_dominates_or() {
        for v in [Zero, One, X, Z] {
            assert_eq!(One | v, One);
            assert_eq!(v | One, One);
        }
        assert_eq!(Zero | Zero, Zero);
        assert_eq!(Zero | X, X);
    }

    #[test]
    fn xor_unknown_propagates() {
        assert_eq!(One ^ Zero, One);
        assert_eq!(One ^ One, Zero);
        assert_eq!(X ^ Zero, X);
        assert_eq!(Z ^ One, X);
    }

    #[test]
    fn not_of_z_is_x() {
        assert_eq!(!Zero, One);
        assert_eq!(!One, Zero);
        assert_eq!(!Z, X);
    }

    #[test]
    fn default_is_unknown() {
        assert_eq!(Logic::default(), X);
        assert!(!X.is_known());
        assert_eq!(One.to_bool(), Some(true));
    }

    #[test]
    fn char_conversions() {
        assert_eq!(Logic::from_char('?'), Some(Z));
        assert_eq!(Logic::from_char('2'), None);
        assert_eq!(X.to_string(), "x");
    }
}
