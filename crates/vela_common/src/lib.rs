//! Shared foundational types for the Vela HDL front end and simulator.
//!
//! This crate provides interned identifiers, 4-state logic scalars, the
//! [`BitVec`] value type used by constant folding and simulation, content
//! hashing, and the internal error type.

#![warn(missing_docs)]

pub mod bits;
pub mod hash;
pub mod ident;
pub mod logic;
pub mod result;

pub use bits::{BitVec, MAX_WIDTH};
pub use hash::ContentHash;
pub use ident::{Ident, Interner};
pub use logic::Logic;
pub use result::{InternalError, VelaResult};
