//! Summaries of `always` and `initial` blocks.

use serde::{Deserialize, Serialize};

/// How a procedural block behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessKind {
    /// Level-sensitive or `@*` always block.
    Combinational,
    /// Edge-triggered always block.
    Sequential,
    /// `initial` block.
    Initial,
}

/// A clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    /// Rising edge.
    Posedge,
    /// Falling edge.
    Negedge,
}

/// One procedural block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSummary {
    /// Behavior class.
    pub kind: ProcessKind,
    /// First edge-triggered signal of a sequential block.
    pub clock: Option<String>,
    /// Edge of `clock`.
    pub edge: Option<Edge>,
    /// Signals read, sorted.
    pub reads: Vec<String>,
    /// Signals assigned, sorted.
    pub writes: Vec<String>,
}
