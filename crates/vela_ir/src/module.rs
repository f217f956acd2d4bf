//! Per-module analysis record.

use crate::instance::InstanceInfo;
use crate::port::PortInfo;
use crate::process::ProcessSummary;
use crate::stats::ModuleStatistics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a module-level signal is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    /// A port.
    Port,
    /// A `wire`.
    Wire,
    /// A `reg`.
    Reg,
    /// An `integer`.
    Integer,
    /// A `parameter` or `localparam`.
    Parameter,
}

/// A named signal with its width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalInfo {
    /// Signal name.
    pub name: String,
    /// Bit width.
    pub width: u32,
    /// What the name denotes.
    pub kind: SignalKind,
}

/// Structural summary of one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleAnalysis {
    /// Module name.
    pub name: String,
    /// Ports in header order.
    pub ports: Vec<PortInfo>,
    /// Ports followed by body declarations, in declaration order.
    pub signals: Vec<SignalInfo>,
    /// Declaration counts.
    pub statistics: ModuleStatistics,
    /// Continuous assigns, procedural statements and case arms.
    pub statement_count: usize,
    /// Occurrences per operator symbol.
    pub operator_counts: BTreeMap<String, usize>,
    /// Deepest statement nesting; a statement directly in a process is depth 1.
    pub max_nesting_depth: u32,
    /// See [`complexity_score`](crate::complexity_score).
    pub complexity_score: f64,
    /// Child instances in source order.
    pub instances: Vec<InstanceInfo>,
    /// One entry per `always` or `initial` block, in source order.
    pub processes: Vec<ProcessSummary>,
}

impl ModuleAnalysis {
    /// A record with no contents.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ports: Vec::new(),
            signals: Vec::new(),
            statistics: ModuleStatistics::default(),
            statement_count: 0,
            operator_counts: BTreeMap::new(),
            max_nesting_depth: 0,
            complexity_score: 0.0,
            instances: Vec::new(),
            processes: Vec::new(),
        }
    }

    /// Finds a port by name.
    pub fn port(&self, name: &str) -> Option<&PortInfo> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Finds a signal by name.
    pub fn signal(&self, name: &str) -> Option<&SignalInfo> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// Number of distinct operator kinds used.
    pub fn distinct_operators(&self) -> usize {
        self.operator_counts.len()
    }

    /// Total operator occurrences.
    pub fn operator_occurrences(&self) -> usize {
        self.operator_counts.values().sum()
    }
}
