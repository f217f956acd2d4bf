//! The signal-state table of one simulation run.
//!
//! Testbench nets and device internals share one flat namespace indexed by
//! [`SimSignalId`]. Device ports are not separate entries: they resolve to
//! the testbench net they connect to.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vela_common::BitVec;

/// Index of a signal in the flat table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct SimSignalId(u32);

impl SimSignalId {
    /// Creates an id from a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a signal comes from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SignalRole {
    /// A testbench `reg` or `integer`, driven by timed statements.
    Stimulus,
    /// A testbench `wire`, observed from the device.
    Observed,
    /// A signal inside a device instance, named `<instance>.<name>`.
    Internal,
}

/// Static description of a tracked signal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimSignal {
    /// Flat name.
    pub name: String,
    /// Bit width.
    pub width: u32,
    /// Origin.
    pub role: SignalRole,
}

/// Signals and their current values.
#[derive(Clone, Debug, Default)]
pub struct SignalTable {
    signals: Vec<SimSignal>,
    values: Vec<BitVec>,
    by_name: HashMap<String, SimSignalId>,
}

impl SignalTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a signal starting at all-`x`.
    pub fn add(&mut self, name: impl Into<String>, width: u32, role: SignalRole) -> SimSignalId {
        let name = name.into();
        let id = SimSignalId(self.signals.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.values.push(BitVec::unknown(width));
        self.signals.push(SimSignal { name, width, role });
        id
    }

    /// Finds a signal by flat name.
    pub fn find(&self, name: &str) -> Option<SimSignalId> {
        self.by_name.get(name).copied()
    }

    /// Static description of `id`.
    pub fn signal(&self, id: SimSignalId) -> &SimSignal {
        &self.signals[id.index()]
    }

    /// All signals in creation order.
    pub fn signals(&self) -> &[SimSignal] {
        &self.signals
    }

    /// Current value of `id`.
    pub fn value(&self, id: SimSignalId) -> &BitVec {
        &self.values[id.index()]
    }

    /// All current values, indexed by [`SimSignalId`].
    pub fn values(&self) -> &[BitVec] {
        &self.values
    }

    /// Mutable access to all current values.
    pub fn values_mut(&mut self) -> &mut [BitVec] {
        &mut self.values
    }

    /// Number of signals.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// `true` if no signal was added.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
