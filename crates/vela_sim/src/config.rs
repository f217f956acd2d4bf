//! Simulation run configuration.

use serde::{Deserialize, Serialize};
use vela_config::{SimulationOptions, TimeUnit};

/// When a run stops if `$finish` never executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Horizon {
    /// Stop after this simulated time.
    Time(u64),
    /// Stop after this many stimulus events.
    Events(usize),
}

/// Settings of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Stopping point.
    pub horizon: Horizon,
    /// Hard cap on scheduled stimulus events.
    pub max_events: usize,
    /// Unit reported when the testbench has no `` `timescale``.
    pub time_unit: TimeUnit,
    /// Names preferred as the clock when a block has several edge events.
    pub clock_names: Vec<String>,
    /// Names accepted as a reset when the reset is not in the sensitivity list.
    pub reset_names: Vec<String>,
}

impl SimConfig {
    /// Configuration with a given horizon and default everything else.
    pub fn with_horizon(horizon: Horizon) -> Self {
        Self {
            horizon,
            ..Self::default()
        }
    }

    /// Time limit, if the horizon is a time.
    pub fn time_limit(&self) -> Option<u64> {
        match self.horizon {
            Horizon::Time(t) => Some(t),
            Horizon::Events(_) => None,
        }
    }

    /// Number of stimulus events to schedule at most.
    pub fn event_limit(&self) -> usize {
        match self.horizon {
            Horizon::Time(_) => self.max_events,
            Horizon::Events(n) => n.min(self.max_events),
        }
    }

    pub(crate) fn is_clock_name(&self, name: &str) -> bool {
        self.clock_names.iter().any(|c| c == name)
    }

    pub(crate) fn is_reset_name(&self, name: &str) -> bool {
        self.reset_names.iter().any(|r| r == name)
    }
}

impl From<&SimulationOptions> for SimConfig {
    fn from(opts: &SimulationOptions) -> Self {
        Self {
            horizon: Horizon::Time(opts.horizon),
            max_events: opts.max_events,
            time_unit: opts.time_unit,
            clock_names: opts.clock_names.clone(),
            reset_names: opts.reset_names.clone(),
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from(&SimulationOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_options() {
        let opts = SimulationOptions {
            horizon: 250,
            max_events: 10,
            ..SimulationOptions::default()
        };
        let cfg = SimConfig::from(&opts);
        assert_eq!(cfg.horizon, Horizon::Time(250));
        assert_eq!(cfg.time_limit(), Some(250));
        assert_eq!(cfg.event_limit(), 10);
        assert!(cfg.is_clock_name("clk"));
        assert!(cfg.is_reset_name("rst_n"));
    }

    #[test]
    fn event_horizon_is_capped() {
        let mut cfg = SimConfig::with_horizon(Horizon::Events(500));
        cfg.max_events = 100;
        assert_eq!(cfg.time_limit(), None);
        assert_eq!(cfg.event_limit(), 100);
    }
}
