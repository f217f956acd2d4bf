//! Configuration types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root of a `vela.toml` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelaConfig {
    /// Front-end options.
    pub compile: CompileOptions,
    /// Simulator options.
    pub simulation: SimulationOptions,
}

/// Options for [`compile`](../vela_analyze/fn.compile.html).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Run the line-based syntax fixer before lexing.
    pub auto_fix: bool,
    /// Stop reporting after this many errors. `0` means unlimited.
    pub max_errors: usize,
}

/// Options for the testbench simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    /// Last simulated time, in time units.
    pub horizon: u64,
    /// Upper bound on scheduled stimulus events.
    pub max_events: usize,
    /// Unit used when the testbench has no `` `timescale``.
    pub time_unit: TimeUnit,
    /// Names recognized as clocks when no `forever` toggle identifies one.
    pub clock_names: Vec<String>,
    /// Names recognized as resets. Names ending in `_n` are active low.
    pub reset_names: Vec<String>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            horizon: 1000,
            max_events: 100_000,
            time_unit: TimeUnit::Ns,
            clock_names: vec!["clk".into(), "clock".into()],
            reset_names: vec![
                "reset".into(),
                "rst".into(),
                "rst_n".into(),
                "reset_n".into(),
            ],
        }
    }
}

/// Simulation time unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Seconds.
    S,
    /// Milliseconds.
    Ms,
    /// Microseconds.
    Us,
    /// Nanoseconds.
    #[default]
    Ns,
    /// Picoseconds.
    Ps,
    /// Femtoseconds.
    Fs,
}

impl TimeUnit {
    /// Parses the unit part of a `` `timescale`` argument such as `"1ns"`.
    pub fn from_timescale(text: &str) -> Option<Self> {
        let unit = text.trim().trim_start_matches(|c: char| c.is_ascii_digit());
        match unit.trim() {
            "s" => Some(TimeUnit::S),
            "ms" => Some(TimeUnit::Ms),
            "us" => Some(TimeUnit::Us),
            "ns" => Some(TimeUnit::Ns),
            "ps" => Some(TimeUnit::Ps),
            "fs" => Some(TimeUnit::Fs),
            _ => None,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeUnit::S => "s",
            TimeUnit::Ms => "ms",
            TimeUnit::Us => "us",
            TimeUnit::Ns => "ns",
            TimeUnit::Ps => "ps",
            TimeUnit::Fs => "fs",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = VelaConfig::default();
        assert!(!cfg.compile.auto_fix);
        assert_eq!(cfg.simulation.horizon, 1000);
        assert_eq!(cfg.simulation.time_unit, TimeUnit::Ns);
        assert!(cfg.simulation.reset_names.iter().any(|n| n == "rst_n"));
    }

    #[test]
    fn timescale_units() {
        assert_eq!(TimeUnit::from_timescale("1ns"), Some(TimeUnit::Ns));
        assert_eq!(TimeUnit::from_timescale("10 ps"), Some(TimeUnit::Ps));
        assert_eq!(TimeUnit::from_timescale("1 parsec"), None);
        assert_eq!(TimeUnit::Us.to_string(), "us");
    }
}
