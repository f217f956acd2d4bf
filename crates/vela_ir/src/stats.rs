//! Declaration statistics and the complexity score.

use serde::{Deserialize, Serialize};

/// Counts of declarations and items in one module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleStatistics {
    /// Ports in the header or body.
    pub ports: usize,
    /// `wire` declarations.
    pub wires: usize,
    /// `reg` and `integer` declarations, including `reg` ports.
    pub regs: usize,
    /// `parameter` and `localparam` declarations.
    pub parameters: usize,
    /// Continuous assignments.
    pub assigns: usize,
    /// `always` blocks.
    pub always_blocks: usize,
    /// `initial` blocks.
    pub initial_blocks: usize,
    /// Module instances.
    pub instances: usize,
}

const PORT_WEIGHT: f64 = 1.0;
const WIRE_WEIGHT: f64 = 0.5;
const REG_WEIGHT: f64 = 0.7;
const ASSIGN_WEIGHT: f64 = 1.2;
const ALWAYS_WEIGHT: f64 = 2.0;
const STATEMENT_WEIGHT: f64 = 1.0;
const OPERATOR_WEIGHT: f64 = 0.5;
const DISTINCT_OPERATOR_WEIGHT: f64 = 1.5;
const NESTING_WEIGHT: f64 = 2.0;

/// Weighted sum of size and structure metrics, rounded to two decimals.
///
/// Every weight is non-negative, so growing any input never lowers the score.
pub fn complexity_score(
    stats: &ModuleStatistics,
    statements: usize,
    operator_occurrences: usize,
    distinct_operators: usize,
    max_nesting: u32,
) -> f64 {
    let raw = stats.ports as f64 * PORT_WEIGHT
        + stats.wires as f64 * WIRE_WEIGHT
        + stats.regs as f64 * REG_WEIGHT
        + stats.assigns as f64 * ASSIGN_WEIGHT
        + stats.always_blocks as f64 * ALWAYS_WEIGHT
        + statements as f64 * STATEMENT_WEIGHT
        + operator_occurrences as f64 * OPERATOR_WEIGHT
        + distinct_operators as f64 * DISTINCT_OPERATOR_WEIGHT
        + f64::from(max_nesting) * NESTING_WEIGHT;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_module_scores_zero() {
        assert_eq!(complexity_score(&ModuleStatistics::default(), 0, 0, 0, 0), 0.0);
    }

    #[test]
    fn weights_apply() {
        let stats = ModuleStatistics {
            ports: 3,
            wires: 1,
            regs: 1,
            assigns: 1,
            always_blocks: 1,
            ..Default::default()
        };
        // 3 + 0.5 + 0.7 + 1.2 + 2 + 4 + 1 + 3 + 4
        assert_eq!(complexity_score(&stats, 4, 2, 2, 2), 19.4);
    }

    #[test]
    fn monotone_in_each_input() {
        let stats = ModuleStatistics::default();
        let base = complexity_score(&stats, 5, 5, 2, 1);
        assert!(complexity_score(&stats, 6, 5, 2, 1) > base);
        assert!(complexity_score(&stats, 5, 6, 2, 1) > base);
        assert!(complexity_score(&stats, 5, 5, 3, 1) > base);
        assert!(complexity_score(&stats, 5, 5, 2, 2) > base);
    }
}
