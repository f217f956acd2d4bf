//! Parsing and validation of configuration text.

use crate::error::ConfigError;
use crate::types::VelaConfig;

/// Parses a `vela.toml` document and validates it.
pub fn load_config_from_str(content: &str) -> Result<VelaConfig, ConfigError> {
    let config: VelaConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &VelaConfig) -> Result<(), ConfigError> {
    let sim = &config.simulation;
    if sim.horizon == 0 {
        return Err(ConfigError::ValidationError(
            "simulation.horizon must be positive".into(),
        ));
    }
    if sim.max_events == 0 {
        return Err(ConfigError::ValidationError(
            "simulation.max_events must be positive".into(),
        ));
    }
    if let Some(empty) = sim
        .clock_names
        .iter()
        .chain(&sim.reset_names)
        .find(|n| n.trim().is_empty())
    {
        return Err(ConfigError::ValidationError(format!(
            "empty signal name {empty:?} in simulation names"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeUnit;

    #[test]
    fn empty_document_is_default() {
        let cfg = load_config_from_str("").unwrap();
        assert_eq!(cfg, VelaConfig::default());
    }

    #[test]
    fn full_document() {
        let cfg = load_config_from_str(
            r#"
[compile]
auto_fix = true
max_errors = 20

[simulation]
horizon = 250
max_events = 500
time_unit = "ps"
clock_names = ["sys_clk"]
reset_names = ["arst_n"]
"#,
        )
        .unwrap();
        assert!(cfg.compile.auto_fix);
        assert_eq!(cfg.compile.max_errors, 20);
        assert_eq!(cfg.simulation.horizon, 250);
        assert_eq!(cfg.simulation.max_events, 500);
        assert_eq!(cfg.simulation.time_unit, TimeUnit::Ps);
        assert_eq!(cfg.simulation.clock_names, ["sys_clk"]);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = load_config_from_str("[simulation]\nhorizon = 40\n").unwrap();
        assert_eq!(cfg.simulation.horizon, 40);
        assert_eq!(cfg.simulation.max_events, 100_000);
    }

    #[test]
    fn zero_horizon_rejected() {
        let err = load_config_from_str("[simulation]\nhorizon = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn wrong_type_is_parse_error() {
        let err = load_config_from_str("[simulation]\nhorizon = \"long\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn unknown_time_unit_is_parse_error() {
        let err = load_config_from_str("[simulation]\ntime_unit = \"fortnight\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
