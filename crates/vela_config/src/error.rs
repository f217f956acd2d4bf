//! Configuration errors.

/// Errors from parsing or validating a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The TOML text is malformed or has fields of the wrong type.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A value is well-typed but out of range.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let e = ConfigError::ParseError("expected '=' at line 2".into());
        assert_eq!(e.to_string(), "failed to parse configuration: expected '=' at line 2");
        let e = ConfigError::ValidationError("simulation.horizon must be positive".into());
        assert_eq!(e.to_string(), "validation error: simulation.horizon must be positive");
    }
}
