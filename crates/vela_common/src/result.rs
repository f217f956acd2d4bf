//! Internal error type.

/// Result of an operation that can only fail because of a bug in Vela.
///
/// Problems in user input are never reported through this type. They become
/// diagnostics and the operation still returns `Ok`.
pub type VelaResult<T> = Result<T, InternalError>;

/// A broken internal invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// What went wrong.
    pub message: String,
}

impl InternalError {
    /// Creates an internal error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("scope stack underflow");
        assert_eq!(err.to_string(), "internal error: scope stack underflow");
    }

    #[test]
    fn question_mark_converts_strings() {
        fn fails() -> VelaResult<()> {
            Err::<(), _>(String::from("boom"))?;
            Ok(())
        }
        assert_eq!(fails().unwrap_err().message, "boom");
    }
}
