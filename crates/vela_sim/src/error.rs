//! Simulation error types.
//!
//! [`SimError`] is the internal error of evaluation and waveform output.
//! The kernel turns evaluation errors into diagnostics, so callers of
//! [`simulate`](crate::simulate) only see it from [`WaveformRecorder`]s.
//!
//! [`WaveformRecorder`]: crate::WaveformRecorder

use std::io;
use vela_common::MAX_WIDTH;

/// Errors raised while evaluating processes or writing waveforms.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A name with no signal or parameter behind it.
    #[error("unresolved signal '{name}'")]
    UnresolvedSignal {
        /// The name as written.
        name: String,
    },

    /// A construct the simulator does not model.
    #[error("unsupported: {reason}")]
    Unsupported {
        /// What was encountered.
        reason: String,
    },

    /// A select or target that cannot be written.
    #[error("invalid assignment target: {reason}")]
    InvalidTarget {
        /// Why the target is invalid.
        reason: String,
    },

    /// A replication or part-select wider than [`MAX_WIDTH`] bits.
    #[error("value of {width} bits exceeds the {} bit limit", MAX_WIDTH)]
    WidthLimit {
        /// Width the expression asked for.
        width: u64,
    },

    /// A waveform recorder was handed a signal it never registered.
    #[error("unregistered waveform signal {0}")]
    UnregisteredSignal(u32),

    /// An I/O error while writing waveform data.
    #[error("waveform I/O error: {0}")]
    WaveformIo(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_display() {
        let e = SimError::UnresolvedSignal { name: "clk".into() };
        assert_eq!(e.to_string(), "unresolved signal 'clk'");
    }

    #[test]
    fn unsupported_display() {
        let e = SimError::Unsupported {
            reason: "delay control inside an always block".into(),
        };
        assert_eq!(
            e.to_string(),
            "unsupported: delay control inside an always block"
        );
    }

    #[test]
    fn width_limit_display() {
        let e = SimError::WidthLimit { width: 100_000_000 };
        assert_eq!(
            e.to_string(),
            "value of 100000000 bits exceeds the 65536 bit limit"
        );
    }

    #[test]
    fn io_conversion() {
        let e: SimError = io::Error::new(io::ErrorKind::BrokenPipe, "closed").into();
        assert!(e.to_string().starts_with("waveform I/O error"));
    }
}
