//! Error types and result utilities for buffer and stream operations.

use thiserror::Error;

/// Convenience type alias for results that may contain [`SampleStreamError`].
pub type SampleStreamResult<T> = Result<T, SampleStreamError>;

/// Error types that can occur during buffer and stream operations.
///
/// End-of-stream is never reported through this enum: sources and sinks
/// signal exhaustion and closure through short read/write counts, and
/// callers are expected to check returned counts. Every variant below is
/// unrecoverable at the point it is raised and propagates to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleStreamError {
    /// Arithmetic was attempted between buffers tagged with different rates.
    #[error("sample rate mismatch: {left} vs {right}")]
    RateMismatch {
        /// Rate of the left-hand operand.
        left: f64,
        /// Rate of the right-hand operand.
        right: f64,
    },

    /// A time or frequency quantity was given where a rate is required to
    /// interpret it, and none was available.
    #[error("cannot interpret {quantity} without a rate")]
    UnknownRate {
        /// Display form of the offending quantity.
        quantity: String,
    },

    /// A channel mapping with more than one channel on both sides was
    /// requested. Only mono fan-out and fan-in mappings are defined.
    #[error("unsupported channel mapping: {from} -> {to} channels")]
    UnsupportedChannelMapping {
        /// Channel count of the source side.
        from: usize,
        /// Channel count of the sink side.
        to: usize,
    },

    /// A down-mix over zero input channels was attempted.
    #[error("down-mix requires at least one input channel")]
    ZeroChannelSource,

    /// A direct read or write was attempted between endpoints whose formats
    /// do not match. Format coercion only happens in the stream copy layer;
    /// the low-level primitives never coerce silently.
    #[error("format mismatch: expected {expected}, got {actual}")]
    FormatMismatch {
        /// Format the operation required.
        expected: String,
        /// Format that was actually supplied.
        actual: String,
    },

    /// Array dimensions do not match the expected shape.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// An invalid argument was supplied to an operation.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A processing backend failed while performing an operation.
    #[error("processing error in {stage}: {reason}")]
    Processing {
        /// The processing stage that failed.
        stage: &'static str,
        /// Backend-provided failure description.
        reason: String,
    },
}

impl SampleStreamError {
    /// Create an [`SampleStreamError::InvalidParameter`] error.
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Create a [`SampleStreamError::Processing`] error.
    pub fn processing(stage: &'static str, reason: impl Into<String>) -> Self {
        Self::Processing {
            stage,
            reason: reason.into(),
        }
    }

    /// Create a [`SampleStreamError::FormatMismatch`] error from the display
    /// forms of the two formats involved.
    pub fn format_mismatch(
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::FormatMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
