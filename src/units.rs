//! Unit-tagged quantities and frame/time/frequency conversion.
//!
//! Amounts handed to the buffer and stream APIs carry an explicit unit tag
//! ([`Quantity`]) instead of relying on operator-overloaded unit
//! arithmetic. The conversion functions here translate a tagged amount into
//! a plain frame count (or back into seconds / Hz) given the rate of the
//! signal it refers to.
//!
//! A "rate" is samples-per-second for time-domain signals and
//! seconds-per-bin for frequency-domain signals; in both senses the forward
//! conversion is `value * rate`.
//!
//! ## Rounding policy
//!
//! Fractional frame counts round to the nearest integer with ties away from
//! zero (`f64::round`). This is pinned by tests because frame counts feed
//! indexing.
//!
//! ## Examples
//!
//! ```rust
//! use sample_streams::{frames_from, seconds_from, hz_from, Quantity};
//!
//! assert_eq!(frames_from(Quantity::seconds(0.5), Some(44_100.0)).unwrap(), 22_050);
//! assert_eq!(hz_from(Quantity::khz(1.0), None).unwrap(), 1000.0);
//! assert_eq!(seconds_from(Quantity::frames(441), Some(44_100.0)).unwrap(), 0.01);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::{SampleStreamError, SampleStreamResult};

/// Relative tolerance used when comparing two rates for equality.
const RATE_EPSILON: f64 = 1e-9;

/// A numeric amount tagged with the unit it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Quantity {
    /// A plain frame count; needs no rate to interpret.
    Frames(usize),
    /// A duration in seconds; needs a samples-per-second rate.
    Seconds(f64),
    /// A frequency in hertz; needs a seconds-per-bin rate to become a bin
    /// index.
    Hertz(f64),
}

impl Quantity {
    /// A frame count.
    pub const fn frames(count: usize) -> Self {
        Quantity::Frames(count)
    }

    /// A duration in seconds.
    pub const fn seconds(value: f64) -> Self {
        Quantity::Seconds(value)
    }

    /// A duration in milliseconds.
    pub fn ms(value: f64) -> Self {
        Quantity::Seconds(value / 1000.0)
    }

    /// A frequency in hertz.
    pub const fn hz(value: f64) -> Self {
        Quantity::Hertz(value)
    }

    /// A frequency in kilohertz.
    pub fn khz(value: f64) -> Self {
        Quantity::Hertz(value * 1000.0)
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quantity::Frames(n) => write!(f, "{n} frames"),
            Quantity::Seconds(s) => write!(f, "{s} s"),
            Quantity::Hertz(h) => write!(f, "{h} Hz"),
        }
    }
}

/// Returns true when two rates are equal within a relative tolerance.
///
/// Rates are `f64` throughout the crate (spectral rates are fractional), so
/// every rate-equality decision goes through this comparison rather than
/// `==`.
pub fn rates_match(a: f64, b: f64) -> bool {
    (a - b).abs() <= RATE_EPSILON * a.abs().max(b.abs()).max(1.0)
}

fn require_rate(quantity: Quantity, rate: Option<f64>) -> SampleStreamResult<f64> {
    match rate {
        Some(r) if r > 0.0 && r.is_finite() => Ok(r),
        Some(r) => Err(SampleStreamError::invalid_parameter(
            "rate",
            format!("rate must be positive and finite, got {r}"),
        )),
        None => Err(SampleStreamError::UnknownRate {
            quantity: quantity.to_string(),
        }),
    }
}

fn scaled_frames(quantity: Quantity, value: f64, rate: f64) -> SampleStreamResult<usize> {
    let frames = value * rate;
    if !frames.is_finite() || frames < 0.0 {
        return Err(SampleStreamError::invalid_parameter(
            "quantity",
            format!("{quantity} does not describe a non-negative frame count"),
        ));
    }
    Ok(frames.round() as usize)
}

/// Converts a tagged quantity into a plain frame count.
///
/// [`Quantity::Frames`] passes through unchanged and needs no rate. Time
/// and frequency quantities multiply by the rate (samples-per-second or
/// seconds-per-bin respectively) and round to the nearest frame, ties away
/// from zero. A unit-bearing quantity without a rate fails with
/// [`SampleStreamError::UnknownRate`].
pub fn frames_from(quantity: Quantity, rate: Option<f64>) -> SampleStreamResult<usize> {
    match quantity {
        Quantity::Frames(n) => Ok(n),
        Quantity::Seconds(s) => {
            let rate = require_rate(quantity, rate)?;
            scaled_frames(quantity, s, rate)
        }
        Quantity::Hertz(h) => {
            let rate = require_rate(quantity, rate)?;
            scaled_frames(quantity, h, rate)
        }
    }
}

/// Converts a tagged quantity into seconds.
///
/// [`Quantity::Seconds`] is the identity. Frame counts divide by a
/// samples-per-second rate; frequencies invert into a period.
pub fn seconds_from(quantity: Quantity, rate: Option<f64>) -> SampleStreamResult<f64> {
    match quantity {
        Quantity::Seconds(s) => Ok(s),
        Quantity::Frames(n) => {
            let rate = require_rate(quantity, rate)?;
            Ok(n as f64 / rate)
        }
        Quantity::Hertz(h) => {
            if h == 0.0 {
                return Err(SampleStreamError::invalid_parameter(
                    "quantity",
                    "cannot take the period of 0 Hz",
                ));
            }
            Ok(1.0 / h)
        }
    }
}

/// Converts a tagged quantity into hertz.
///
/// [`Quantity::Hertz`] is the identity. Bin indices divide by a
/// seconds-per-bin (spectral) rate; durations invert into a frequency.
pub fn hz_from(quantity: Quantity, rate: Option<f64>) -> SampleStreamResult<f64> {
    match quantity {
        Quantity::Hertz(h) => Ok(h),
        Quantity::Frames(n) => {
            let rate = require_rate(quantity, rate)?;
            Ok(n as f64 / rate)
        }
        Quantity::Seconds(s) => {
            if s == 0.0 {
                return Err(SampleStreamError::invalid_parameter(
                    "quantity",
                    "cannot take the frequency of a zero-length period",
                ));
            }
            Ok(1.0 / s)
        }
    }
}
