// Correctness and logic
#![warn(clippy::unit_cmp)]
#![warn(clippy::match_same_arms)]
// Performance-focused
#![warn(clippy::inefficient_to_string)]
#![warn(clippy::map_clone)]
#![warn(clippy::unnecessary_to_owned)]
#![warn(clippy::needless_collect)]
// Style and idiomatic Rust
#![warn(clippy::redundant_clone)]
#![warn(clippy::needless_return)]
#![warn(clippy::manual_map)]
#![warn(clippy::unwrap_used)]
// Maintainability
#![warn(clippy::missing_panics_doc)]
#![deny(missing_docs)]

//! # sample_streams
//!
//! Sample-rate-aware multichannel buffers and streams for audio/DSP-like
//! signals, with transparent stream-to-stream format, rate, and channel
//! conversion.
//!
//! ## Overview
//!
//! The crate has two halves:
//!
//! - **Buffers** — [`SampleBuf`] (a rate-tagged, channel-major block of
//!   samples), [`SpectrumBuf`] (its frequency-domain counterpart), the
//!   [`Sample`] element-type trait with a scaling/saturating conversion
//!   matrix, and unit helpers ([`Quantity`], [`frames_from`],
//!   [`seconds_from`], [`hz_from`]).
//! - **Streams** — the [`stream`] module: [`SampleSource`]/[`SampleSink`]
//!   endpoint capabilities, single-axis adapter sinks ([`ReformatSink`],
//!   [`ResampleSink`], [`UpMixSink`], [`DownMixSink`]), and the
//!   [`write`]/[`read`] copy layer that inserts the minimum adapter chain
//!   between any two endpoints and drives the blockwise transfer.
//!
//! End-of-stream is communicated through short read/write counts, never
//! through errors; everything in [`SampleStreamError`] is a real failure.
//!
//! ## Quick start
//!
//! ### Buffers and units
//!
//! ```rust
//! use sample_streams::{frames_from, Quantity, SampleBuf};
//! use ndarray::array;
//!
//! let buf = SampleBuf::new(array![[0.1f32, 0.2, 0.3], [0.4, 0.5, 0.6]], 48_000.0).unwrap();
//! assert_eq!(buf.channels(), 2);
//! assert_eq!(buf.frames(), 3);
//!
//! assert_eq!(frames_from(Quantity::seconds(0.5), Some(44_100.0)).unwrap(), 22_050);
//! ```
//!
//! ### Copying between mismatched endpoints
//!
//! ```rust
//! use sample_streams::stream::{write, BufferSink, BufferSource};
//! use sample_streams::{Quantity, SampleBuf};
//! use ndarray::array;
//!
//! // Mono f32 at 44.1 kHz ...
//! let audio = SampleBuf::from_mono(array![0.5f32, -0.5, 0.25, -0.25], 44_100.0).unwrap();
//! let mut source = BufferSource::new(&audio);
//!
//! // ... into a stereo i16 sink at the same rate: a reformat stage and an
//! // up-mix stage are inserted automatically.
//! let mut sink = BufferSink::<i16>::new(44_100.0, 2).unwrap();
//! let moved = write(&mut sink, &mut source, None, None).unwrap();
//! assert_eq!(moved, Quantity::Frames(4));
//!
//! let collected = sink.into_buf().unwrap();
//! assert_eq!(collected.channels(), 2);
//! assert_eq!(collected.frames(), 4);
//! ```
//!
//! ## Conversion policy
//!
//! Sample-type conversions rescale between bit depths and normalized float
//! ranges; float input narrowed to a fixed-point format is clamped to the
//! representable range, never wrapped. The streaming resampler uses linear
//! interpolation with persistent phase state so chunked writes are
//! indistinguishable from a single write; the offline [`resample`] path
//! uses `rubato` when stopband quality matters more than streaming.

mod error;

pub mod buffer;
pub mod resampling;
pub mod spectral;
pub mod stream;
/// Core traits for sample element types.
pub mod traits;
pub mod units;

pub use crate::buffer::SampleBuf;
pub use crate::error::{SampleStreamError, SampleStreamResult};
pub use crate::resampling::{ResamplingQuality, resample, resample_by_ratio};
pub use crate::spectral::{SpectrumBuf, fft, ifft};
pub use crate::stream::{
    BufferSink, BufferSource, DEFAULT_BLOCK_SIZE, DownMixSink, ReformatSink, ResampleSink,
    SampleSink, SampleSource, StreamFormat, UpMixSink, read, read_into, write, write_buf,
};
pub use crate::traits::{ConvertFrom, ConvertTo, Sample, SampleFormat};
pub use crate::units::{Quantity, frames_from, hz_from, rates_match, seconds_from};

// Re-export NonZero types used in the API.
pub use core::num::NonZeroUsize;

use num_traits::{Float, NumCast};

/// Array of supported sample element types as string identifiers.
pub const SUPPORTED_DTYPES: [&str; 4] = ["i16", "i32", "f32", "f64"];

/// Marker trait for real floating-point types (`f32`, `f64`).
///
/// Used as the working precision of the offline resampler.
pub trait RealFloat: Float + NumCast + Sample + rubato::Sample {}

impl RealFloat for f32 {}
impl RealFloat for f64 {}
