//! Core sample-type traits and the conversion matrix.
//!
//! Every element type a buffer or stream can carry implements [`Sample`],
//! which bundles the numeric, layout, and serialization capabilities the
//! rest of the crate relies on, together with the full conversion matrix
//! between the supported formats.
//!
//! ## Conversion behaviour
//!
//! - **Integer ↔ integer**: bit-shift scaling that preserves the full
//!   dynamic range of the narrower type.
//! - **Integer ↔ float**: normalized scaling; floats carry audio in the
//!   `[-1.0, 1.0]` range.
//! - **Float → integer**: the input is clamped to `[-1.0, 1.0]` before
//!   scaling, so out-of-range values saturate at the integer extremes
//!   instead of wrapping.
//! - **Float ↔ float**: direct precision cast.

use bytemuck::NoUninit;
use num_traits::{FromPrimitive, Num, NumCast, Signed};
use serde::{Deserialize, Serialize};

use crate::SampleStreamResult;
use std::fmt::{Debug, Display};

/// Runtime tag for the closed set of supported sample element types.
///
/// This is the `dtype` axis of an endpoint format: two endpoints can only
/// exchange raw blocks when their tags match (along with rate and channel
/// count). The set is closed on purpose; adapters switch over it rather
/// than over an open type hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleFormat {
    /// 16-bit signed integer samples.
    I16,
    /// 32-bit signed integer samples.
    I32,
    /// 32-bit floating-point samples, nominally in `[-1.0, 1.0]`.
    F32,
    /// 64-bit floating-point samples, nominally in `[-1.0, 1.0]`.
    F64,
}

impl SampleFormat {
    /// Bit width of one sample in this format.
    pub const fn bits(self) -> u8 {
        match self {
            SampleFormat::I16 => 16,
            SampleFormat::I32 | SampleFormat::F32 => 32,
            SampleFormat::F64 => 64,
        }
    }

    /// Returns true for the floating-point formats.
    pub const fn is_float(self) -> bool {
        matches!(self, SampleFormat::F32 | SampleFormat::F64)
    }
}

impl Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SampleFormat::I16 => "i16",
            SampleFormat::I32 => "i32",
            SampleFormat::F32 => "f32",
            SampleFormat::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// Trait for converting one sample type to another with proper scaling.
///
/// Conversions are audio-aware: they rescale between bit depths and between
/// integer and normalized-float representations, rather than casting raw
/// numeric values. Use [`ConvertFrom`] for the inverse direction in generic
/// code.
///
/// ## Example
/// ```rust
/// use sample_streams::ConvertTo;
///
/// let sample: i16 = 16384; // half of i16::MAX
/// let as_float: f32 = sample.convert_to().unwrap();
/// assert!((as_float - 0.5).abs() < 1e-4);
/// ```
pub trait ConvertTo<T> {
    /// Convert this sample to the target sample type.
    fn convert_to(&self) -> SampleStreamResult<T>;
}

/// Reverse-direction counterpart of [`ConvertTo`].
///
/// Implemented blanket-wise for every pair the conversion matrix covers, so
/// generic code can write `T::convert_from(x)` without naming the source
/// type in a where-clause.
pub trait ConvertFrom<S>: Sized {
    /// Convert a sample of the source type into this type.
    fn convert_from(value: S) -> SampleStreamResult<Self>;
}

impl<S, T> ConvertFrom<S> for T
where
    S: ConvertTo<T>,
{
    #[inline(always)]
    fn convert_from(value: S) -> SampleStreamResult<T> {
        value.convert_to()
    }
}

/// Core trait defining the interface for sample element types.
///
/// Provides a unified interface over the supported formats (`i16`, `i32`,
/// `f32`, `f64`): type-safe conversions between all of them, the numeric
/// operations buffers need, safe byte views of contiguous storage, and the
/// runtime [`SampleFormat`] tag used by the stream layer.
///
/// The trait is sealed in practice by its conversion-matrix supertraits;
/// it is implemented exactly for the types in
/// [`SUPPORTED_DTYPES`](crate::SUPPORTED_DTYPES).
pub trait Sample:
    Copy
    + Sized
    + Default
    + Debug
    + Display
    + Send
    + Sync
    + PartialEq
    + PartialOrd
    + Num
    + NumCast
    + Signed
    + FromPrimitive
    + NoUninit
    + Serialize
    + Deserialize<'static>
    + ConvertTo<Self>
    + ConvertTo<i16>
    + ConvertTo<i32>
    + ConvertTo<f32>
    + ConvertTo<f64>
    + ConvertFrom<i16>
    + ConvertFrom<i32>
    + ConvertFrom<f32>
    + ConvertFrom<f64>
{
    /// Maximum representable sample value (full-scale positive).
    const MAX: Self;
    /// Minimum representable sample value (full-scale negative).
    const MIN: Self;
    /// Bit depth of this sample type.
    const BITS: u8;
    /// Runtime format tag for this sample type.
    const FORMAT: SampleFormat;

    /// Convert a slice of samples into a native-endian byte vector.
    #[inline]
    fn slice_to_bytes(samples: &[Self]) -> Vec<u8> {
        Vec::from(bytemuck::cast_slice(samples))
    }
}

// ========================
// Conversion macros
// ========================

/// Identity conversion (same type to same type). Exact, always succeeds.
macro_rules! impl_identity_conversion {
    ($type:ty) => {
        impl ConvertTo<$type> for $type {
            #[inline(always)]
            fn convert_to(&self) -> SampleStreamResult<$type> {
                Ok(*self)
            }
        }
    };
}

/// Integer-to-integer conversion via bit shifts, preserving dynamic range.
macro_rules! impl_int_to_int_conversion {
    ($from:ty => $to:ty, shl $shift:expr) => {
        impl ConvertTo<$to> for $from {
            #[inline(always)]
            fn convert_to(&self) -> SampleStreamResult<$to> {
                Ok(((*self as $to) << $shift) as $to)
            }
        }
    };
    ($from:ty => $to:ty, shr $shift:expr) => {
        impl ConvertTo<$to> for $from {
            #[inline(always)]
            fn convert_to(&self) -> SampleStreamResult<$to> {
                Ok((*self >> $shift) as $to)
            }
        }
    };
}

/// Integer-to-float conversion with normalized, asymmetric scaling.
///
/// Negative values divide by `-MIN` and non-negative values by `MAX`, so
/// both endpoints of the integer range land exactly on -1.0 and 1.0.
macro_rules! impl_int_to_float_conversion {
    ($from:ty => $to:ty) => {
        impl ConvertTo<$to> for $from {
            #[inline(always)]
            fn convert_to(&self) -> SampleStreamResult<$to> {
                if *self < 0 {
                    Ok((*self as $to) / (-(<$from>::MIN as $to)))
                } else {
                    Ok((*self as $to) / (<$from>::MAX as $to))
                }
            }
        }
    };
}

/// Float-to-integer conversion: clamp to `[-1.0, 1.0]`, scale, round.
///
/// The clamp makes the conversion saturating: out-of-range float input maps
/// to the integer extremes instead of wrapping.
macro_rules! impl_float_to_int_conversion {
    ($from:ty => $to:ty) => {
        impl ConvertTo<$to> for $from {
            #[inline(always)]
            fn convert_to(&self) -> SampleStreamResult<$to> {
                let clamped = self.clamp(-1.0, 1.0);
                if clamped < 0.0 {
                    Ok((clamped * (-(<$to>::MIN as $from))).round() as $to)
                } else {
                    Ok((clamped * (<$to>::MAX as $from)).round() as $to)
                }
            }
        }
    };
}

/// Float-to-float conversion via a precision cast.
macro_rules! impl_float_to_float_conversion {
    ($from:ty => $to:ty) => {
        impl ConvertTo<$to> for $from {
            #[inline(always)]
            fn convert_to(&self) -> SampleStreamResult<$to> {
                Ok(*self as $to)
            }
        }
    };
}

// ========================
// Sample implementations
// ========================

impl Sample for i16 {
    const MAX: Self = i16::MAX;
    const MIN: Self = i16::MIN;
    const BITS: u8 = 16;
    const FORMAT: SampleFormat = SampleFormat::I16;
}

impl Sample for i32 {
    const MAX: Self = i32::MAX;
    const MIN: Self = i32::MIN;
    const BITS: u8 = 32;
    const FORMAT: SampleFormat = SampleFormat::I32;
}

impl Sample for f32 {
    const MAX: Self = 1.0;
    const MIN: Self = -1.0;
    const BITS: u8 = 32;
    const FORMAT: SampleFormat = SampleFormat::F32;
}

impl Sample for f64 {
    const MAX: Self = 1.0;
    const MIN: Self = -1.0;
    const BITS: u8 = 64;
    const FORMAT: SampleFormat = SampleFormat::F64;
}

// ========================
// Generate the matrix
// ========================

impl_identity_conversion!(i16);
impl_identity_conversion!(i32);
impl_identity_conversion!(f32);
impl_identity_conversion!(f64);

impl_int_to_int_conversion!(i16 => i32, shl 16);
impl_int_to_int_conversion!(i32 => i16, shr 16);

impl_int_to_float_conversion!(i16 => f32);
impl_int_to_float_conversion!(i16 => f64);
impl_int_to_float_conversion!(i32 => f32);
impl_int_to_float_conversion!(i32 => f64);

impl_float_to_int_conversion!(f32 => i16);
impl_float_to_int_conversion!(f32 => i32);
impl_float_to_int_conversion!(f64 => i16);
impl_float_to_int_conversion!(f64 => i32);

impl_float_to_float_conversion!(f32 => f64);
impl_float_to_float_conversion!(f64 => f32);
