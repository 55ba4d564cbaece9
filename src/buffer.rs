//! Rate-tagged multichannel sample buffers.
//!
//! [`SampleBuf`] is the crate's owned container: a 2-D array of samples
//! plus the rate that makes its frame axis meaningful. Storage is
//! channel-major — shape `(channels, frames)`, each row holding one
//! channel's samples contiguously — so per-channel slicing and the block
//! copies the stream layer performs are cache-friendly row operations.
//!
//! ## Examples
//!
//! ```rust
//! use sample_streams::SampleBuf;
//! use ndarray::array;
//!
//! // Stereo buffer: 2 channels x 3 frames.
//! let buf = SampleBuf::new(array![[0.1f32, 0.2, 0.3], [0.4, 0.5, 0.6]], 48_000.0).unwrap();
//! assert_eq!(buf.channels(), 2);
//! assert_eq!(buf.frames(), 3);
//! assert_eq!(buf[(1, 2)], 0.6);
//! ```

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut2, Axis, s};
use std::ops::{Add, Div, Index, IndexMut, Mul, Sub};

use crate::{ConvertTo, Sample, SampleStreamError, SampleStreamResult, rates_match};

/// An owned, fixed-size block of multichannel samples tagged with a rate.
///
/// The rate is samples-per-second for time-domain buffers. Invariants:
/// at least one channel, any number of frames (including zero), and a
/// positive finite rate. Samples are mutable in place; the rate changes
/// only through [`set_rate`](SampleBuf::set_rate).
#[derive(Debug, Clone)]
pub struct SampleBuf<T: Sample> {
    data: Array2<T>,
    rate: f64,
}

fn validate_rate(rate: f64) -> SampleStreamResult<f64> {
    if rate > 0.0 && rate.is_finite() {
        Ok(rate)
    } else {
        Err(SampleStreamError::invalid_parameter(
            "rate",
            format!("rate must be positive and finite, got {rate}"),
        ))
    }
}

impl<T: Sample> SampleBuf<T> {
    /// Creates a buffer from a channel-major array (rows are channels).
    ///
    /// Fails when the array has zero rows or the rate is not positive and
    /// finite.
    pub fn new(data: Array2<T>, rate: f64) -> SampleStreamResult<Self> {
        if data.nrows() == 0 {
            return Err(SampleStreamError::invalid_parameter(
                "data",
                "a buffer needs at least one channel",
            ));
        }
        Ok(Self {
            data,
            rate: validate_rate(rate)?,
        })
    }

    /// Creates a single-channel buffer from a 1-D array.
    pub fn from_mono(data: Array1<T>, rate: f64) -> SampleStreamResult<Self> {
        Self::new(data.insert_axis(Axis(0)), rate)
    }

    /// Allocates a zero-filled buffer of the given shape.
    pub fn zeroed(rate: f64, channels: usize, frames: usize) -> SampleStreamResult<Self> {
        if channels == 0 {
            return Err(SampleStreamError::invalid_parameter(
                "channels",
                "a buffer needs at least one channel",
            ));
        }
        Ok(Self {
            data: Array2::zeros((channels, frames)),
            rate: validate_rate(rate)?,
        })
    }

    /// The rate this buffer is tagged with.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Retags the buffer with a new rate without touching the samples.
    pub fn set_rate(&mut self, rate: f64) -> SampleStreamResult<()> {
        self.rate = validate_rate(rate)?;
        Ok(())
    }

    /// Number of channels (rows).
    pub fn channels(&self) -> usize {
        self.data.nrows()
    }

    /// Number of frames per channel (columns).
    pub fn frames(&self) -> usize {
        self.data.ncols()
    }

    /// Returns true when the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Duration of the buffer in seconds at its tagged rate.
    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.rate
    }

    /// Immutable view of the underlying `(channels, frames)` array.
    pub fn view(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    /// Mutable view of the underlying `(channels, frames)` array.
    pub fn view_mut(&mut self) -> ArrayViewMut2<'_, T> {
        self.data.view_mut()
    }

    /// Consumes the buffer and returns the underlying array.
    pub fn into_inner(self) -> Array2<T> {
        self.data
    }

    /// View of one channel's samples.
    ///
    /// # Panics
    /// Panics if `channel >= self.channels()`.
    pub fn channel(&self, channel: usize) -> ArrayView1<'_, T> {
        self.data.index_axis(Axis(0), channel)
    }

    /// View of the samples when the buffer is mono, `None` otherwise.
    pub fn as_mono(&self) -> Option<ArrayView1<'_, T>> {
        (self.channels() == 1).then(|| self.channel(0))
    }

    /// Shortens the buffer to at most `frames` frames.
    pub fn truncate(&mut self, frames: usize) {
        if frames < self.frames() {
            self.data = self.data.slice(s![.., ..frames]).to_owned();
        }
    }

    /// Copies `count` frames from `src` (starting at `src_offset`) into
    /// this buffer starting at `dst_offset`.
    ///
    /// Both buffers must have the same channel count; the ranges must be in
    /// bounds. Rates are not consulted — this is the raw block-copy
    /// primitive the stream endpoints are built on.
    pub fn copy_frames_from(
        &mut self,
        src: &SampleBuf<T>,
        src_offset: usize,
        dst_offset: usize,
        count: usize,
    ) -> SampleStreamResult<()> {
        if src.channels() != self.channels() {
            return Err(SampleStreamError::DimensionMismatch(format!(
                "channel count mismatch: {} vs {}",
                src.channels(),
                self.channels()
            )));
        }
        if src_offset + count > src.frames() || dst_offset + count > self.frames() {
            return Err(SampleStreamError::invalid_parameter(
                "count",
                format!(
                    "frame range out of bounds: src {}+{} of {}, dst {}+{} of {}",
                    src_offset,
                    count,
                    src.frames(),
                    dst_offset,
                    count,
                    self.frames()
                ),
            ));
        }
        self.data
            .slice_mut(s![.., dst_offset..dst_offset + count])
            .assign(&src.data.slice(s![.., src_offset..src_offset + count]));
        Ok(())
    }

    /// Native-endian byte view of the sample storage.
    ///
    /// This is the seam external format backends (codecs, device drivers)
    /// consume. Returns `None` when the storage is not contiguous in
    /// memory (it always is for buffers created by this crate).
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.data.as_slice().map(bytemuck::cast_slice)
    }

    /// Converts every sample to another element type, borrowing the
    /// original.
    ///
    /// Conversion goes through the scaling [`ConvertTo`] matrix, so e.g.
    /// `f32 -> i16` rescales and saturates rather than casting raw values.
    pub fn as_type<O>(&self) -> SampleStreamResult<SampleBuf<O>>
    where
        T: ConvertTo<O>,
        O: Sample,
    {
        let shape = self.data.raw_dim();
        let converted = self
            .data
            .iter()
            .map(|s| s.convert_to())
            .collect::<SampleStreamResult<Vec<O>>>()?;
        let data = Array2::from_shape_vec(shape, converted).map_err(|e| {
            SampleStreamError::DimensionMismatch(format!("conversion reshape failed: {e}"))
        })?;
        SampleBuf::new(data, self.rate)
    }

    fn check_compatible(&self, other: &Self) -> SampleStreamResult<()> {
        if !rates_match(self.rate, other.rate) {
            return Err(SampleStreamError::RateMismatch {
                left: self.rate,
                right: other.rate,
            });
        }
        if self.data.dim() != other.data.dim() {
            return Err(SampleStreamError::DimensionMismatch(format!(
                "shape mismatch: {:?} vs {:?}",
                self.data.dim(),
                other.data.dim()
            )));
        }
        Ok(())
    }

    /// Elementwise sum of two buffers with (approximately) equal rates.
    pub fn try_add(&self, other: &Self) -> SampleStreamResult<Self> {
        self.check_compatible(other)?;
        Ok(Self {
            data: &self.data + &other.data,
            rate: self.rate,
        })
    }

    /// Elementwise difference of two buffers with equal rates.
    pub fn try_sub(&self, other: &Self) -> SampleStreamResult<Self> {
        self.check_compatible(other)?;
        Ok(Self {
            data: &self.data - &other.data,
            rate: self.rate,
        })
    }

    /// Elementwise product of two buffers with equal rates.
    pub fn try_mul(&self, other: &Self) -> SampleStreamResult<Self> {
        self.check_compatible(other)?;
        Ok(Self {
            data: &self.data * &other.data,
            rate: self.rate,
        })
    }

    /// Elementwise quotient of two buffers with equal rates.
    pub fn try_div(&self, other: &Self) -> SampleStreamResult<Self> {
        self.check_compatible(other)?;
        Ok(Self {
            data: &self.data / &other.data,
            rate: self.rate,
        })
    }
}

/// Buffers are equal when their rates and all their samples are equal.
impl<T: Sample> PartialEq for SampleBuf<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rate == other.rate && self.data == other.data
    }
}

impl<T: Sample> Index<(usize, usize)> for SampleBuf<T> {
    type Output = T;

    /// Indexes by `(channel, frame)`.
    fn index(&self, (ch, frame): (usize, usize)) -> &T {
        &self.data[[ch, frame]]
    }
}

impl<T: Sample> IndexMut<(usize, usize)> for SampleBuf<T> {
    fn index_mut(&mut self, (ch, frame): (usize, usize)) -> &mut T {
        &mut self.data[[ch, frame]]
    }
}

// Scalar arithmetic is rate-preserving and cannot fail.
macro_rules! impl_scalar_op {
    ($trait:ident, $method:ident) => {
        impl<T: Sample> $trait<T> for &SampleBuf<T> {
            type Output = SampleBuf<T>;

            fn $method(self, scalar: T) -> SampleBuf<T> {
                SampleBuf {
                    data: self.data.mapv(|v| v.$method(scalar)),
                    rate: self.rate,
                }
            }
        }
    };
}

impl_scalar_op!(Add, add);
impl_scalar_op!(Sub, sub);
impl_scalar_op!(Mul, mul);
impl_scalar_op!(Div, div);

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn construction_and_shape() {
        let buf = SampleBuf::new(array![[1.0f32, 2.0], [3.0, 4.0], [5.0, 6.0]], 48_000.0).unwrap();
        assert_eq!(buf.channels(), 3);
        assert_eq!(buf.frames(), 2);
        assert_eq!(buf.rate(), 48_000.0);

        let mono = SampleBuf::from_mono(array![1i16, 2, 3, 4], 8_000.0).unwrap();
        assert_eq!(mono.channels(), 1);
        assert_eq!(mono.frames(), 4);
        assert!(mono.as_mono().is_some());
    }

    #[test]
    fn invalid_construction_is_rejected() {
        assert!(SampleBuf::<f32>::zeroed(0.0, 1, 4).is_err());
        assert!(SampleBuf::<f32>::zeroed(44_100.0, 0, 4).is_err());
        let empty: Array2<f32> = Array2::zeros((0, 4));
        assert!(SampleBuf::new(empty, 44_100.0).is_err());
    }

    #[test]
    fn zero_frames_is_fine() {
        let buf = SampleBuf::<f64>::zeroed(44_100.0, 2, 0).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.duration_seconds(), 0.0);
    }

    #[test]
    fn indexing_is_channel_major() {
        let buf = SampleBuf::new(array![[1.0f64, 2.0, 3.0], [4.0, 5.0, 6.0]], 10.0).unwrap();
        assert_eq!(buf[(0, 2)], 3.0);
        assert_eq!(buf[(1, 0)], 4.0);
        assert_eq!(buf.channel(1).to_vec(), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn equality_includes_rate() {
        let a = SampleBuf::from_mono(array![1.0f32, 2.0], 44_100.0).unwrap();
        let b = SampleBuf::from_mono(array![1.0f32, 2.0], 44_100.0).unwrap();
        let c = SampleBuf::from_mono(array![1.0f32, 2.0], 48_000.0).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn arithmetic_requires_matching_rate() {
        let a = SampleBuf::from_mono(array![1.0f64, 2.0], 44_100.0).unwrap();
        let b = SampleBuf::from_mono(array![0.5f64, 0.5], 48_000.0).unwrap();
        let err = a.try_add(&b).unwrap_err();
        assert!(matches!(err, SampleStreamError::RateMismatch { .. }));
    }

    #[test]
    fn arithmetic_requires_matching_shape() {
        let a = SampleBuf::from_mono(array![1.0f64, 2.0], 44_100.0).unwrap();
        let b = SampleBuf::from_mono(array![1.0f64, 2.0, 3.0], 44_100.0).unwrap();
        let err = a.try_add(&b).unwrap_err();
        assert!(matches!(err, SampleStreamError::DimensionMismatch(_)));
    }

    #[test]
    fn elementwise_arithmetic() {
        let a = SampleBuf::from_mono(array![1.0f64, 2.0, 3.0], 100.0).unwrap();
        let b = SampleBuf::from_mono(array![0.5f64, 0.25, 1.0], 100.0).unwrap();
        assert_eq!(
            a.try_add(&b).unwrap().channel(0).to_vec(),
            vec![1.5, 2.25, 4.0]
        );
        assert_eq!(
            a.try_mul(&b).unwrap().channel(0).to_vec(),
            vec![0.5, 0.5, 3.0]
        );
    }

    #[test]
    fn scalar_arithmetic_preserves_rate() {
        let a = SampleBuf::from_mono(array![1.0f32, -2.0], 44_100.0).unwrap();
        let scaled = &a * 0.5;
        assert_eq!(scaled.rate(), 44_100.0);
        assert_eq!(scaled.channel(0).to_vec(), vec![0.5, -1.0]);
    }

    #[test]
    fn truncation() {
        let mut buf = SampleBuf::from_mono(array![1i32, 2, 3, 4, 5], 8_000.0).unwrap();
        buf.truncate(3);
        assert_eq!(buf.frames(), 3);
        assert_eq!(buf.channel(0).to_vec(), vec![1, 2, 3]);
        // Truncating past the end is a no-op.
        buf.truncate(10);
        assert_eq!(buf.frames(), 3);
    }

    #[test]
    fn block_copy() {
        let src = SampleBuf::new(array![[1.0f32, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]], 10.0)
            .unwrap();
        let mut dst = SampleBuf::zeroed(10.0, 2, 4).unwrap();
        dst.copy_frames_from(&src, 1, 0, 2).unwrap();
        assert_eq!(dst[(0, 0)], 2.0);
        assert_eq!(dst[(0, 1)], 3.0);
        assert_eq!(dst[(1, 0)], 6.0);
        assert_eq!(dst[(1, 1)], 7.0);
        assert_eq!(dst[(0, 2)], 0.0);

        assert!(dst.copy_frames_from(&src, 3, 0, 2).is_err());
    }

    #[test]
    fn type_conversion_keeps_shape_and_rate() {
        let buf = SampleBuf::new(array![[0.5f32, -0.5], [1.0, -1.0]], 22_050.0).unwrap();
        let fixed = buf.as_type::<i16>().unwrap();
        assert_eq!(fixed.channels(), 2);
        assert_eq!(fixed.frames(), 2);
        assert_eq!(fixed.rate(), 22_050.0);
        assert_eq!(fixed[(1, 0)], i16::MAX);
        assert_eq!(fixed[(1, 1)], i16::MIN);
    }

    #[test]
    fn byte_view_is_contiguous() {
        let buf = SampleBuf::from_mono(array![1i16, 2, 3], 8_000.0).unwrap();
        assert_eq!(buf.as_bytes().unwrap().len(), 6);
    }

    #[test]
    fn rate_retagging() {
        let mut buf = SampleBuf::from_mono(array![1.0f64], 44_100.0).unwrap();
        buf.set_rate(48_000.0).unwrap();
        assert_eq!(buf.rate(), 48_000.0);
        assert!(buf.set_rate(-1.0).is_err());
    }
}
