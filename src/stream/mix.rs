//! Channel-count adapter sinks.
//!
//! Only the two mono mappings are defined: [`UpMixSink`] fans a mono
//! stream out to every channel of a multichannel sink, and [`DownMixSink`]
//! sums a multichannel stream into a mono sink. General M-to-N mappings
//! are rejected upstream by the copy layer.

use std::num::NonZeroUsize;

use super::traits::{DEFAULT_BLOCK_SIZE, SampleSink, drain_into};
use crate::{ConvertFrom, ConvertTo, Sample, SampleBuf, SampleStreamError, SampleStreamResult};

/// A sink adapter that replicates a mono stream into every channel of the
/// wrapped multichannel sink.
///
/// Exposes itself as a 1-channel sink; rate and element type pass through
/// unchanged.
#[derive(Debug)]
pub struct UpMixSink<S, T: Sample> {
    inner: S,
    scratch: SampleBuf<T>,
    block: usize,
}

impl<S, T> UpMixSink<S, T>
where
    T: Sample,
    S: SampleSink<T>,
{
    /// Wraps `inner` with the default block size.
    pub fn new(inner: S) -> SampleStreamResult<Self> {
        Self::with_block_size(inner, DEFAULT_BLOCK_SIZE)
    }

    /// Wraps `inner`, sizing the internal scratch buffer to `block` frames.
    pub fn with_block_size(inner: S, block: usize) -> SampleStreamResult<Self> {
        if block == 0 {
            return Err(SampleStreamError::invalid_parameter(
                "block",
                "block size must be at least one frame",
            ));
        }
        let scratch = SampleBuf::zeroed(inner.rate(), inner.channels(), block)?;
        Ok(Self {
            inner,
            scratch,
            block,
        })
    }

    /// Consumes the adapter and returns the wrapped sink.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, T> SampleSink<T> for UpMixSink<S, T>
where
    T: Sample,
    S: SampleSink<T>,
{
    fn rate(&self) -> f64 {
        self.inner.rate()
    }

    fn channels(&self) -> usize {
        1
    }

    fn block_size(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.block)
    }

    fn write_from(
        &mut self,
        src: &SampleBuf<T>,
        offset: usize,
        count: usize,
    ) -> SampleStreamResult<usize> {
        if src.channels() != 1 {
            return Err(SampleStreamError::format_mismatch(
                "1 channel",
                format!("{} channels", src.channels()),
            ));
        }

        let mut done = 0;
        while done < count {
            let n = self.block.min(count - done);
            for j in 0..n {
                let value = src[(0, offset + done + j)];
                for ch in 0..self.scratch.channels() {
                    self.scratch[(ch, j)] = value;
                }
            }
            let accepted = drain_into(&mut self.inner, &self.scratch, n)?;
            done += accepted;
            if accepted < n {
                break;
            }
        }
        Ok(done)
    }
}

/// A sink adapter that sums a multichannel stream into the wrapped mono
/// sink.
///
/// Exposes itself with the channel count given at construction; each
/// output sample is the sum of the input channels (not the average),
/// accumulated in `f64` and converted back through the saturating
/// conversion matrix. Rate and element type pass through unchanged.
#[derive(Debug)]
pub struct DownMixSink<S, T: Sample> {
    inner: S,
    channels: usize,
    scratch: SampleBuf<T>,
    block: usize,
}

impl<S, T> DownMixSink<S, T>
where
    T: Sample,
    S: SampleSink<T>,
{
    /// Wraps the mono sink `inner`, exposing `channels` input channels.
    ///
    /// Fails with [`SampleStreamError::ZeroChannelSource`] when `channels`
    /// is zero and rejects a non-mono inner sink.
    pub fn new(inner: S, channels: usize) -> SampleStreamResult<Self> {
        Self::with_block_size(inner, channels, DEFAULT_BLOCK_SIZE)
    }

    /// Wraps `inner`, sizing the internal scratch buffer to `block` frames.
    pub fn with_block_size(inner: S, channels: usize, block: usize) -> SampleStreamResult<Self> {
        if channels == 0 {
            return Err(SampleStreamError::ZeroChannelSource);
        }
        if inner.channels() != 1 {
            return Err(SampleStreamError::invalid_parameter(
                "inner",
                format!(
                    "down-mix requires a mono sink, got {} channels",
                    inner.channels()
                ),
            ));
        }
        if block == 0 {
            return Err(SampleStreamError::invalid_parameter(
                "block",
                "block size must be at least one frame",
            ));
        }
        let scratch = SampleBuf::zeroed(inner.rate(), 1, block)?;
        Ok(Self {
            inner,
            channels,
            scratch,
            block,
        })
    }

    /// Consumes the adapter and returns the wrapped sink.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, T> SampleSink<T> for DownMixSink<S, T>
where
    T: Sample,
    S: SampleSink<T>,
{
    fn rate(&self) -> f64 {
        self.inner.rate()
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn block_size(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.block)
    }

    fn write_from(
        &mut self,
        src: &SampleBuf<T>,
        offset: usize,
        count: usize,
    ) -> SampleStreamResult<usize> {
        if src.channels() != self.channels {
            return Err(SampleStreamError::format_mismatch(
                format!("{} channels", self.channels),
                format!("{} channels", src.channels()),
            ));
        }

        let mut done = 0;
        while done < count {
            let n = self.block.min(count - done);
            for j in 0..n {
                let mut sum = 0.0f64;
                for ch in 0..self.channels {
                    let value: f64 = src[(ch, offset + done + j)].convert_to()?;
                    sum += value;
                }
                self.scratch[(0, j)] = T::convert_from(sum)?;
            }
            let accepted = drain_into(&mut self.inner, &self.scratch, n)?;
            done += accepted;
            if accepted < n {
                break;
            }
        }
        Ok(done)
    }
}
