//! Core capability traits for streaming endpoints.
//!
//! A streaming endpoint advertises the format triple every transfer
//! decision is made on — rate, channel count, and element type — plus an
//! optional preferred block size, and implements exactly one low-level
//! primitive: [`SampleSource::read_into`] or [`SampleSink::write_from`].
//! Everything else (buffered reads, format coercion, adapter chains) is
//! layered on top by the [`copy`](crate::stream::copy) module.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{Sample, SampleBuf, SampleFormat, SampleStreamResult, rates_match};

/// Default block size, in frames, used when neither the caller nor the
/// source states a preference.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// The format triple of a streaming endpoint.
///
/// Two endpoints can exchange raw blocks directly only when all three axes
/// match; otherwise an adapter stage per mismatched axis is required.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamFormat {
    /// Sample rate in samples-per-second.
    pub rate: f64,
    /// Number of channels per frame.
    pub channels: usize,
    /// Element type of one sample.
    pub sample: SampleFormat,
}

impl StreamFormat {
    /// Creates a format triple.
    pub const fn new(rate: f64, channels: usize, sample: SampleFormat) -> Self {
        Self {
            rate,
            channels,
            sample,
        }
    }

    /// Returns true when direct block transfer between the two formats is
    /// legal: rates equal within tolerance, channel counts and element
    /// types exactly equal.
    pub fn compatible(&self, other: &Self) -> bool {
        rates_match(self.rate, other.rate)
            && self.channels == other.channels
            && self.sample == other.sample
    }
}

impl std::fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Hz, {} ch, {}", self.rate, self.channels, self.sample)
    }
}

/// A streaming endpoint that produces frames on demand.
///
/// ## Contract
///
/// `read_into` fills `dst` from `offset` up to `offset + count - 1` and
/// returns the number of frames actually filled, `0 ≤ n ≤ count`. A short
/// read signals that the source is at (or near) its end; a zero read means
/// it is exhausted. Partial reads caused by internal chunking are allowed —
/// callers that need exactly `count` frames re-invoke until a zero read.
/// A source is never asked to produce frames beyond what it has.
///
/// Blocking is a property of the concrete implementation (a device-backed
/// source may block the calling thread until data arrives); the core never
/// spawns anything on its own.
pub trait SampleSource<T: Sample> {
    /// Sample rate of the produced frames.
    fn rate(&self) -> f64;

    /// Channel count of the produced frames.
    fn channels(&self) -> usize;

    /// Preferred block size in frames, if the source has one.
    fn block_size(&self) -> Option<NonZeroUsize> {
        None
    }

    /// The full format triple of this endpoint.
    fn format(&self) -> StreamFormat {
        StreamFormat::new(self.rate(), self.channels(), T::FORMAT)
    }

    /// Fills `dst[offset .. offset + count]` with the next frames.
    ///
    /// Returns the number of frames actually produced; see the trait-level
    /// contract for short-read semantics.
    fn read_into(
        &mut self,
        dst: &mut SampleBuf<T>,
        offset: usize,
        count: usize,
    ) -> SampleStreamResult<usize>;
}

/// A streaming endpoint that consumes frames.
///
/// ## Contract
///
/// `write_from` consumes `src[offset .. offset + count]` and returns the
/// number of frames actually accepted, `0 ≤ n ≤ count`. A zero write means
/// the sink accepts no more; a short write means the caller should
/// re-invoke for the remainder (a closed sink will then return zero).
pub trait SampleSink<T: Sample> {
    /// Sample rate of the consumed frames.
    fn rate(&self) -> f64;

    /// Channel count of the consumed frames.
    fn channels(&self) -> usize;

    /// Preferred block size in frames, if the sink has one.
    fn block_size(&self) -> Option<NonZeroUsize> {
        None
    }

    /// The full format triple of this endpoint.
    fn format(&self) -> StreamFormat {
        StreamFormat::new(self.rate(), self.channels(), T::FORMAT)
    }

    /// Consumes frames from `src[offset .. offset + count]`.
    ///
    /// Returns the number of frames actually accepted; see the trait-level
    /// contract for short-write semantics.
    fn write_from(
        &mut self,
        src: &SampleBuf<T>,
        offset: usize,
        count: usize,
    ) -> SampleStreamResult<usize>;
}

impl<T: Sample, S: SampleSource<T> + ?Sized> SampleSource<T> for &mut S {
    fn rate(&self) -> f64 {
        (**self).rate()
    }

    fn channels(&self) -> usize {
        (**self).channels()
    }

    fn block_size(&self) -> Option<NonZeroUsize> {
        (**self).block_size()
    }

    fn read_into(
        &mut self,
        dst: &mut SampleBuf<T>,
        offset: usize,
        count: usize,
    ) -> SampleStreamResult<usize> {
        (**self).read_into(dst, offset, count)
    }
}

impl<T: Sample, S: SampleSink<T> + ?Sized> SampleSink<T> for &mut S {
    fn rate(&self) -> f64 {
        (**self).rate()
    }

    fn channels(&self) -> usize {
        (**self).channels()
    }

    fn block_size(&self) -> Option<NonZeroUsize> {
        (**self).block_size()
    }

    fn write_from(
        &mut self,
        src: &SampleBuf<T>,
        offset: usize,
        count: usize,
    ) -> SampleStreamResult<usize> {
        (**self).write_from(src, offset, count)
    }
}

impl<T: Sample, S: SampleSink<T> + ?Sized> SampleSink<T> for Box<S> {
    fn rate(&self) -> f64 {
        (**self).rate()
    }

    fn channels(&self) -> usize {
        (**self).channels()
    }

    fn block_size(&self) -> Option<NonZeroUsize> {
        (**self).block_size()
    }

    fn write_from(
        &mut self,
        src: &SampleBuf<T>,
        offset: usize,
        count: usize,
    ) -> SampleStreamResult<usize> {
        (**self).write_from(src, offset, count)
    }
}

/// Writes `count` frames of `buf` into `sink`, re-invoking on partial
/// writes, and returns how many frames the sink accepted before closing.
pub(crate) fn drain_into<T: Sample, S: SampleSink<T> + ?Sized>(
    sink: &mut S,
    buf: &SampleBuf<T>,
    count: usize,
) -> SampleStreamResult<usize> {
    let mut done = 0;
    while done < count {
        let accepted = sink.write_from(buf, done, count - done)?;
        if accepted == 0 {
            break;
        }
        done += accepted;
    }
    Ok(done)
}
