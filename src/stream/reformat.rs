//! Element-type adapter sink.

use std::num::NonZeroUsize;

use super::traits::{DEFAULT_BLOCK_SIZE, SampleSink, drain_into};
use crate::{ConvertTo, Sample, SampleBuf, SampleStreamError, SampleStreamResult};

/// A sink adapter that converts the element type on the way through.
///
/// `ReformatSink` wraps a sink of element type `W` and accepts writes in
/// any supported element type `T`, converting each block through the
/// scaling [`ConvertTo`] matrix into an internally owned `W`-typed scratch
/// buffer before forwarding. Float input narrowed to a fixed-point sink is
/// clamped to the representable range, never wrapped. Rate and channel
/// count pass through unchanged.
///
/// When `T` and `W` are the same type the conversion is the identity, which
/// lets this adapter double as the typed bridge at the bottom of every
/// adapter chain.
#[derive(Debug)]
pub struct ReformatSink<S, W: Sample> {
    inner: S,
    scratch: SampleBuf<W>,
    block: usize,
}

impl<S, W> ReformatSink<S, W>
where
    W: Sample,
    S: SampleSink<W>,
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

impl<T, W, S> SampleSink<T> for ReformatSink<S, W>
where
    T: Sample + ConvertTo<W>,
    W: Sample,
    S: SampleSink<W>,
{
    fn rate(&self) -> f64 {
        self.inner.rate()
    }

    fn channels(&self) -> usize {
        self.inner.channels()
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
        if src.channels() != self.scratch.channels() {
            return Err(SampleStreamError::format_mismatch(
                format!("{} channels", self.scratch.channels()),
                format!("{} channels", src.channels()),
            ));
        }

        let mut done = 0;
        while done < count {
            let n = self.block.min(count - done);
            for ch in 0..self.scratch.channels() {
                for j in 0..n {
                    self.scratch[(ch, j)] = src[(ch, offset + done + j)].convert_to()?;
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
