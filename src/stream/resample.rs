//! Sample-rate adapter sink.

use std::num::NonZeroUsize;

use super::traits::{DEFAULT_BLOCK_SIZE, SampleSink, drain_into};
use crate::{ConvertFrom, ConvertTo, Sample, SampleBuf, SampleStreamError, SampleStreamResult};

/// A sink adapter that converts the sample rate on the way through.
///
/// `ResampleSink` wraps a sink at its native rate and accepts writes at a
/// different rate (the rate of the data being written), producing
/// wrapped-rate output by linear interpolation between adjacent input
/// frames. Channel count and element type pass through unchanged.
///
/// ## Streaming state
///
/// The adapter keeps a fractional `phase` (the position of the next output
/// frame within the input stream) and a per-channel carry of the last
/// consumed input frame. Both survive across calls, so a signal written in
/// several pieces — split at any frame boundary — produces the same output
/// as the same signal written in one call. The carry starts zero-filled
/// and the phase starts on the first input frame, so the first output
/// sample equals the first input sample.
///
/// Interpolation always runs in `f64`, whatever the element type; integer
/// samples are normalized on the way in and rescaled (saturating) on the
/// way out.
///
/// Linear interpolation is deliberate: it is the policy under which
/// chunk-boundary invariance holds exactly. For quality-first offline
/// conversion use [`resample`](crate::resampling::resample) instead.
#[derive(Debug)]
pub struct ResampleSink<S, T: Sample> {
    inner: S,
    source_rate: f64,
    /// Input frames advanced per output frame.
    step: f64,
    /// Position of the next output frame, in input-frame units, measured
    /// from the carry frame (carry at 0.0, first unconsumed input at 1.0).
    phase: f64,
    carry: Vec<f64>,
    scratch: SampleBuf<T>,
    block: usize,
}

impl<S, T> ResampleSink<S, T>
where
    T: Sample,
    S: SampleSink<T>,
{
    /// Wraps `inner`, accepting writes at `source_rate`.
    pub fn new(inner: S, source_rate: f64) -> SampleStreamResult<Self> {
        Self::with_block_size(inner, source_rate, DEFAULT_BLOCK_SIZE)
    }

    /// Wraps `inner`, sizing the internal scratch buffer to `block` frames.
    pub fn with_block_size(
        inner: S,
        source_rate: f64,
        block: usize,
    ) -> SampleStreamResult<Self> {
        if !(source_rate > 0.0 && source_rate.is_finite()) {
            return Err(SampleStreamError::invalid_parameter(
                "source_rate",
                format!("rate must be positive and finite, got {source_rate}"),
            ));
        }
        if block == 0 {
            return Err(SampleStreamError::invalid_parameter(
                "block",
                "block size must be at least one frame",
            ));
        }
        let channels = inner.channels();
        let scratch = SampleBuf::zeroed(inner.rate(), channels, block)?;
        let step = source_rate / inner.rate();
        Ok(Self {
            inner,
            source_rate,
            step,
            phase: 1.0,
            carry: vec![0.0; channels],
            scratch,
            block,
        })
    }

    /// Consumes the adapter and returns the wrapped sink.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Input frame at interpolation position `pos` (0 is the carry frame,
    /// `pos >= 1` indexes the current write), normalized to `f64`.
    fn sample_at(
        &self,
        src: &SampleBuf<T>,
        offset: usize,
        ch: usize,
        pos: usize,
    ) -> SampleStreamResult<f64> {
        if pos == 0 {
            Ok(self.carry[ch])
        } else {
            src[(ch, offset + pos - 1)].convert_to()
        }
    }
}

impl<S, T> SampleSink<T> for ResampleSink<S, T>
where
    T: Sample,
    S: SampleSink<T>,
{
    fn rate(&self) -> f64 {
        self.source_rate
    }

    fn channels(&self) -> usize {
        self.carry.len()
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
        if count == 0 {
            return Ok(0);
        }
        let channels = self.carry.len();
        if src.channels() != channels {
            return Err(SampleStreamError::format_mismatch(
                format!("{channels} channels"),
                format!("{} channels", src.channels()),
            ));
        }

        let count_f = count as f64;
        let mut produced = 0usize;
        let mut closed = false;

        loop {
            // Fill one scratch block with the output frames implied by the
            // input seen so far. Positions are not committed to `phase`
            // until the wrapped sink has accepted the frames.
            let mut filled = 0usize;
            while filled < self.block {
                let p = self.phase + (produced + filled) as f64 * self.step;
                if p > count_f {
                    break;
                }
                let idx_f = p.floor();
                let frac = p - idx_f;
                let idx = idx_f as usize;
                for ch in 0..channels {
                    let lower = self.sample_at(src, offset, ch, idx)?;
                    let value = if frac == 0.0 {
                        lower
                    } else {
                        let upper = self.sample_at(src, offset, ch, idx + 1)?;
                        lower + (upper - lower) * frac
                    };
                    self.scratch[(ch, filled)] = T::convert_from(value)?;
                }
                filled += 1;
            }
            if filled == 0 {
                break;
            }

            let accepted = drain_into(&mut self.inner, &self.scratch, filled)?;
            produced += accepted;
            if accepted < filled {
                closed = true;
                break;
            }
        }

        if closed {
            // The wrapped sink stopped accepting mid-call. Report how much
            // input the accepted output corresponds to, by inverting the
            // rate ratio, and leave the state aligned with that amount.
            let consumed = ((produced as f64 * self.step).round() as usize).min(count);
            if consumed > 0 {
                for ch in 0..channels {
                    self.carry[ch] = src[(ch, offset + consumed - 1)].convert_to()?;
                }
            }
            self.phase = (self.phase + produced as f64 * self.step - consumed as f64).max(0.0);
            return Ok(consumed);
        }

        // Every output implied by this write was delivered; rebase the
        // phase onto the final input frame, which becomes the carry.
        self.phase += produced as f64 * self.step;
        self.phase -= count_f;
        for ch in 0..channels {
            self.carry[ch] = src[(ch, offset + count - 1)].convert_to()?;
        }
        Ok(count)
    }
}
