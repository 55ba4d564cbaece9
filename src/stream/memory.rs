//! Buffer-backed streaming endpoints.
//!
//! These are the in-memory implementations of the source/sink capability:
//! [`BufferSource`] streams out of an existing [`SampleBuf`], and
//! [`BufferSink`] accumulates written frames for later retrieval. They are
//! the collaborator seam concrete file or device backends would otherwise
//! fill, and the workhorses of the stream tests.

use ndarray::Array2;
use std::num::NonZeroUsize;

use super::traits::{SampleSink, SampleSource};
use crate::{Sample, SampleBuf, SampleStreamResult};

/// A [`SampleSource`] that reads out of a borrowed [`SampleBuf`].
///
/// Serves full requests until the underlying buffer is exhausted, then
/// returns short (and finally zero) reads.
#[derive(Debug)]
pub struct BufferSource<'a, T: Sample> {
    buf: &'a SampleBuf<T>,
    pos: usize,
}

impl<'a, T: Sample> BufferSource<'a, T> {
    /// Creates a source positioned at the start of `buf`.
    pub fn new(buf: &'a SampleBuf<T>) -> Self {
        Self { buf, pos: 0 }
    }

    /// Frames not yet read.
    pub fn remaining(&self) -> usize {
        self.buf.frames() - self.pos
    }
}

impl<T: Sample> SampleSource<T> for BufferSource<'_, T> {
    fn rate(&self) -> f64 {
        self.buf.rate()
    }

    fn channels(&self) -> usize {
        self.buf.channels()
    }

    fn read_into(
        &mut self,
        dst: &mut SampleBuf<T>,
        offset: usize,
        count: usize,
    ) -> SampleStreamResult<usize> {
        let available = dst.frames().saturating_sub(offset);
        let n = count.min(self.remaining()).min(available);
        if n == 0 {
            return Ok(0);
        }
        dst.copy_frames_from(self.buf, self.pos, offset, n)?;
        self.pos += n;
        Ok(n)
    }
}

/// A [`SampleSink`] that accumulates written frames in memory.
///
/// Grows without bound by default; an optional frame capacity turns it into
/// an early-closing sink (it accepts frames up to the capacity and then
/// reports zero writes), which is how sink-closure paths are exercised.
#[derive(Debug)]
pub struct BufferSink<T: Sample> {
    rate: f64,
    channels: Vec<Vec<T>>,
    capacity: Option<usize>,
    block: Option<NonZeroUsize>,
}

impl<T: Sample> BufferSink<T> {
    /// Creates an unbounded sink with the given format.
    pub fn new(rate: f64, channels: usize) -> SampleStreamResult<Self> {
        Self::build(rate, channels, None)
    }

    /// Creates a sink that closes after accepting `capacity` frames.
    pub fn with_capacity(rate: f64, channels: usize, capacity: usize) -> SampleStreamResult<Self> {
        Self::build(rate, channels, Some(capacity))
    }

    fn build(rate: f64, channels: usize, capacity: Option<usize>) -> SampleStreamResult<Self> {
        if channels == 0 {
            return Err(crate::SampleStreamError::invalid_parameter(
                "channels",
                "a sink needs at least one channel",
            ));
        }
        if !(rate > 0.0 && rate.is_finite()) {
            return Err(crate::SampleStreamError::invalid_parameter(
                "rate",
                format!("rate must be positive and finite, got {rate}"),
            ));
        }
        Ok(Self {
            rate,
            channels: vec![Vec::new(); channels],
            capacity,
            block: None,
        })
    }

    /// Sets the preferred block size advertised to callers.
    pub fn set_block_size(&mut self, block: usize) {
        self.block = NonZeroUsize::new(block);
    }

    /// Frames accepted so far.
    pub fn len_frames(&self) -> usize {
        self.channels[0].len()
    }

    /// Consumes the sink and returns the accumulated frames as a buffer.
    pub fn into_buf(self) -> SampleStreamResult<SampleBuf<T>> {
        let frames = self.channels[0].len();
        let channel_count = self.channels.len();
        let mut data = Array2::<T>::zeros((channel_count, frames));
        for (ch, samples) in self.channels.iter().enumerate() {
            for (frame, sample) in samples.iter().enumerate() {
                data[[ch, frame]] = *sample;
            }
        }
        SampleBuf::new(data, self.rate)
    }
}

impl<T: Sample> SampleSink<T> for BufferSink<T> {
    fn rate(&self) -> f64 {
        self.rate
    }

    fn channels(&self) -> usize {
        self.channels.len()
    }

    fn block_size(&self) -> Option<NonZeroUsize> {
        self.block
    }

    fn write_from(
        &mut self,
        src: &SampleBuf<T>,
        offset: usize,
        count: usize,
    ) -> SampleStreamResult<usize> {
        let room = match self.capacity {
            Some(cap) => cap.saturating_sub(self.len_frames()),
            None => count,
        };
        let n = count.min(room).min(src.frames().saturating_sub(offset));
        if n == 0 {
            return Ok(0);
        }
        for (ch, samples) in self.channels.iter_mut().enumerate() {
            samples.extend(src.channel(ch).iter().skip(offset).take(n).copied());
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn source_reads_and_exhausts() {
        let buf = SampleBuf::from_mono(array![1.0f32, 2.0, 3.0, 4.0, 5.0], 8_000.0).unwrap();
        let mut source = BufferSource::new(&buf);
        let mut dst = SampleBuf::zeroed(8_000.0, 1, 3).unwrap();

        assert_eq!(source.read_into(&mut dst, 0, 3).unwrap(), 3);
        assert_eq!(dst.channel(0).to_vec(), vec![1.0, 2.0, 3.0]);

        // Only two frames remain.
        assert_eq!(source.read_into(&mut dst, 0, 3).unwrap(), 2);
        assert_eq!(dst[(0, 0)], 4.0);
        assert_eq!(dst[(0, 1)], 5.0);

        assert_eq!(source.read_into(&mut dst, 0, 3).unwrap(), 0);
    }

    #[test]
    fn source_respects_destination_offset() {
        let buf = SampleBuf::from_mono(array![7.0f64, 8.0], 1_000.0).unwrap();
        let mut source = BufferSource::new(&buf);
        let mut dst = SampleBuf::zeroed(1_000.0, 1, 4).unwrap();

        assert_eq!(source.read_into(&mut dst, 2, 2).unwrap(), 2);
        assert_eq!(dst.channel(0).to_vec(), vec![0.0, 0.0, 7.0, 8.0]);
    }

    #[test]
    fn sink_accumulates() {
        let buf =
            SampleBuf::new(array![[1i16, 2, 3], [4, 5, 6]], 44_100.0).unwrap();
        let mut sink = BufferSink::new(44_100.0, 2).unwrap();
        assert_eq!(sink.write_from(&buf, 0, 3).unwrap(), 3);
        assert_eq!(sink.len_frames(), 3);

        let collected = sink.into_buf().unwrap();
        assert_eq!(collected, buf);
    }

    #[test]
    fn capacity_limited_sink_closes() {
        let buf = SampleBuf::from_mono(array![1.0f32, 2.0, 3.0, 4.0], 8_000.0).unwrap();
        let mut sink = BufferSink::with_capacity(8_000.0, 1, 2).unwrap();

        assert_eq!(sink.write_from(&buf, 0, 4).unwrap(), 2);
        assert_eq!(sink.write_from(&buf, 2, 2).unwrap(), 0);
        assert_eq!(sink.len_frames(), 2);
    }

    #[test]
    fn zero_channel_sink_is_rejected() {
        assert!(BufferSink::<f32>::new(44_100.0, 0).is_err());
    }
}
