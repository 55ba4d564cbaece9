//! Stream-to-stream copy with automatic format coercion.
//!
//! [`write`] is the entry point that lets a source with one rate, channel
//! count, and element type feed a sink with different parameters. It
//! compares the two format triples, wraps the sink in the minimum set of
//! adapter stages, then drives a blockwise copy loop. The wrapping order is
//! fixed: the element-type bridge sits innermost, resampling above it, and
//! channel mixing outermost — so rate conversion always happens in the
//! wide format before any narrowing, and channel mixing happens on the
//! source's native layout before the rate changes.
//!
//! The read-side conveniences [`read`] and [`read_into`] do no coercion at
//! all; a destination buffer must already match the source's format.

use std::num::NonZeroUsize;

use tracing::{debug, trace};

use super::memory::BufferSource;
use super::mix::{DownMixSink, UpMixSink};
use super::reformat::ReformatSink;
use super::resample::ResampleSink;
use super::traits::{DEFAULT_BLOCK_SIZE, SampleSink, SampleSource, StreamFormat, drain_into};
use crate::{
    ConvertTo, Quantity, Sample, SampleBuf, SampleStreamError, SampleStreamResult, frames_from,
    rates_match,
};

/// Expresses a transferred frame count in the unit of the original request.
///
/// When the request was fully satisfied the original quantity is echoed
/// back unchanged, so equality checks against the request succeed.
fn transferred_as(
    limit: Option<(Quantity, usize)>,
    transferred: usize,
    rate: f64,
) -> Quantity {
    match limit {
        Some((requested, frames)) if transferred == frames => requested,
        Some((Quantity::Frames(_), _)) | None => Quantity::Frames(transferred),
        Some((Quantity::Seconds(_), _)) => Quantity::Seconds(transferred as f64 / rate),
        Some((Quantity::Hertz(_), _)) => Quantity::Hertz(transferred as f64 / rate),
    }
}

/// Copies frames from `source` into `sink`, coercing format as needed.
///
/// The two endpoints may differ in element type, rate, and channel count;
/// one adapter stage per mismatched axis is inserted around the sink.
/// Channel mappings other than mono fan-out/fan-in are rejected with
/// [`SampleStreamError::UnsupportedChannelMapping`] before any frame moves.
///
/// `limit` bounds the transfer (interpreted at the source's rate;
/// unbounded when `None`), and `block_size` overrides the block length of
/// the copy loop (falling back to the source's preference, then to
/// [`DEFAULT_BLOCK_SIZE`]).
///
/// Returns the amount actually transferred, in the unit of `limit`: the
/// original quantity itself when fully satisfied, otherwise the lesser
/// amount achieved. A source running out early or a sink closing early is
/// not an error — check the returned amount.
pub fn write<T, W, Src, Snk>(
    sink: &mut Snk,
    source: &mut Src,
    limit: Option<Quantity>,
    block_size: Option<usize>,
) -> SampleStreamResult<Quantity>
where
    T: Sample + ConvertTo<W>,
    W: Sample,
    Src: SampleSource<T> + ?Sized,
    Snk: SampleSink<W> + ?Sized,
{
    let src_fmt = source.format();
    let snk_fmt = sink.format();

    // Mapping legality is checked before any data moves: a fatal
    // configuration error must not leave a partial transfer behind.
    if src_fmt.channels != snk_fmt.channels && src_fmt.channels != 1 && snk_fmt.channels != 1 {
        return Err(SampleStreamError::UnsupportedChannelMapping {
            from: src_fmt.channels,
            to: snk_fmt.channels,
        });
    }

    let limit = match limit {
        Some(q) => Some((q, frames_from(q, Some(src_fmt.rate))?)),
        None => None,
    };
    let block = block_size
        .or_else(|| source.block_size().map(NonZeroUsize::get))
        .unwrap_or(DEFAULT_BLOCK_SIZE);

    let chain = build_chain::<T, W, Snk>(sink, &src_fmt, &snk_fmt, block)?;
    let transferred = copy_blocks(chain, source, &src_fmt, limit.map(|(_, n)| n), block)?;

    Ok(transferred_as(limit, transferred, src_fmt.rate))
}

/// Wraps `sink` in the adapter stages the format difference requires.
fn build_chain<'a, T, W, Snk>(
    sink: &'a mut Snk,
    src_fmt: &StreamFormat,
    snk_fmt: &StreamFormat,
    block: usize,
) -> SampleStreamResult<Box<dyn SampleSink<T> + 'a>>
where
    T: Sample + ConvertTo<W>,
    W: Sample,
    Snk: SampleSink<W> + ?Sized,
{
    // Innermost stage: the element-type bridge. When the two element types
    // coincide the conversion is the identity.
    if src_fmt.sample != snk_fmt.sample {
        debug!(
            "inserting reformat stage: {} -> {}",
            src_fmt.sample, snk_fmt.sample
        );
    }
    let mut chain: Box<dyn SampleSink<T> + 'a> =
        Box::new(ReformatSink::<_, W>::with_block_size(&mut *sink, block)?);

    if !rates_match(snk_fmt.rate, src_fmt.rate) {
        debug!(
            "inserting resample stage: {} Hz -> {} Hz",
            src_fmt.rate, snk_fmt.rate
        );
        chain = Box::new(ResampleSink::with_block_size(chain, src_fmt.rate, block)?);
    }

    if snk_fmt.channels != src_fmt.channels {
        debug!(
            "inserting channel-mix stage: {} ch -> {} ch",
            src_fmt.channels, snk_fmt.channels
        );
        chain = if snk_fmt.channels == 1 {
            Box::new(DownMixSink::with_block_size(
                chain,
                src_fmt.channels,
                block,
            )?)
        } else {
            Box::new(UpMixSink::with_block_size(chain, block)?)
        };
    }

    Ok(chain)
}

/// Drives the blockwise copy loop and returns the frames transferred.
fn copy_blocks<T, Src>(
    mut chain: Box<dyn SampleSink<T> + '_>,
    source: &mut Src,
    src_fmt: &StreamFormat,
    limit_frames: Option<usize>,
    block: usize,
) -> SampleStreamResult<usize>
where
    T: Sample,
    Src: SampleSource<T> + ?Sized,
{
    debug_assert!(chain.format().compatible(src_fmt));

    let mut scratch = SampleBuf::<T>::zeroed(src_fmt.rate, src_fmt.channels, block)?;
    let mut total = 0usize;

    loop {
        let want = match limit_frames {
            Some(limit) => block.min(limit - total),
            None => block,
        };
        if want == 0 {
            break;
        }

        let got = source.read_into(&mut scratch, 0, want)?;
        if got == 0 {
            break;
        }

        let accepted = drain_into(&mut *chain, &scratch, got)?;
        total += accepted;
        trace!(
            "copied block: {got} read, {accepted} written, {total} total"
        );
        if accepted < got {
            debug!("sink closed after {total} frames");
            break;
        }
        if got < want {
            break;
        }
    }

    Ok(total)
}

/// Writes the contents of a buffer into a sink, coercing format as needed.
///
/// The buffer is treated as a finite source at its own format; the full
/// adapter logic of [`write`] applies.
pub fn write_buf<T, W, Snk>(sink: &mut Snk, buf: &SampleBuf<T>) -> SampleStreamResult<Quantity>
where
    T: Sample + ConvertTo<W>,
    W: Sample,
    Snk: SampleSink<W> + ?Sized,
{
    let mut source = BufferSource::new(buf);
    write(sink, &mut source, None, None)
}

/// Reads an amount of frames from a source into a new buffer at the
/// source's native format.
///
/// The returned buffer is truncated to the frames actually produced when
/// the source ends before the requested amount.
pub fn read<T, Src>(source: &mut Src, amount: Quantity) -> SampleStreamResult<SampleBuf<T>>
where
    T: Sample,
    Src: SampleSource<T> + ?Sized,
{
    let rate = source.rate();
    let want = frames_from(amount, Some(rate))?;
    let mut buf = SampleBuf::zeroed(rate, source.channels(), want)?;

    let mut total = 0usize;
    while total < want {
        let got = source.read_into(&mut buf, total, want - total)?;
        if got == 0 {
            break;
        }
        total += got;
    }
    if total < want {
        buf.truncate(total);
    }
    Ok(buf)
}

/// Reads an amount of frames from a source into an existing buffer.
///
/// The destination must already match the source's rate and channel count
/// — this layer never coerces; mismatches fail with
/// [`SampleStreamError::FormatMismatch`]. Reads at most the buffer's
/// capacity. Returns the amount actually read, in the unit of `amount`
/// (echoing the request exactly when fully satisfied).
pub fn read_into<T, Src>(
    source: &mut Src,
    dst: &mut SampleBuf<T>,
    amount: Quantity,
) -> SampleStreamResult<Quantity>
where
    T: Sample,
    Src: SampleSource<T> + ?Sized,
{
    let src_fmt = source.format();
    let dst_fmt = StreamFormat::new(dst.rate(), dst.channels(), T::FORMAT);
    if !dst_fmt.compatible(&src_fmt) {
        return Err(SampleStreamError::format_mismatch(src_fmt, dst_fmt));
    }

    let requested = frames_from(amount, Some(src_fmt.rate))?;
    let want = requested.min(dst.frames());

    let mut total = 0usize;
    while total < want {
        let got = source.read_into(dst, total, want - total)?;
        if got == 0 {
            break;
        }
        total += got;
    }

    Ok(transferred_as(
        Some((amount, requested)),
        total,
        src_fmt.rate,
    ))
}
