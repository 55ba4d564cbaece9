//! Whole-buffer resampling backed by `rubato`.
//!
//! This is the offline, quality-first path: it converts a complete
//! [`SampleBuf`] to a new rate in one operation. The streaming counterpart
//! — [`ResampleSink`](crate::stream::ResampleSink) — trades stopband
//! quality for exact phase continuity across chunked writes; use this
//! module when the whole signal is in memory and quality matters.

use crate::{
    ConvertTo, RealFloat, Sample, SampleBuf, SampleStreamError, SampleStreamResult, rates_match,
};
use ndarray::Array2;
use num_traits::ToPrimitive;
use rubato::{
    FftFixedInOut, Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType,
    WindowFunction,
};

const FAST_BLOCK: usize = 4096;
const HIGH_BLOCK: usize = 8192;

/// Quality/performance trade-off for offline resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResamplingQuality {
    /// FFT-based resampling; good quality at low cost.
    Fast,
    /// Long-sinc interpolation; best quality for offline processing.
    High,
}

fn block_size(quality: ResamplingQuality, input_len: usize) -> usize {
    let target = match quality {
        ResamplingQuality::Fast => FAST_BLOCK,
        ResamplingQuality::High => HIGH_BLOCK,
    };
    input_len.min(target).max(1)
}

fn integral_rate(name: &'static str, rate: f64) -> SampleStreamResult<usize> {
    let rounded = rate.round();
    if rounded < 1.0 || (rate - rounded).abs() > 1e-6 {
        return Err(SampleStreamError::invalid_parameter(
            name,
            format!("resampling requires an integral rate of at least 1 Hz, got {rate}"),
        ));
    }
    rounded.to_usize().ok_or_else(|| {
        SampleStreamError::invalid_parameter(name, format!("rate {rate} out of range"))
    })
}

/// Resamples a buffer to a new sample rate.
///
/// `F` is the working floating-point precision (`f32` or `f64`); the input
/// is converted to `F`, processed per channel through rubato, and converted
/// back to `T`. When the target rate already matches the buffer's rate the
/// input is returned unchanged.
///
/// # Errors
/// Fails on an empty buffer, a non-positive or fractional target rate, or
/// an internal resampler error.
///
/// # Example
/// ```rust,ignore
/// let audio = SampleBuf::from_mono(samples, 44_100.0)?;
/// let wideband = resample::<f64, _>(&audio, 48_000.0, ResamplingQuality::High)?;
/// assert_eq!(wideband.rate(), 48_000.0);
/// ```
pub fn resample<F, T>(
    buf: &SampleBuf<T>,
    target_rate: f64,
    quality: ResamplingQuality,
) -> SampleStreamResult<SampleBuf<T>>
where
    F: RealFloat + ConvertTo<T>,
    T: Sample + ConvertTo<F>,
{
    if buf.is_empty() {
        return Err(SampleStreamError::invalid_parameter(
            "buf",
            "cannot resample an empty buffer",
        ));
    }
    if rates_match(buf.rate(), target_rate) {
        return Ok(buf.clone());
    }

    let input_rate = integral_rate("rate", buf.rate())?;
    let output_rate = integral_rate("target_rate", target_rate)?;
    let channels = buf.channels();
    let frames = buf.frames();

    let input = channel_vecs::<F, T>(buf)?;

    let output = match quality {
        ResamplingQuality::Fast => {
            let mut resampler = FftFixedInOut::<F>::new(
                input_rate,
                output_rate,
                block_size(quality, frames),
                channels,
            )
            .map_err(|e| SampleStreamError::processing("fast_resampler", e.to_string()))?;
            run_resampler(&mut resampler, &input)?
        }
        ResamplingQuality::High => {
            let ratio = output_rate as f64 / input_rate as f64;
            let mut resampler = SincFixedIn::<F>::new(
                ratio,
                2.0,
                SincInterpolationParameters {
                    sinc_len: 256,
                    f_cutoff: 0.95,
                    interpolation: SincInterpolationType::Cubic,
                    oversampling_factor: 512,
                    window: WindowFunction::BlackmanHarris2,
                },
                block_size(quality, frames),
                channels,
            )
            .map_err(|e| SampleStreamError::processing("high_resampler", e.to_string()))?;
            run_resampler(&mut resampler, &input)?
        }
    };

    // The tail chunk is zero-padded before processing; trim the surplus.
    let expected = ((frames as f64) * (output_rate as f64 / input_rate as f64)).round() as usize;
    from_channel_vecs::<F, T>(output, target_rate, expected)
}

/// Resamples a buffer by a rate ratio (`output_rate / input_rate`).
pub fn resample_by_ratio<F, T>(
    buf: &SampleBuf<T>,
    ratio: F,
    quality: ResamplingQuality,
) -> SampleStreamResult<SampleBuf<T>>
where
    F: RealFloat + ConvertTo<T>,
    T: Sample + ConvertTo<F>,
{
    let ratio = ratio.to_f64().unwrap_or(f64::NAN);
    if !(ratio > 0.0 && ratio.is_finite()) {
        return Err(SampleStreamError::invalid_parameter(
            "ratio",
            format!("invalid resampling ratio: {ratio}"),
        ));
    }
    resample::<F, T>(buf, (buf.rate() * ratio).round(), quality)
}

/// Extracts per-channel sample vectors in the working precision.
fn channel_vecs<F, T>(buf: &SampleBuf<T>) -> SampleStreamResult<Vec<Vec<F>>>
where
    F: RealFloat,
    T: Sample + ConvertTo<F>,
{
    (0..buf.channels())
        .map(|ch| {
            buf.channel(ch)
                .iter()
                .map(|s| s.convert_to())
                .collect::<SampleStreamResult<Vec<F>>>()
        })
        .collect()
}

/// Rebuilds a buffer from per-channel output vectors, trimming each channel
/// to at most `max_frames`.
fn from_channel_vecs<F, T>(
    mut channels: Vec<Vec<F>>,
    rate: f64,
    max_frames: usize,
) -> SampleStreamResult<SampleBuf<T>>
where
    F: RealFloat + ConvertTo<T>,
    T: Sample,
{
    if channels.is_empty() {
        return Err(SampleStreamError::processing(
            "resampler",
            "no output channels produced",
        ));
    }
    for channel in &mut channels {
        if channel.len() > max_frames {
            channel.truncate(max_frames);
        }
    }
    let frames = channels[0].len();
    let mut data = Array2::<T>::zeros((channels.len(), frames));
    for (ch, samples) in channels.iter().enumerate() {
        for (frame, sample) in samples.iter().enumerate() {
            data[[ch, frame]] = sample.convert_to()?;
        }
    }
    SampleBuf::new(data, rate)
}

/// Drives a rubato resampler over the whole input, chunk by chunk, with a
/// reused zero-padded chunk buffer.
fn run_resampler<F, R>(resampler: &mut R, input: &[Vec<F>]) -> SampleStreamResult<Vec<Vec<F>>>
where
    F: RealFloat,
    R: Resampler<F>,
{
    let channels = input.len();
    let len = input[0].len();
    let chunk = resampler.input_frames_max();

    let mut chunk_data = vec![vec![F::zero(); chunk]; channels];
    let mut output: Vec<Vec<F>> = vec![Vec::new(); channels];

    let mut start = 0;
    while start < len {
        let end = (start + chunk).min(len);
        for (ch, channel) in input.iter().enumerate() {
            let src = &channel[start..end];
            chunk_data[ch][..src.len()].copy_from_slice(src);
            chunk_data[ch][src.len()..].fill(F::zero());
        }

        let processed = resampler.process(&chunk_data, None).map_err(|e| {
            SampleStreamError::processing(
                "resampler",
                format!(
                    "chunk resampling failed (start={start}, chunk={chunk}, channels={channels}): {e}"
                ),
            )
        })?;
        for (ch, samples) in processed.into_iter().enumerate() {
            output[ch].extend(samples);
        }
        start = end;
    }

    Ok(output)
}
