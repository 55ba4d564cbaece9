//! Frequency-domain buffers and the forward/inverse transforms.
//!
//! [`fft`] turns a time-domain [`SampleBuf`] into a [`SpectrumBuf`] of
//! complex bins, one full-length transform per channel. The spectrum's rate
//! is expressed in the inverse sense — seconds-per-bin, `frames / rate` —
//! so [`ifft`] can recover the original time rate from the spectrum alone.

use ndarray::{Array2, ArrayView2};
use num_complex::Complex;
use rustfft::FftPlanner;

use crate::{ConvertTo, Sample, SampleBuf, SampleStreamError, SampleStreamResult};

/// A frequency-domain buffer: complex bins per channel, tagged with a
/// spectral rate in seconds-per-bin.
///
/// Layout matches [`SampleBuf`]: channel-major, shape `(channels, bins)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumBuf {
    data: Array2<Complex<f64>>,
    rate: f64,
}

impl SpectrumBuf {
    /// Creates a spectrum buffer from a channel-major array of bins.
    pub fn new(data: Array2<Complex<f64>>, rate: f64) -> SampleStreamResult<Self> {
        if data.nrows() == 0 {
            return Err(SampleStreamError::invalid_parameter(
                "data",
                "a spectrum needs at least one channel",
            ));
        }
        if !(rate > 0.0 && rate.is_finite()) {
            return Err(SampleStreamError::invalid_parameter(
                "rate",
                format!("spectral rate must be positive and finite, got {rate}"),
            ));
        }
        Ok(Self { data, rate })
    }

    /// Spectral rate in seconds-per-bin.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.data.nrows()
    }

    /// Number of bins per channel.
    pub fn bins(&self) -> usize {
        self.data.ncols()
    }

    /// Immutable view of the underlying `(channels, bins)` array.
    pub fn view(&self) -> ArrayView2<'_, Complex<f64>> {
        self.data.view()
    }
}

/// Computes the per-channel complex spectrum of a time-domain buffer.
///
/// The resulting spectrum has as many bins as the input has frames and a
/// rate of `frames / rate` seconds-per-bin (the reciprocal of the bin
/// spacing in Hz). Fails on an empty buffer.
pub fn fft<T: Sample>(buf: &SampleBuf<T>) -> SampleStreamResult<SpectrumBuf> {
    let frames = buf.frames();
    if frames == 0 {
        return Err(SampleStreamError::invalid_parameter(
            "buf",
            "cannot transform an empty buffer",
        ));
    }

    let mut planner = FftPlanner::<f64>::new();
    let plan = planner.plan_fft_forward(frames);

    let mut out = Array2::<Complex<f64>>::zeros((buf.channels(), frames));
    let mut line: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); frames];
    for ch in 0..buf.channels() {
        for (slot, sample) in line.iter_mut().zip(buf.channel(ch).iter()) {
            let value: f64 = sample.convert_to()?;
            *slot = Complex::new(value, 0.0);
        }
        plan.process(&mut line);
        for (bin, value) in line.iter().enumerate() {
            out[[ch, bin]] = *value;
        }
    }

    SpectrumBuf::new(out, frames as f64 / buf.rate())
}

/// Inverse transform of [`fft`].
///
/// Applies the `1/N` normalization rustfft leaves to the caller and keeps
/// the real part, producing an `f64` time-domain buffer whose rate is
/// `bins / spectral_rate` — the rate of the buffer the spectrum came from.
pub fn ifft(spectrum: &SpectrumBuf) -> SampleStreamResult<SampleBuf<f64>> {
    let bins = spectrum.bins();
    if bins == 0 {
        return Err(SampleStreamError::invalid_parameter(
            "spectrum",
            "cannot invert an empty spectrum",
        ));
    }

    let mut planner = FftPlanner::<f64>::new();
    let plan = planner.plan_fft_inverse(bins);
    let scale = 1.0 / bins as f64;

    let mut out = Array2::<f64>::zeros((spectrum.channels(), bins));
    let mut line: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); bins];
    for ch in 0..spectrum.channels() {
        for (slot, bin) in line.iter_mut().zip(spectrum.view().row(ch).iter()) {
            *slot = *bin;
        }
        plan.process(&mut line);
        for (frame, value) in line.iter().enumerate() {
            out[[ch, frame]] = value.re * scale;
        }
    }

    SampleBuf::new(out, bins as f64 / spectrum.rate())
}
