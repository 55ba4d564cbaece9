//! Tests for the streaming subsystem.
//!
//! Covers the adapter sinks, the memory endpoints, and the copy layer that
//! composes them.

use ndarray::{Array1, Array2};

use crate::{ConvertTo, Sample, SampleBuf};

mod mix_tests;
mod resample_tests;

/// A mono ramp buffer: frame `i` holds `i / frames`, converted to `T`.
pub(crate) fn ramp<T>(frames: usize, rate: f64) -> SampleBuf<T>
where
    T: Sample,
    f64: ConvertTo<T>,
{
    let samples = (0..frames)
        .map(|i| (i as f64 / frames as f64).convert_to().unwrap())
        .collect::<Vec<T>>();
    SampleBuf::from_mono(Array1::from_vec(samples), rate).unwrap()
}

/// A stereo buffer whose second channel is half the first channel's ramp.
pub(crate) fn stereo_ramp<T>(frames: usize, rate: f64) -> SampleBuf<T>
where
    T: Sample,
    f64: ConvertTo<T>,
{
    let mut data = Array2::<T>::zeros((2, frames));
    for i in 0..frames {
        let value = i as f64 / frames as f64;
        data[[0, i]] = value.convert_to().unwrap();
        data[[1, i]] = (value * 0.5).convert_to().unwrap();
    }
    SampleBuf::new(data, rate).unwrap()
}
