//! Tests for the channel-mix adapter sinks.

use crate::stream::{BufferSink, DownMixSink, SampleSink, UpMixSink};
use crate::{SampleBuf, SampleStreamError};
use ndarray::array;

#[test]
fn down_mix_sums_channels() {
    // Values chosen to be exactly representable so the sums are exact.
    let input = SampleBuf::new(array![[0.25f32, 0.5], [0.125, 0.25]], 44_100.0).unwrap();

    let inner = BufferSink::<f32>::new(44_100.0, 1).unwrap();
    let mut mix = DownMixSink::new(inner, 2).unwrap();
    assert_eq!(mix.channels(), 2);
    assert_eq!(mix.write_from(&input, 0, 2).unwrap(), 2);

    let out = mix.into_inner().into_buf().unwrap();
    assert_eq!(out.channel(0).to_vec(), vec![0.375, 0.75]);
}

#[test]
fn up_mix_duplicates_mono() {
    let input = SampleBuf::from_mono(array![0.5f32, -0.25], 44_100.0).unwrap();

    let inner = BufferSink::<f32>::new(44_100.0, 2).unwrap();
    let mut mix = UpMixSink::new(inner).unwrap();
    assert_eq!(mix.channels(), 1);
    assert_eq!(mix.write_from(&input, 0, 2).unwrap(), 2);

    let out = mix.into_inner().into_buf().unwrap();
    assert_eq!(out.channel(0).to_vec(), vec![0.5, -0.25]);
    assert_eq!(out.channel(1).to_vec(), vec![0.5, -0.25]);
}

#[test]
fn down_mix_of_zero_channels_is_rejected() {
    let inner = BufferSink::<f32>::new(44_100.0, 1).unwrap();
    let err = DownMixSink::new(inner, 0).unwrap_err();
    assert_eq!(err, SampleStreamError::ZeroChannelSource);
}

#[test]
fn down_mix_requires_a_mono_inner_sink() {
    let inner = BufferSink::<f32>::new(44_100.0, 2).unwrap();
    assert!(DownMixSink::new(inner, 3).is_err());
}

#[test]
fn down_mix_saturates_fixed_point_sums() {
    // 0.75 + 0.75 exceeds full scale; the sum must clamp, not wrap.
    let threequarters = (0.75f64 * i16::MAX as f64).round() as i16;
    let input = SampleBuf::new(
        array![[threequarters, 0i16], [threequarters, 0]],
        8_000.0,
    )
    .unwrap();

    let inner = BufferSink::<i16>::new(8_000.0, 1).unwrap();
    let mut mix = DownMixSink::new(inner, 2).unwrap();
    assert_eq!(mix.write_from(&input, 0, 2).unwrap(), 2);

    let out = mix.into_inner().into_buf().unwrap();
    assert_eq!(out[(0, 0)], i16::MAX);
    assert_eq!(out[(0, 1)], 0);
}

#[test]
fn down_mix_reports_early_close() {
    let input = SampleBuf::new(
        array![[0.1f32, 0.2, 0.3, 0.4, 0.5], [0.0, 0.0, 0.0, 0.0, 0.0]],
        8_000.0,
    )
    .unwrap();

    let inner = BufferSink::<f32>::with_capacity(8_000.0, 1, 3).unwrap();
    let mut mix = DownMixSink::new(inner, 2).unwrap();
    assert_eq!(mix.write_from(&input, 0, 5).unwrap(), 3);
    assert_eq!(mix.write_from(&input, 3, 2).unwrap(), 0);
}

#[test]
fn channel_count_mismatch_is_rejected() {
    let input = SampleBuf::from_mono(array![0.5f32], 8_000.0).unwrap();
    let inner = BufferSink::<f32>::new(8_000.0, 1).unwrap();
    let mut mix = DownMixSink::new(inner, 2).unwrap();
    let err = mix.write_from(&input, 0, 1).unwrap_err();
    assert!(matches!(err, SampleStreamError::FormatMismatch { .. }));
}

#[test]
fn chunked_up_mix_matches_one_shot() {
    let input = super::ramp::<f32>(20, 8_000.0);

    let one_shot = {
        let inner = BufferSink::<f32>::new(8_000.0, 3).unwrap();
        let mut mix = UpMixSink::with_block_size(inner, 4096).unwrap();
        assert_eq!(mix.write_from(&input, 0, 20).unwrap(), 20);
        mix.into_inner().into_buf().unwrap()
    };

    let chunked = {
        let inner = BufferSink::<f32>::new(8_000.0, 3).unwrap();
        let mut mix = UpMixSink::with_block_size(inner, 7).unwrap();
        assert_eq!(mix.write_from(&input, 0, 20).unwrap(), 20);
        mix.into_inner().into_buf().unwrap()
    };

    assert_eq!(one_shot, chunked);
}
