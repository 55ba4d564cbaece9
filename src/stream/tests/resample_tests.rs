//! Tests for the streaming rate adapter.

use crate::stream::{BufferSink, ResampleSink, SampleSink};
use crate::{SampleBuf, SampleStreamError};
use ndarray::{Array1, Array2, array};

fn ramp64(frames: usize, rate: f64) -> SampleBuf<f64> {
    super::ramp::<f64>(frames, rate)
}

#[test]
fn split_write_matches_single_write() {
    // A 64-frame 48 kHz ramp resampled to 44.1 kHz, written in one call
    // versus split at frame 30, must produce the same output: the phase
    // and carry state make the call boundary invisible.
    let input = ramp64(64, 48_000.0);

    let one_call = {
        let inner = BufferSink::<f64>::new(44_100.0, 1).unwrap();
        let mut sink = ResampleSink::new(inner, 48_000.0).unwrap();
        assert_eq!(sink.write_from(&input, 0, 64).unwrap(), 64);
        sink.into_inner().into_buf().unwrap()
    };

    let two_calls = {
        let inner = BufferSink::<f64>::new(44_100.0, 1).unwrap();
        let mut sink = ResampleSink::new(inner, 48_000.0).unwrap();
        assert_eq!(sink.write_from(&input, 0, 30).unwrap(), 30);
        assert_eq!(sink.write_from(&input, 30, 34).unwrap(), 34);
        sink.into_inner().into_buf().unwrap()
    };

    assert_eq!(one_call.frames(), two_calls.frames());
    for frame in 0..one_call.frames() {
        let diff = (one_call[(0, frame)] - two_calls[(0, frame)]).abs();
        assert!(
            diff < 1e-6,
            "frame {frame} differs by {diff}: {} vs {}",
            one_call[(0, frame)],
            two_calls[(0, frame)]
        );
    }
}

#[test]
fn equal_rates_pass_samples_through() {
    let input = ramp64(32, 48_000.0);
    let inner = BufferSink::<f64>::new(48_000.0, 1).unwrap();
    let mut sink = ResampleSink::new(inner, 48_000.0).unwrap();
    assert_eq!(sink.write_from(&input, 0, 32).unwrap(), 32);

    let out = sink.into_inner().into_buf().unwrap();
    assert_eq!(out.frames(), 32);
    for frame in 0..32 {
        assert_eq!(out[(0, frame)], input[(0, frame)]);
    }
}

#[test]
fn first_output_is_first_input() {
    let input = SampleBuf::from_mono(array![0.75f64, 0.5, 0.25], 48_000.0).unwrap();
    let inner = BufferSink::<f64>::new(44_100.0, 1).unwrap();
    let mut sink = ResampleSink::new(inner, 48_000.0).unwrap();
    sink.write_from(&input, 0, 3).unwrap();

    let out = sink.into_inner().into_buf().unwrap();
    assert!(out.frames() >= 1);
    assert_eq!(out[(0, 0)], 0.75);
}

#[test]
fn upsampling_output_length() {
    // 441 input frames at 44.1 kHz into a 48 kHz sink: output frames are
    // the positions 1 + k * (44100/48000) that fall inside the input.
    let input = ramp64(441, 44_100.0);
    let inner = BufferSink::<f64>::new(48_000.0, 1).unwrap();
    let mut sink = ResampleSink::new(inner, 44_100.0).unwrap();
    assert_eq!(sink.write_from(&input, 0, 441).unwrap(), 441);

    let step = 44_100.0f64 / 48_000.0;
    let expected = ((441.0 - 1.0) / step).floor() as usize + 1;
    let out = sink.into_inner().into_buf().unwrap();
    assert_eq!(out.frames(), expected);
}

#[test]
fn zero_count_write_is_a_no_op() {
    let input = ramp64(8, 48_000.0);
    let inner = BufferSink::<f64>::new(44_100.0, 1).unwrap();
    let mut sink = ResampleSink::new(inner, 48_000.0).unwrap();
    assert_eq!(sink.write_from(&input, 0, 0).unwrap(), 0);
    assert_eq!(sink.into_inner().len_frames(), 0);
}

#[test]
fn early_close_inverts_the_ratio() {
    // The wrapped sink accepts 10 output frames and closes; the reported
    // input consumption is 10 output frames scaled back to input rate.
    let input = ramp64(64, 48_000.0);
    let inner = BufferSink::<f64>::with_capacity(44_100.0, 1, 10).unwrap();
    let mut sink = ResampleSink::new(inner, 48_000.0).unwrap();

    let consumed = sink.write_from(&input, 0, 64).unwrap();
    let step = 48_000.0f64 / 44_100.0;
    assert_eq!(consumed, (10.0 * step).round() as usize);
    assert_eq!(sink.into_inner().len_frames(), 10);
}

#[test]
fn channels_stay_aligned() {
    // Linear interpolation is linear: a channel that is half another
    // channel stays exactly half after resampling.
    let frames = 50;
    let mut data = Array2::<f64>::zeros((2, frames));
    for i in 0..frames {
        data[[0, i]] = i as f64 / frames as f64;
        data[[1, i]] = 0.5 * i as f64 / frames as f64;
    }
    let input = SampleBuf::new(data, 48_000.0).unwrap();

    let inner = BufferSink::<f64>::new(32_000.0, 2).unwrap();
    let mut sink = ResampleSink::new(inner, 48_000.0).unwrap();
    assert_eq!(sink.channels(), 2);
    assert_eq!(sink.write_from(&input, 0, frames).unwrap(), frames);

    let out = sink.into_inner().into_buf().unwrap();
    assert!(out.frames() > 0);
    for frame in 0..out.frames() {
        let diff = (out[(1, frame)] - 0.5 * out[(0, frame)]).abs();
        assert!(diff < 1e-12, "frame {frame} out of alignment by {diff}");
    }
}

#[test]
fn chunked_scratch_matches_one_shot() {
    // A tiny internal block forces many scratch flushes per call; the
    // output must be identical to the large-block configuration.
    let input = ramp64(64, 48_000.0);

    let big = {
        let inner = BufferSink::<f64>::new(44_100.0, 1).unwrap();
        let mut sink = ResampleSink::with_block_size(inner, 48_000.0, 4096).unwrap();
        sink.write_from(&input, 0, 64).unwrap();
        sink.into_inner().into_buf().unwrap()
    };
    let small = {
        let inner = BufferSink::<f64>::new(44_100.0, 1).unwrap();
        let mut sink = ResampleSink::with_block_size(inner, 48_000.0, 5).unwrap();
        sink.write_from(&input, 0, 64).unwrap();
        sink.into_inner().into_buf().unwrap()
    };

    assert_eq!(big, small);
}

#[test]
fn invalid_construction_is_rejected() {
    let inner = BufferSink::<f64>::new(44_100.0, 1).unwrap();
    assert!(matches!(
        ResampleSink::new(inner, 0.0).unwrap_err(),
        SampleStreamError::InvalidParameter { .. }
    ));

    let inner = BufferSink::<f64>::new(44_100.0, 1).unwrap();
    assert!(ResampleSink::with_block_size(inner, 48_000.0, 0).is_err());
}

#[test]
fn interpolates_between_frames() {
    // Downsampling by exactly 2 with a step of 2.0 lands every output on
    // an input frame: positions 1, 3, 5, ...
    let input = SampleBuf::from_mono(
        Array1::from_vec(vec![0.0f64, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]),
        48_000.0,
    )
    .unwrap();
    let inner = BufferSink::<f64>::new(24_000.0, 1).unwrap();
    let mut sink = ResampleSink::new(inner, 48_000.0).unwrap();
    assert_eq!(sink.write_from(&input, 0, 8).unwrap(), 8);

    let out = sink.into_inner().into_buf().unwrap();
    assert_eq!(out.frames(), 4);
    assert_eq!(out.channel(0).to_vec(), vec![0.0, 0.2, 0.4, 0.6]);
}
