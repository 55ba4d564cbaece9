//! Streaming endpoints and format/rate/channel conversion.
//!
//! This module is the streaming half of the crate: the
//! [`SampleSource`]/[`SampleSink`] capability contract, in-memory endpoint
//! implementations, the single-axis adapter sinks
//! ([`ReformatSink`], [`ResampleSink`], [`UpMixSink`], [`DownMixSink`]),
//! and the [`write`]/[`read`] copy layer that composes them.
//!
//! Everything here is single-threaded and synchronous: the primitives are
//! ordinary blocking calls, frames move strictly in input order one block
//! at a time, and each adapter privately owns its scratch state. One
//! logical copy operation drives an adapter chain at a time; reentrant use
//! of the same adapter instance is a usage error.
//!
//! # Example
//!
//! ```rust,ignore
//! use sample_streams::stream::{BufferSink, BufferSource, write};
//!
//! // A 48 kHz stereo f32 source feeding a 44.1 kHz mono i16 sink:
//! // reformat, resample, and down-mix stages are inserted automatically.
//! let mut source = BufferSource::new(&stereo_f32);
//! let mut sink = BufferSink::<i16>::new(44_100.0, 1)?;
//! let moved = write(&mut sink, &mut source, None, None)?;
//! ```

pub mod copy;
pub mod memory;
pub mod mix;
pub mod reformat;
pub mod resample;
pub mod traits;

#[cfg(test)]
mod tests;

pub use copy::{read, read_into, write, write_buf};
pub use memory::{BufferSink, BufferSource};
pub use mix::{DownMixSink, UpMixSink};
pub use reformat::ReformatSink;
pub use resample::ResampleSink;
pub use traits::{DEFAULT_BLOCK_SIZE, SampleSink, SampleSource, StreamFormat};
