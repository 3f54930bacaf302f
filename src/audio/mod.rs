//! Audio Module
//!
//! Sample buffers, WAV decoding, the PCM16 WAV encoder and preview playback.

pub mod buffer;
pub mod decoder;
pub mod encoder;
pub mod preview;

pub use buffer::SampleBuffer;
pub use decoder::{read_wav, read_wav_file};
pub use encoder::{quantize, Pcm16Encoder, QuantizePolicy, WavHeader, HEADER_SIZE};
pub use preview::PreviewSink;
#[cfg(feature = "playback")]
pub use preview::CpalPreview;
