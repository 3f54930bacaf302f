//! WAV decoding into interleaved float samples

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use hound::{SampleFormat, WavReader};
use crate::audio::SampleBuffer;
use crate::error::{AudioTrimError, Result};

/// Decode a WAV file from disk.
pub fn read_wav_file<P: AsRef<Path>>(path: P) -> Result<SampleBuffer> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let buffer = read_wav(BufReader::new(file))?;
    log::debug!(
        "Decoded {}: {:.2}s, {}Hz, {}ch",
        path.display(), buffer.duration_secs(), buffer.sample_rate(), buffer.channels()
    );
    Ok(buffer)
}

/// Decode WAV data from any reader.
///
/// Integer PCM is scaled by `2^(bits-1) - 1` so that full-scale 16-bit
/// samples map back to exactly `±1.0`.
pub fn read_wav<R: Read>(reader: R) -> Result<SampleBuffer> {
    let mut reader = WavReader::new(reader)
        .map_err(|e| AudioTrimError::decode(format!("Cannot create WAV reader: {}", e)))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader.samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| AudioTrimError::decode(format!("Failed to read sample: {}", e)))?,
        (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
            let scale = ((1i64 << (bits - 1)) - 1) as f32;
            reader.samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| AudioTrimError::decode(format!("Failed to read sample: {}", e)))?
        }
        (format, bits) => {
            return Err(AudioTrimError::decode(format!(
                "Unsupported sample format: {:?} {}-bit", format, bits
            )));
        }
    };

    SampleBuffer::from_vec(samples, spec.channels, spec.sample_rate)
        .map_err(|e| AudioTrimError::decode(e.to_string()))
}
