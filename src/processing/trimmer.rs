//! Leading/trailing silence trimming

use crate::audio::SampleBuffer;
use crate::error::{AudioTrimError, Result};

/// Outcome of a trim: an owned copy of the retained samples.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimResult {
    pub buffer: SampleBuffer,
    /// Inclusive `(first, last)` indices of the retained samples in the
    /// source, or `None` when every sample was below the threshold.
    pub range: Option<(usize, usize)>,
    pub original_len: usize,
}

impl TrimResult {
    pub fn is_empty(&self) -> bool {
        self.range.is_none()
    }

    pub fn retained_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn removed_len(&self) -> usize {
        self.original_len - self.retained_len()
    }

    /// Fraction of the source that was removed, in `[0, 1]`.
    pub fn trimmed_ratio(&self) -> f64 {
        if self.original_len == 0 {
            return 0.0;
        }
        1.0 - self.retained_len() as f64 / self.original_len as f64
    }

    pub fn into_buffer(self) -> SampleBuffer {
        self.buffer
    }
}

pub fn validate_threshold(threshold: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(AudioTrimError::invalid_parameter(format!(
            "Threshold must be in range [0.0, 1.0], got {}", threshold
        )));
    }
    Ok(())
}

/// Drop leading and trailing samples whose magnitude is below `threshold`.
///
/// The interleaved stream is scanned as-is, so the cut points are not
/// aligned to frame boundaries. A buffer with no sample reaching the
/// threshold yields an empty result.
pub fn trim(buffer: &SampleBuffer, threshold: f32) -> Result<TrimResult> {
    validate_threshold(threshold)?;

    let samples = buffer.as_slice();
    let loud = |s: &f32| s.abs() >= threshold;

    let first = samples.iter().position(loud);
    let last = samples.iter().rposition(loud);

    let (buffer_out, range) = match (first, last) {
        (Some(i), Some(j)) => (buffer.copy_range(i, j), Some((i, j))),
        _ => (SampleBuffer::empty(buffer.channels(), buffer.sample_rate())?, None),
    };

    Ok(TrimResult {
        buffer: buffer_out,
        range,
        original_len: buffer.len(),
    })
}

/// A validated threshold applied to many buffers.
#[derive(Debug, Clone, Copy)]
pub struct Trimmer {
    threshold: f32,
}

impl Trimmer {
    pub fn new(threshold: f32) -> Result<Self> {
        validate_threshold(threshold)?;
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn trim(&self, buffer: &SampleBuffer) -> Result<TrimResult> {
        let result = trim(buffer, self.threshold)?;
        match result.range {
            Some((first, last)) => log::debug!(
                "Retained samples {}..={} of {} ({:.2}% trimmed)",
                first, last, result.original_len, result.trimmed_ratio() * 100.0
            ),
            None => log::debug!(
                "No sample of {} reaches threshold {}", result.original_len, self.threshold
            ),
        }
        Ok(result)
    }
}
