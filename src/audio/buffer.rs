//! Interleaved sample buffer

use ndarray::{Array1, ArrayView1};
use crate::error::{AudioTrimError, Result};

/// Channel-interleaved `f32` samples plus their format.
///
/// Values outside `[-1.0, 1.0]` are accepted; they are only clipped (or
/// rejected, depending on policy) when quantized for output.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Array1<f32>,
    channels: u16,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Arrays with a reversed or strided layout are copied into standard
    /// layout so the samples are always contiguous in interleaved order.
    pub fn new(samples: Array1<f32>, channels: u16, sample_rate: u32) -> Result<Self> {
        validate_format(channels, sample_rate)?;
        let samples = if samples.is_standard_layout() {
            samples
        } else {
            samples.as_standard_layout().into_owned()
        };
        Ok(Self { samples, channels, sample_rate })
    }

    pub fn from_vec(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Result<Self> {
        Self::new(Array1::from(samples), channels, sample_rate)
    }

    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::from_vec(samples, 1, sample_rate)
    }

    /// Empty buffer carrying the given format.
    pub fn empty(channels: u16, sample_rate: u32) -> Result<Self> {
        Self::new(Array1::zeros(0), channels, sample_rate)
    }

    pub fn samples(&self) -> ArrayView1<'_, f32> {
        self.samples.view()
    }

    pub fn as_slice(&self) -> &[f32] {
        // Every constructor stores standard layout.
        self.samples.as_slice().unwrap_or(&[])
    }

    pub fn into_samples(self) -> Array1<f32> {
        self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples per channel. A trailing partial frame is not counted.
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Peak absolute sample value, ignoring NaN.
    pub fn peak(&self) -> f32 {
        self.samples.iter()
            .filter(|s| !s.is_nan())
            .fold(0.0f32, |p, s| p.max(s.abs()))
    }

    /// Copy of `samples[start..=end]` with the same format.
    pub(crate) fn copy_range(&self, start: usize, end: usize) -> Self {
        Self {
            samples: self.samples.slice(ndarray::s![start..=end]).to_owned(),
            channels: self.channels,
            sample_rate: self.sample_rate,
        }
    }
}

pub(crate) fn validate_format(channels: u16, sample_rate: u32) -> Result<()> {
    if channels == 0 {
        return Err(AudioTrimError::invalid_parameter("Channel count must be at least 1"));
    }
    if sample_rate == 0 {
        return Err(AudioTrimError::invalid_parameter("Sample rate must be greater than 0"));
    }
    Ok(())
}
