//! Audio preview playback
//!
//! Playback is an external collaborator: callers hand a buffer to a
//! [`PreviewSink`] and get control back once it has been played.

use crate::audio::SampleBuffer;
use crate::error::Result;

pub trait PreviewSink {
    fn play(&mut self, buffer: &SampleBuffer) -> Result<()>;
}

#[cfg(feature = "playback")]
pub use self::device::CpalPreview;

#[cfg(feature = "playback")]
mod device {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::channel;
    use std::sync::Arc;
    use std::time::Duration;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use crate::audio::SampleBuffer;
    use crate::error::{AudioTrimError, Result};
    use super::PreviewSink;

    /// Plays through the default output device of the default host.
    pub struct CpalPreview {
        device: cpal::Device,
    }

    impl CpalPreview {
        pub fn new() -> Result<Self> {
            let host = cpal::default_host();
            let device = host.default_output_device()
                .ok_or_else(|| AudioTrimError::playback("No output device available"))?;
            if let Ok(name) = device.name() {
                log::debug!("Preview device: {}", name);
            }
            Ok(Self { device })
        }
    }

    impl PreviewSink for CpalPreview {
        fn play(&mut self, buffer: &SampleBuffer) -> Result<()> {
            if buffer.is_empty() {
                return Ok(());
            }

            let config = cpal::StreamConfig {
                channels: buffer.channels(),
                sample_rate: cpal::SampleRate(buffer.sample_rate()),
                buffer_size: cpal::BufferSize::Default,
            };

            let samples: Arc<Vec<f32>> = Arc::new(buffer.as_slice().to_vec());
            let position = Arc::new(AtomicUsize::new(0));
            let (done_tx, done_rx) = channel::<()>();

            let stream = self.device.build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let start = position.fetch_add(data.len(), Ordering::Relaxed);
                    for (i, out) in data.iter_mut().enumerate() {
                        *out = samples.get(start + i).copied().unwrap_or(0.0);
                    }
                    if start + data.len() >= samples.len() {
                        let _ = done_tx.send(());
                    }
                },
                |err| log::error!("Preview stream error: {}", err),
                None,
            ).map_err(|e| AudioTrimError::playback(format!("Cannot open output stream: {}", e)))?;

            stream.play()
                .map_err(|e| AudioTrimError::playback(format!("Cannot start playback: {}", e)))?;

            let timeout = Duration::from_secs_f64(buffer.duration_secs() + 1.0);
            if done_rx.recv_timeout(timeout).is_err() {
                log::warn!("Preview did not finish within {:.1}s", timeout.as_secs_f64());
            }
            // Let the device drain its last period.
            std::thread::sleep(Duration::from_millis(100));
            Ok(())
        }
    }
}
