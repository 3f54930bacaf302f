//! File trimming pipeline: decode, trim, encode

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use std::io::ErrorKind;
use crate::audio::{read_wav_file, Pcm16Encoder, PreviewSink, SampleBuffer};
use crate::config::Config;
use crate::error::{AudioTrimError, Result};
use crate::processing::{TrimResult, Trimmer};

/// `<dir>/<stem><suffix>.<ext>` next to `input`.
pub fn trimmed_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    input.with_file_name(name)
}

/// Whether `path` looks like output previously written with `suffix`.
pub fn is_trimmed_output(path: &Path, suffix: &str) -> bool {
    path.file_stem()
        .map(|s| s.to_string_lossy().ends_with(suffix))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Written,
    /// Output already existed and overwriting was not requested.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct TrimReport {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub outcome: Outcome,
    pub sample_rate: u32,
    pub channels: u16,
    pub original_samples: usize,
    pub retained_samples: usize,
    pub range: Option<(usize, usize)>,
    pub processing_time: Duration,
}

impl TrimReport {
    fn from_result(input: &Path, output: &Path, source: &SampleBuffer, result: &TrimResult, elapsed: Duration) -> Self {
        Self {
            input_path: input.to_path_buf(),
            output_path: output.to_path_buf(),
            outcome: Outcome::Written,
            sample_rate: source.sample_rate(),
            channels: source.channels(),
            original_samples: result.original_len,
            retained_samples: result.retained_len(),
            range: result.range,
            processing_time: elapsed,
        }
    }

    fn skipped(input: &Path, output: &Path) -> Self {
        Self {
            input_path: input.to_path_buf(),
            output_path: output.to_path_buf(),
            outcome: Outcome::Skipped,
            sample_rate: 0,
            channels: 0,
            original_samples: 0,
            retained_samples: 0,
            range: None,
            processing_time: Duration::ZERO,
        }
    }

    pub fn trimmed_ratio(&self) -> f64 {
        if self.original_samples == 0 {
            return 0.0;
        }
        1.0 - self.retained_samples as f64 / self.original_samples as f64
    }

    fn seconds(&self, samples: usize) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        (samples / self.channels as usize) as f64 / self.sample_rate as f64
    }

    pub fn original_duration(&self) -> f64 {
        self.seconds(self.original_samples)
    }

    pub fn retained_duration(&self) -> f64 {
        self.seconds(self.retained_samples)
    }
}

impl fmt::Display for TrimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.outcome == Outcome::Skipped {
            return write!(f, "{} -> {} (exists, skipped)", self.input_path.display(), self.output_path.display());
        }
        write!(
            f,
            "{} -> {}: {:.3}s -> {:.3}s, trimmed {:.2}%",
            self.input_path.display(),
            self.output_path.display(),
            self.original_duration(),
            self.retained_duration(),
            self.trimmed_ratio() * 100.0
        )
    }
}

#[derive(Debug, Clone)]
pub struct TrimProcessor {
    trimmer: Trimmer,
    encoder: Pcm16Encoder,
    overwrite: bool,
    suffix: String,
}

impl TrimProcessor {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            trimmer: Trimmer::new(config.threshold())?,
            encoder: Pcm16Encoder::new(config.policy()),
            overwrite: config.overwrite(),
            suffix: config.suffix().to_string(),
        })
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Trim in memory without touching the filesystem.
    pub fn trim_buffer(&self, buffer: &SampleBuffer) -> Result<TrimResult> {
        self.trimmer.trim(buffer)
    }

    /// Trim `input` into its default `<stem><suffix>` sibling.
    pub fn process(&self, input: &Path) -> Result<TrimReport> {
        let output = trimmed_path(input, &self.suffix);
        self.process_file(input, &output)
    }

    /// Replace `input` with its trimmed version.
    pub fn process_in_place(&self, input: &Path) -> Result<TrimReport> {
        self.write(input, input, true)
    }

    /// Existing outputs are left alone unless `overwrite` is set, including
    /// one created by another writer while `input` was being processed.
    pub fn process_file(&self, input: &Path, output: &Path) -> Result<TrimReport> {
        if output.exists() && !self.overwrite {
            log::warn!("Output exists, skipping: {}", output.display());
            return Ok(TrimReport::skipped(input, output));
        }
        match self.write(input, output, self.overwrite) {
            Err(AudioTrimError::Io(e)) if e.kind() == ErrorKind::AlreadyExists && !self.overwrite => {
                log::warn!("Output appeared during processing, skipping: {}", output.display());
                Ok(TrimReport::skipped(input, output))
            }
            other => other,
        }
    }

    /// Decode `input` and hand it to `sink`, trimmed first when `trimmed`
    /// is set. Returns the buffer that was played.
    pub fn preview(&self, input: &Path, trimmed: bool, sink: &mut dyn PreviewSink) -> Result<SampleBuffer> {
        let mut buffer = read_wav_file(input)?;
        if trimmed {
            buffer = self.trim_buffer(&buffer)?.into_buffer();
        }
        log::info!("Playing {} ({:.2}s)", input.display(), buffer.duration_secs());
        sink.play(&buffer)?;
        Ok(buffer)
    }

    fn write(&self, input: &Path, output: &Path, replace: bool) -> Result<TrimReport> {
        let start = Instant::now();

        let source = read_wav_file(input)?;
        let result = self.trimmer.trim(&source)?;
        if result.is_empty() {
            log::warn!("{} is silent at threshold {}", input.display(), self.trimmer.threshold());
        }
        if replace {
            self.encoder.write_file(&result.buffer, output)?;
        } else {
            self.encoder.write_new_file(&result.buffer, output)?;
        }

        Ok(TrimReport::from_result(input, output, &source, &result, start.elapsed()))
    }
}
