//! Configuration management for silence trimming

use crate::audio::QuantizePolicy;
use crate::error::{AudioTrimError, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub trim: TrimConfig,
    pub encoder: EncoderConfig,
    pub output: OutputConfig,
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    pub threshold: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub policy: QuantizePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub suffix: String,
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub jobs: usize,
    pub verbose: bool,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self { threshold: 0.1 }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: String::from("_trimmed"),
            overwrite: false,
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            jobs: num_cpus::get(),
            verbose: false,
        }
    }
}

impl Config {
    pub fn threshold(&self) -> f32 {
        self.trim.threshold
    }

    pub fn policy(&self) -> QuantizePolicy {
        self.encoder.policy
    }

    pub fn suffix(&self) -> &str {
        &self.output.suffix
    }

    pub fn overwrite(&self) -> bool {
        self.output.overwrite
    }

    pub fn jobs(&self) -> usize {
        self.processing.jobs
    }

    pub fn verbose(&self) -> bool {
        self.processing.verbose
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "audiotrim", about = "Trim leading and trailing silence from WAV audio", version, author)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short = 't', long = "threshold", global = true, help = "Silence threshold, minimum |sample| kept (0.0 - 1.0)")]
    pub threshold: Option<f32>,

    #[arg(long = "strict", global = true, help = "Fail on samples outside [-1.0, 1.0] instead of clipping")]
    pub strict: bool,

    #[arg(long = "overwrite", global = true, help = "Replace existing output files")]
    pub overwrite: bool,

    #[arg(long = "suffix", global = true, help = "File name suffix for trimmed output")]
    pub suffix: Option<String>,

    #[arg(short = 'j', long = "jobs", global = true, help = "Parallel jobs for batch mode")]
    pub jobs: Option<usize>,

    #[arg(short = 'c', long = "config", global = true, help = "Config file path (TOML format)")]
    pub config_file: Option<PathBuf>,

    #[arg(short = 'v', long = "verbose", global = true, help = "Enable verbose output mode")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Trim a single WAV file
    Trim {
        input: PathBuf,
        #[arg(short = 'o', long = "output", help = "Output path (default: <name><suffix>.wav next to the input)")]
        output: Option<PathBuf>,
        #[arg(long = "in-place", conflicts_with = "output", help = "Replace the input file")]
        in_place: bool,
    },
    /// Trim every WAV file in a directory
    Batch {
        dir: PathBuf,
        #[arg(short = 'r', long = "recursive")]
        recursive: bool,
    },
    /// Delete previously written trimmed files
    Clean {
        dir: PathBuf,
        #[arg(short = 'r', long = "recursive")]
        recursive: bool,
    },
    /// Print the header of a PCM16 WAV file
    Inspect {
        file: PathBuf,
    },
    /// Play a WAV file through the default output device
    Preview {
        file: PathBuf,
        #[arg(long = "trimmed", help = "Play the trimmed version instead of the original")]
        trimmed: bool,
    },
    /// Write a default config file
    InitConfig {
        #[arg(default_value = "audiotrim.toml")]
        path: PathBuf,
    },
}

impl Config {
    /// Create config from command line arguments and config file
    pub fn from_args(args: &Args) -> Result<Self> {
        // First load config file (if provided)
        let mut config = if let Some(config_path) = &args.config_file {
            Self::from_file(config_path)?
        } else {
            Self::default()
        };

        // Command line arguments override config file settings
        if let Some(threshold) = args.threshold {
            config.trim.threshold = threshold;
        }
        if args.strict {
            config.encoder.policy = QuantizePolicy::Strict;
        }
        if args.overwrite {
            config.output.overwrite = true;
        }
        if let Some(suffix) = &args.suffix {
            config.output.suffix = suffix.clone();
        }
        if let Some(jobs) = args.jobs {
            config.processing.jobs = jobs;
        }
        config.processing.verbose |= args.verbose;

        config.validate()?;
        Ok(config)
    }

    /// Load config from TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AudioTrimError::config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| AudioTrimError::config(format!("Failed to parse config file: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.trim.threshold) {
            return Err(AudioTrimError::config("Threshold must be in range [0.0, 1.0]"));
        }

        if self.output.suffix.is_empty() {
            return Err(AudioTrimError::config("Output suffix cannot be empty"));
        }
        if self.output.suffix.contains(['/', '\\']) {
            return Err(AudioTrimError::config("Output suffix cannot contain path separators"));
        }

        if self.processing.jobs == 0 {
            return Err(AudioTrimError::config("Job count must be greater than 0"));
        }
        if self.processing.jobs > num_cpus::get() * 4 {
            return Err(AudioTrimError::config("Job count cannot exceed 4x logical CPU cores"));
        }

        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AudioTrimError::config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| AudioTrimError::config(format!("Failed to write config file: {}", e)))
    }

    pub fn create_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        Self::default().save_to_file(path)
    }
}
