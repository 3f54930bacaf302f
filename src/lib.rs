//! audiotrim - Silence Trimmer with PCM16 WAV Export
//!
//! Drops leading and trailing samples below a magnitude threshold and writes
//! the result as a canonical 44-byte-header RIFF/WAVE PCM16 file.

pub mod audio;
pub mod config;
pub mod error;
pub mod processing;

pub use audio::{Pcm16Encoder, QuantizePolicy, SampleBuffer, WavHeader};
pub use config::{Args, Command, Config};
pub use error::{AudioTrimError, Result};
pub use processing::{trim, TrimProcessor, TrimReport, TrimResult, Trimmer};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// `debug` when verbose, `info` otherwise; `RUST_LOG` takes precedence.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init()
        .ok();
}

pub fn get_library_info() -> LibraryInfo {
    LibraryInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl std::fmt::Display for LibraryInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{} - {}", self.name, self.version, self.description)
    }
}

/// Trim `buffer` and encode the retained samples into an in-memory WAV file.
pub fn trim_to_wav(buffer: &SampleBuffer, threshold: f32, policy: QuantizePolicy) -> Result<Vec<u8>> {
    let result = trim(buffer, threshold)?;
    Pcm16Encoder::new(policy).encode_to_vec(&result.buffer)
}
