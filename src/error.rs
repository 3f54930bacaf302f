//! Error Types

use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum AudioTrimError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding overflow: sample {index} ({value}) is outside the 16-bit range")]
    EncodingOverflow { index: usize, value: f32 },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Playback error: {0}")]
    Playback(String),
}

impl AudioTrimError {
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self { Self::InvalidParameter(msg.into()) }
    pub fn decode<S: Into<String>>(msg: S) -> Self { Self::Decode(msg.into()) }
    pub fn config<S: Into<String>>(msg: S) -> Self { Self::Config(msg.into()) }
    pub fn playback<S: Into<String>>(msg: S) -> Self { Self::Playback(msg.into()) }
}

pub type Result<T> = std::result::Result<T, AudioTrimError>;

impl From<hound::Error> for AudioTrimError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => Self::Io(e),
            other => Self::decode(format!("WAV: {}", other)),
        }
    }
}
