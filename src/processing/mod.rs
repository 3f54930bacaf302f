//! Trimming Pipeline

pub mod trimmer;
pub mod processor;
pub mod batch;

pub use trimmer::{trim, validate_threshold, TrimResult, Trimmer};
pub use processor::{is_trimmed_output, trimmed_path, Outcome, TrimProcessor, TrimReport};
pub use batch::{clean_trimmed, find_wav_files, BatchProcessor, BatchSummary};
