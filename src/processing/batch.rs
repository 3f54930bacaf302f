//! Directory-wide trimming and cleanup

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use rayon::prelude::*;

use crate::config::Config;
use crate::error::{AudioTrimError, Result};
use crate::processing::processor::{is_trimmed_output, Outcome, TrimProcessor, TrimReport};

fn is_wav(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

fn collect_wav_files(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect_wav_files(&path, recursive, files)?;
            }
        } else if is_wav(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Sorted `.wav` files under `dir`, excluding earlier trimmed output.
pub fn find_wav_files(dir: &Path, recursive: bool, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_wav_files(dir, recursive, &mut files)?;
    files.retain(|p| !is_trimmed_output(p, suffix));
    files.sort();
    Ok(files)
}

/// Delete files written by an earlier trim run. Returns the removed paths.
pub fn clean_trimmed(dir: &Path, suffix: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_wav_files(dir, recursive, &mut files)?;
    files.retain(|p| is_trimmed_output(p, suffix));
    files.sort();

    for path in &files {
        fs::remove_file(path)?;
        log::debug!("Removed {}", path.display());
    }
    log::info!("Removed {} trimmed files from {}", files.len(), dir.display());
    Ok(files)
}

#[derive(Debug)]
pub struct BatchSummary {
    pub reports: Vec<TrimReport>,
    pub failures: Vec<(PathBuf, AudioTrimError)>,
    pub processing_time_secs: f64,
}

impl BatchSummary {
    pub fn written(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome == Outcome::Written).count()
    }

    pub fn skipped(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome == Outcome::Skipped).count()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct BatchProcessor {
    processor: TrimProcessor,
    pool: rayon::ThreadPool,
}

impl BatchProcessor {
    pub fn new(config: &Config) -> Result<Self> {
        let processor = TrimProcessor::new(config)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs())
            .build()
            .map_err(|e| AudioTrimError::config(format!("Cannot build thread pool: {}", e)))?;
        Ok(Self { processor, pool })
    }

    /// Trim each file into its `<stem><suffix>` sibling in parallel.
    ///
    /// A failing file is recorded in the summary and does not stop the rest.
    pub fn process_files(&self, files: &[PathBuf]) -> BatchSummary {
        let start = Instant::now();

        let results: Vec<(PathBuf, Result<TrimReport>)> = self.pool.install(|| {
            files.par_iter()
                .map(|path| (path.clone(), self.processor.process(path)))
                .collect()
        });

        let mut reports = Vec::new();
        let mut failures = Vec::new();
        for (path, result) in results {
            match result {
                Ok(report) => reports.push(report),
                Err(e) => {
                    log::warn!("Failed to trim {}: {}", path.display(), e);
                    failures.push((path, e));
                }
            }
        }

        BatchSummary {
            reports,
            failures,
            processing_time_secs: start.elapsed().as_secs_f64(),
        }
    }

    pub fn process_dir(&self, dir: &Path, recursive: bool) -> Result<BatchSummary> {
        let files = find_wav_files(dir, recursive, self.processor.suffix())?;
        log::info!("Found {} WAV files in {}", files.len(), dir.display());
        Ok(self.process_files(&files))
    }
}
