//! audiotrim - Silence Trimmer CLI

use anyhow::{bail, Context};
use clap::Parser;
use std::path::Path;
use std::process;
use audiotrim::audio::{PreviewSink, WavHeader, HEADER_SIZE};
use audiotrim::processing::{clean_trimmed, trimmed_path, BatchProcessor, Outcome};
use audiotrim::{init_logging, Args, Command, Config, TrimProcessor};

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    if let Command::InitConfig { path } = &args.command {
        Config::create_default_config(path)
            .with_context(|| format!("Cannot create {}", path.display()))?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = Config::from_args(&args)?;
    if config.verbose() {
        println!("{}", audiotrim::get_library_info());
        println!("Threshold: {}  Policy: {}", config.threshold(), config.policy().name());
        println!();
    }

    match &args.command {
        Command::Trim { input, output, in_place } => {
            let processor = TrimProcessor::new(&config)?;
            let report = match (output, *in_place) {
                (_, true) => processor.process_in_place(input),
                (Some(output), false) => processor.process_file(input, output),
                (None, false) => processor.process(input),
            }
            .with_context(|| format!("Failed to trim {}", input.display()))?;

            println!("{}", report);
            if config.verbose() && report.outcome == Outcome::Written {
                if let Some((first, last)) = report.range {
                    println!("Kept samples {}..={} of {}", first, last, report.original_samples);
                }
                println!("Time: {:.2}ms", report.processing_time.as_secs_f64() * 1000.0);
            }
        }
        Command::Batch { dir, recursive } => {
            let batch = BatchProcessor::new(&config)?;
            let summary = batch.process_dir(dir, *recursive)
                .with_context(|| format!("Cannot scan {}", dir.display()))?;

            for report in &summary.reports {
                println!("{}", report);
            }
            for (path, e) in &summary.failures {
                eprintln!("Failed: {}: {}", path.display(), e);
            }
            println!(
                "=== {} written, {} skipped, {} failed in {:.2}s ===",
                summary.written(), summary.skipped(), summary.failed(), summary.processing_time_secs
            );
            if !summary.is_success() {
                bail!("{} file(s) failed", summary.failed());
            }
        }
        Command::Clean { dir, recursive } => {
            let removed = clean_trimmed(dir, config.suffix(), *recursive)
                .with_context(|| format!("Cannot clean {}", dir.display()))?;
            for path in &removed {
                println!("Removed {}", path.display());
            }
            println!("Removed {} file(s)", removed.len());
        }
        Command::Inspect { file } => inspect(file, config.suffix())?,
        Command::Preview { file, trimmed } => {
            let mut sink = preview_sink()?;
            let played = TrimProcessor::new(&config)?.preview(file, *trimmed, sink.as_mut())?;
            println!("Played {} ({:.2}s)", file.display(), played.duration_secs());
        }
        Command::InitConfig { .. } => unreachable!("handled above"),
    }

    Ok(())
}

fn inspect(file: &Path, suffix: &str) -> anyhow::Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Cannot read {}", file.display()))?;
    let header = WavHeader::parse(&bytes)?;
    let payload = bytes.len().saturating_sub(HEADER_SIZE);

    println!("=== {} ===", file.display());
    println!("Channels: {}", header.channels);
    println!("Sample rate: {} Hz", header.sample_rate);
    println!("Byte rate: {}", header.byte_rate());
    println!("Block align: {}", header.block_align());
    println!("Samples: {} ({} frames)", header.sample_count(), header.frame_count());
    println!("Duration: {:.3}s", header.duration_secs());
    println!("Data size: {} bytes (payload on disk: {})", header.data_size, payload);

    let sibling = trimmed_path(file, suffix);
    if sibling.exists() {
        println!("Trimmed copy: {}", sibling.display());
    }
    if payload != header.data_size as usize {
        bail!("Declared data size {} does not match payload {}", header.data_size, payload);
    }
    Ok(())
}

#[cfg(feature = "playback")]
fn preview_sink() -> anyhow::Result<Box<dyn PreviewSink>> {
    Ok(Box::new(audiotrim::audio::CpalPreview::new()?))
}

#[cfg(not(feature = "playback"))]
fn preview_sink() -> anyhow::Result<Box<dyn PreviewSink>> {
    Err(audiotrim::AudioTrimError::playback("Built without the `playback` feature").into())
}
