use assert_cmd::Command;
use audiotrim::{Pcm16Encoder, SampleBuffer};
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn audiotrim() -> Command {
    Command::cargo_bin("audiotrim").unwrap()
}

fn write_clip(path: &Path, samples: Vec<f32>) {
    let buffer = SampleBuffer::mono(samples, 16000).unwrap();
    Pcm16Encoder::default().write_file(&buffer, path).unwrap();
}

#[test]
fn test_trim_command_writes_sibling() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("step.wav");
    write_clip(&input, vec![0.0, 0.0, 0.4, 0.2, 0.0]);

    audiotrim()
        .args(["trim", input.to_str().unwrap(), "--threshold", "0.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("step_trimmed.wav"))
        .stdout(predicate::str::contains("trimmed 60.00%"));

    assert!(temp_dir.path().join("step_trimmed.wav").exists());
}

#[test]
fn test_trim_command_explicit_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in.wav");
    let output = temp_dir.path().join("out/cut.wav");
    write_clip(&input, vec![0.0, 0.8, 0.0]);

    audiotrim()
        .args(["trim", input.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .assert()
        .success();

    assert_eq!(std::fs::metadata(&output).unwrap().len(), 46);
}

#[test]
fn test_invalid_threshold_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in.wav");
    write_clip(&input, vec![0.5]);

    audiotrim()
        .args(["trim", input.to_str().unwrap(), "-t", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Threshold"));
}

#[test]
fn test_missing_input_fails() {
    audiotrim()
        .args(["trim", "/nonexistent/input.wav"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_inspect_prints_header() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("tone.wav");
    write_clip(&input, vec![0.1, 0.2, 0.3, 0.4]);

    audiotrim()
        .args(["inspect", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sample rate: 16000 Hz"))
        .stdout(predicate::str::contains("Samples: 4"));
}

#[cfg(not(feature = "playback"))]
#[test]
fn test_preview_without_playback_feature_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("cue.wav");
    write_clip(&input, vec![0.0, 0.5, 0.0]);

    audiotrim()
        .args(["preview", input.to_str().unwrap(), "--trimmed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("playback"));
}

#[test]
fn test_batch_and_clean() {
    let temp_dir = TempDir::new().unwrap();
    write_clip(&temp_dir.path().join("a.wav"), vec![0.0, 0.5]);
    write_clip(&temp_dir.path().join("b.wav"), vec![0.5, 0.0]);
    let dir = temp_dir.path().to_str().unwrap();

    audiotrim()
        .args(["batch", dir, "-j", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 written, 0 skipped, 0 failed"));

    audiotrim()
        .args(["clean", dir])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 file(s)"));

    assert!(temp_dir.path().join("a.wav").exists());
    assert!(!temp_dir.path().join("a_trimmed.wav").exists());
}

#[test]
fn test_init_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("audiotrim.toml");

    audiotrim()
        .args(["init-config", config.to_str().unwrap()])
        .assert()
        .success();

    let loaded = audiotrim::Config::from_file(&config).unwrap();
    assert_eq!(loaded.threshold(), 0.1);
}
