//! One-shot recording through the binary, using the synthetic source

use assert_cmd::Command;
use predicates::prelude::*;

fn voice2notion_bin(home: &tempfile::TempDir) -> Command {
    let mut command = Command::cargo_bin("voice2notion").unwrap();
    command
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("VOICE2NOTION_OUTPUT_DIR")
        .env_remove("VOICE2NOTION_LOG");
    command
}

#[test]
fn records_flac_and_prints_path() {
    let home = tempfile::tempdir().unwrap();
    let out = home.path().join("notes");

    voice2notion_bin(&home)
        .args(["--source", "synthetic", "--duration", "1s", "--output-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("recording.flac"));

    let bytes = std::fs::read(out.join("recording.flac")).unwrap();
    assert_eq!(&bytes[..4], b"fLaC");
}

#[test]
fn records_wav_at_standard_quality() {
    let home = tempfile::tempdir().unwrap();

    voice2notion_bin(&home)
        .args(["-s", "synthetic", "-d", "1s", "-c", "wav", "-q", "standard", "-o"])
        .arg(home.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("recording.wav"));

    let reader = hound::WavReader::open(home.path().join("recording.wav")).unwrap();
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().sample_rate, 12_000);
    assert_eq!(reader.spec().bits_per_sample, 8);
    assert!(reader.len() >= 12_000);
}

#[test]
fn output_dir_from_environment() {
    let home = tempfile::tempdir().unwrap();
    let out = home.path().join("from-env");

    voice2notion_bin(&home)
        .env("VOICE2NOTION_OUTPUT_DIR", &out)
        .args(["-s", "synthetic", "-d", "1s"])
        .assert()
        .success();

    assert!(out.join("recording.flac").is_file());
}

#[test]
fn config_file_selects_codec() {
    let home = tempfile::tempdir().unwrap();

    voice2notion_bin(&home)
        .args(["config", "set", "codec", "wav"])
        .assert()
        .success();

    voice2notion_bin(&home)
        .args(["-s", "synthetic", "-d", "1s", "-o"])
        .arg(home.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("recording.wav"));
}
