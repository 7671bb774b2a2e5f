//! Error scenario integration tests

use std::process::Command;

use tempfile::TempDir;

/// Binary with HOME and config dirs pointed at a scratch directory
fn voice2notion_bin(home: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_voice2notion"));
    command
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("XDG_RUNTIME_DIR", home.path())
        .env_remove("VOICE2NOTION_OUTPUT_DIR")
        .env_remove("VOICE2NOTION_LOG");
    command
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn config_get_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    let output = voice2notion_bin(&home)
        .args(["config", "get", "unknown_key"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("Valid keys"), "got: {}", stderr);
}

#[test]
fn config_set_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    let output = voice2notion_bin(&home)
        .args(["config", "set", "api_key", "value"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("Unknown key"), "got: {}", stderr);
}

#[test]
fn config_set_invalid_duration() {
    let home = tempfile::tempdir().unwrap();
    let output = voice2notion_bin(&home)
        .args(["config", "set", "duration", "invalid"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("duration"), "got: {}", stderr);
}

#[test]
fn config_set_invalid_codec() {
    let home = tempfile::tempdir().unwrap();
    let output = voice2notion_bin(&home)
        .args(["config", "set", "codec", "aac"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("flac"), "got: {}", stderr);
}

#[test]
fn config_set_invalid_boolean() {
    let home = tempfile::tempdir().unwrap();
    let output = voice2notion_bin(&home)
        .args(["config", "set", "notify", "maybe"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(
        stderr.contains("true") && stderr.contains("false"),
        "Expected error about invalid boolean, got: {}",
        stderr
    );
}

#[test]
fn config_list_with_no_file() {
    let home = tempfile::tempdir().unwrap();
    let output = voice2notion_bin(&home)
        .args(["config", "list"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("output_dir"), "got: {}", stdout);
    assert!(stdout.contains("not set"), "got: {}", stdout);
}

#[test]
fn config_set_then_get() {
    let home = tempfile::tempdir().unwrap();
    let set = voice2notion_bin(&home)
        .args(["config", "set", "quality", "standard"])
        .output()
        .expect("Failed to execute command");
    assert!(set.status.success(), "stderr: {}", stderr_of(&set));

    let get = voice2notion_bin(&home)
        .args(["config", "get", "quality"])
        .output()
        .expect("Failed to execute command");
    assert!(get.status.success());
    assert_eq!(String::from_utf8_lossy(&get.stdout).trim(), "standard");
}

#[test]
fn config_init_twice_fails() {
    let home = tempfile::tempdir().unwrap();
    let first = voice2notion_bin(&home)
        .args(["config", "init"])
        .output()
        .expect("Failed to execute command");
    assert!(first.status.success(), "stderr: {}", stderr_of(&first));

    let second = voice2notion_bin(&home)
        .args(["config", "init"])
        .output()
        .expect("Failed to execute command");
    assert!(!second.status.success());
}

#[test]
fn daemon_command_without_daemon() {
    let home = tempfile::tempdir().unwrap();
    let output = voice2notion_bin(&home)
        .args(["daemon", "status"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("No daemon running"), "got: {}", stderr);
}

#[test]
fn unreadable_output_dir_fails_start() {
    let home = tempfile::tempdir().unwrap();
    // A regular file where the output directory should be
    let blocker = home.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let output = voice2notion_bin(&home)
        .args(["--source", "synthetic", "-d", "1s", "-o"])
        .arg(&blocker)
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("Failed to start recording"), "got: {}", stderr);
    assert_eq!(std::fs::read(&blocker).unwrap(), b"not a directory");
}
