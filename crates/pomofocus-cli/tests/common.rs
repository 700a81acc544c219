#![allow(dead_code)]
use assert_cmd::{cargo_bin_cmd, Command};
use tempfile::TempDir;

/// A `pomofocus` command whose data directory is `home`.
pub fn pomofocus(home: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("pomofocus");
    cmd.env("POMOFOCUS_HOME", home.path())
        .env_remove("POMOFOCUS_LOG")
        .env_remove("POMOFOCUS_ENV");
    cmd
}

/// Run `args` and parse stdout as a single JSON document.
pub fn json_output(home: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = pomofocus(home).args(args).output().expect("failed to run pomofocus");
    assert!(
        output.status.success(),
        "pomofocus {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

/// Run `args` and parse stdout as one JSON object per line.
pub fn json_lines(home: &TempDir, args: &[&str]) -> Vec<serde_json::Value> {
    let output = pomofocus(home).args(args).output().expect("failed to run pomofocus");
    assert!(
        output.status.success(),
        "pomofocus {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("line is not JSON"))
        .collect()
}

pub fn add_task(home: &TempDir, name: &str) -> String {
    let task = json_output(home, &["task", "add", name]);
    task["id"].as_str().expect("task id").to_string()
}
