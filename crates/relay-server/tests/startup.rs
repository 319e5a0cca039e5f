use std::process::{Command, Output};

use tempfile::tempdir;

/// Runs the server binary in an empty directory with only `vars` set.
fn run_server(vars: &[(&str, &str)]) -> Output {
    let dir = tempdir().unwrap();
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_relay-server"));
    cmd.current_dir(dir.path()).env_clear().env("NO_COLOR", "1");
    for (key, value) in vars {
        cmd.env(key, value);
    }
    cmd.output().unwrap()
}

#[test]
fn test_missing_api_key_exits_with_diagnostic_on_stderr() {
    let output = run_server(&[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stderr.contains("Missing ANTHROPIC_API_KEY"), "stderr: {stderr}");
    assert!(!stdout.contains("Missing ANTHROPIC_API_KEY"), "stdout: {stdout}");
}

#[test]
fn test_invalid_port_exits_before_binding() {
    let output = run_server(&[("ANTHROPIC_API_KEY", "sk-test"), ("PORT", "not-a-port")]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid PORT='not-a-port'"), "stderr: {stderr}");
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Server running"));
}
