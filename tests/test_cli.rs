//! End-to-end tests for the gemini-bridge binary
//!
//! Exercises the compiled binary the way an MCP client launches it: via
//! stdio, with the external command pointed at fixtures.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fake_cli(dir: &TempDir, call_body: &str) -> PathBuf {
    let path = dir.path().join("gemini");
    let script = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = \"--version\" ]; then echo '0.1.0'; exit 0; fi\n\
         {call_body}\n"
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn unreachable_command_is_fatal_at_startup() {
    Command::cargo_bin("gemini-bridge")
        .unwrap()
        .env("GEMINI_BRIDGE_COMMAND", "/definitely/not/installed/gemini")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not usable"));
}

#[test]
fn full_session_over_stdio() {
    let dir = TempDir::new().unwrap();
    let cli = fake_cli(
        &dir,
        "echo 'Loaded config'\n\
         echo '{\"response\":\"e2e ok\",\"session_id\":\"sess-e2e\"}'",
    );

    let input = "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\",\"params\":{}}\n\
        {\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n\
        {\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/call\",\
        \"params\":{\"name\":\"gemini\",\"arguments\":{\"prompt\":\"hi\"}}}\n";

    let assert = Command::cargo_bin("gemini-bridge")
        .unwrap()
        .env("GEMINI_BRIDGE_COMMAND", &cli)
        .arg("--quiet")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"protocolVersion\":\"2024-11-05\""))
        .stdout(predicate::str::contains("\"threadId\":\"sess-e2e\""))
        .stdout(predicate::str::contains("e2e ok"));

    // every stdout line must be a JSON-RPC envelope, nothing else
    let output = assert.get_output();
    for line in String::from_utf8_lossy(&output.stdout).lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
    }
}

#[test]
fn noise_and_unknown_methods_do_not_stop_the_session() {
    let dir = TempDir::new().unwrap();
    let cli = fake_cli(&dir, "echo '{\"response\":\"x\",\"session_id\":\"y\"}'");

    let input = "garbage line\n\
        {\"jsonrpc\":\"2.0\",\"id\":5,\"method\":\"foo\"}\n\
        {\"jsonrpc\":\"2.0\",\"id\":6,\"method\":\"tools/list\"}\n";

    let assert = Command::cargo_bin("gemini-bridge")
        .unwrap()
        .env("GEMINI_BRIDGE_COMMAND", &cli)
        .arg("--quiet")
        .write_stdin(input)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["id"], 5);
    assert_eq!(lines[0]["error"]["code"], -32601);
    assert_eq!(lines[1]["id"], 6);
    assert_eq!(lines[1]["result"]["tools"].as_array().unwrap().len(), 2);
}
