#![cfg(all(unix, feature = "cli"))]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/tccli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn tellcore(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tellcore"))
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("tellcore should run")
}

fn spawn_echo(sock_path: &Path) -> Child {
    let child = Command::new(env!("CARGO_BIN_EXE_tellcore"))
        .args(["--log-level", "error", "echo"])
        .arg(sock_path)
        .arg("--once")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("echo command should start");

    let start = Instant::now();
    while !sock_path.exists() {
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "echo service did not bind in time"
        );
        thread::sleep(Duration::from_millis(20));
    }
    child
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

#[test]
fn encode_prints_wire_form() {
    let output = tellcore(&["--format", "raw", "encode", "i:1", "abc", "i:-7"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"i1ss3:abci-7s");

    let output = tellcore(&["--format", "json", "encode", "s:12", "i:0"]);
    let json = stdout_json(&output);
    assert_eq!(json["wire"], "s2:12i0s");
    assert_eq!(json["tokens"], 2);
    assert_eq!(json["bytes"], 8);
}

#[test]
fn decode_prints_tokens_in_order() {
    let output = tellcore(&["--format", "json", "decode", "--data", "i1ss3:abci-7s"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    let tokens = json["tokens"].as_array().expect("tokens array");
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0]["type"], "integer");
    assert_eq!(tokens[0]["value"], 1);
    assert_eq!(tokens[1]["type"], "text");
    assert_eq!(tokens[1]["value"], "abc");
    assert_eq!(tokens[2]["value"], -7);
}

#[test]
fn decode_empty_input_yields_no_tokens() {
    let output = tellcore(&["--format", "json", "decode", "--data", ""]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["tokens"], serde_json::json!([]));
}

#[test]
fn decode_malformed_input_is_data_invalid() {
    let output = tellcore(&["--format", "json", "decode", "--data", "s9:short"]);
    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("decode failed"), "stderr: {stderr}");
}

#[test]
fn call_through_echo_service() {
    let dir = unique_temp_dir("call");
    let sock_path = dir.join("echo.sock");
    let mut child = spawn_echo(&sock_path);

    let sock = sock_path.to_str().expect("utf-8 path");
    let output = tellcore(&[
        "--format",
        "json",
        "call",
        "tdGetName",
        "i:42",
        "--expect",
        "text,int",
        "--socket",
        sock,
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json = stdout_json(&output);
    assert_eq!(json["tokens"][0]["value"], "tdGetName");
    assert_eq!(json["tokens"][1]["value"], 42);

    let status = child.wait().expect("echo should exit after one client");
    assert!(status.success());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn call_with_wrong_expectation_is_data_invalid() {
    let dir = unique_temp_dir("mismatch");
    let sock_path = dir.join("echo.sock");
    let mut child = spawn_echo(&sock_path);

    let sock = sock_path.to_str().expect("utf-8 path");
    let output = tellcore(&["call", "tdTurnOn", "i:1", "--expect", "int", "--socket", sock]);
    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("protocol mismatch"), "stderr: {stderr}");

    let _ = child.wait();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn call_without_service_is_transport_error() {
    let dir = unique_temp_dir("absent");
    let sock = dir.join("nobody.sock");
    let output = tellcore(&[
        "call",
        "tdGetNumberOfDevices",
        "--expect",
        "int",
        "--socket",
        sock.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(3));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_prints_name() {
    let output = tellcore(&["version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("tellcore "));
}
