//! Drives the built `fnshim` binary the way a host would: bytes on
//! stdin, one document expected on stdout, diagnostics on stderr.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::{Value, json};

fn fnshim(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_fnshim"))
        .args(args)
        .env_remove("FNSHIM_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn fnshim");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin)
        .expect("failed to write stdin");

    child.wait_with_output().expect("failed to wait for fnshim")
}

fn response(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout must hold one JSON document")
}

// ── run ─────────────────────────────────────────────────────────────

#[test]
fn echo_round_trip() {
    let out = fnshim(&["run"], br#"{"body":"ping","method":"GET"}"#);
    assert!(out.status.success());
    assert_eq!(
        response(&out),
        json!({"status": 200, "headers": {"Content-Type": "application/json"}, "body": "ping"})
    );
}

#[test]
fn empty_stdin() {
    let out = fnshim(&["run", "--handler", "echo"], b"");
    assert!(out.status.success());
    assert_eq!(response(&out)["body"], "");
}

#[test]
fn inspect_shows_normalized_request() {
    let out = fnshim(&["run", "--handler", "inspect"], b"not json{{{");
    let body: Value = serde_json::from_str(response(&out)["body"].as_str().unwrap()).unwrap();
    assert_eq!(
        body,
        json!({"body": "not json{{{", "headers": {}, "method": "POST", "uri": "/"})
    );
}

#[test]
fn failing_handler_still_exits_zero_with_500() {
    let out = fnshim(&["run", "--handler", "fail"], b"");
    assert!(out.status.success());
    let resp = response(&out);
    assert_eq!(resp["status"], 500);
    let body: Value = serde_json::from_str(resp["body"].as_str().unwrap()).unwrap();
    assert_eq!(body["error"], "simulated failure for POST /");
}

#[test]
fn panicking_handler_yields_500() {
    let out = fnshim(&["run", "--handler", "panic"], b"");
    assert!(out.status.success());
    assert_eq!(response(&out)["status"], 500);
}

#[test]
fn uncaught_panic_still_writes_one_500() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "catch_panics = false").unwrap();
    let path = file.path().to_str().unwrap();

    let out = fnshim(&["--config", path, "run", "--handler", "panic"], b"");
    assert!(!out.status.success());
    let resp = response(&out);
    assert_eq!(resp["status"], 500);
    let body: Value = serde_json::from_str(resp["body"].as_str().unwrap()).unwrap();
    assert_eq!(body["error"], "simulated panic");
    assert!(body["stack"].as_str().unwrap().starts_with("panic at "));
}

#[test]
fn caught_panic_is_written_once() {
    let out = fnshim(&["run", "--handler", "panic"], b"");
    let resp = response(&out);
    let body: Value = serde_json::from_str(resp["body"].as_str().unwrap()).unwrap();
    assert!(body["stack"].as_str().unwrap().starts_with("panic in handler"));
}

#[test]
fn diagnostics_stay_off_stdout() {
    let out = fnshim(&["run", "--handler", "fail"], b"");
    assert!(String::from_utf8_lossy(&out.stderr).contains("handler failed"));
    assert_eq!(response(&out)["status"], 500);
}

#[test]
fn runtime_header_flag() {
    let out = fnshim(&["run", "--runtime-header", "fnshim-rust"], b"x");
    assert_eq!(response(&out)["headers"]["X-Runtime"], "fnshim-rust");
}

// ── config ──────────────────────────────────────────────────────────

#[test]
fn config_file_applies() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "default_method = \"GET\"\nruntime_header = \"from-file\"").unwrap();
    let path = file.path().to_str().unwrap();

    let out = fnshim(&["--config", path, "run", "--handler", "inspect"], b"plain");
    let resp = response(&out);
    assert_eq!(resp["headers"]["X-Runtime"], "from-file");
    let body: Value = serde_json::from_str(resp["body"].as_str().unwrap()).unwrap();
    assert_eq!(body["method"], "GET");
}

#[test]
fn config_command_prints_toml() {
    let out = fnshim(&["config"], b"");
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.contains("chunk_size = 65536"));
    assert!(text.contains("default_method = \"POST\""));
}

#[test]
fn missing_config_file_fails() {
    let out = fnshim(&["--config", "/nonexistent/fnshim.toml", "run"], b"");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("loading adapter config"));
}
