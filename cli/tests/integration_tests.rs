use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path =
            std::env::temp_dir().join(format!("argschema_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Schema document covering options, positionals and defaults.
fn write_schema(dir: &TempDir) -> PathBuf {
    let yaml = r#"version: "2"
options:
  verbose: { type: boolean, default: false }
  name: { type: string }
  times: { type: number, int: true, positive: true, default: 1 }
positionals:
  type: array
  element: { type: string }
"#;
    let path = dir.join("schema.yml");
    fs::write(&path, yaml).expect("failed to write schema");
    path
}

fn argschema(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_argschema"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run argschema")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn test_parse_prints_json_result() {
    let dir = TempDir::new("parse_json");
    let schema = write_schema(&dir);

    let output = argschema(&[
        "parse",
        "--schema",
        schema.to_str().unwrap(),
        "--",
        "--name=demo",
        "--verbose",
        "input.txt",
        "--",
        "--raw",
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        stdout_json(&output),
        serde_json::json!({
            "options": {"name": "demo", "times": 1, "verbose": true},
            "positionals": ["input.txt"],
            "--": ["--raw"],
        })
    );
}

#[test]
fn test_parse_compact_output_is_single_line() {
    let dir = TempDir::new("parse_compact");
    let schema = write_schema(&dir);

    let output = argschema(&[
        "parse",
        "--schema",
        schema.to_str().unwrap(),
        "--compact",
        "--",
        "--name",
        "x",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end().lines().count(), 1);
}

#[test]
fn test_parse_yaml_output() {
    let dir = TempDir::new("parse_yaml");
    let schema = write_schema(&dir);

    let output = argschema(&[
        "parse",
        "--schema",
        schema.to_str().unwrap(),
        "--format",
        "yaml",
        "--",
        "--name",
        "x",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: x"));
}

#[test]
fn test_validation_failure_exits_with_user_error() {
    let dir = TempDir::new("parse_invalid");
    let schema = write_schema(&dir);

    let output = argschema(&[
        "parse",
        "--schema",
        schema.to_str().unwrap(),
        "--",
        "--name",
        "x",
        "--times",
        "0",
        "--unknown",
    ]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Validation error"), "stderr: {stderr}");
    assert!(stderr.contains("'unknown'"), "stderr: {stderr}");
    assert!(stderr.contains("options.times"), "stderr: {stderr}");
}

#[test]
fn test_decode_failure_exits_with_user_error() {
    let dir = TempDir::new("parse_decode");
    let schema = write_schema(&dir);

    let output = argschema(&["parse", "--schema", schema.to_str().unwrap(), "--", "--times"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("option '--times': missing value"), "stderr: {stderr}");
}

#[test]
fn test_missing_schema_file_exits_with_failure() {
    let dir = TempDir::new("parse_missing");

    let output = argschema(&[
        "parse",
        "--schema",
        dir.join("nope.yml").to_str().unwrap(),
        "--",
        "x",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load schema"), "stderr: {stderr}");
}

#[test]
fn test_check_accepts_valid_documents() {
    let dir = TempDir::new("check_ok");
    let current = write_schema(&dir);
    let legacy = dir.join("legacy.yml");
    fs::write(
        &legacy,
        "version: 1\noptions:\n  enable: { kind: Optional, inner: { kind: Boolean } }\n",
    )
    .unwrap();

    let output = argschema(&[
        "check",
        "--schema",
        current.to_str().unwrap(),
        "--schema",
        legacy.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Checked 2 schema document(s)."));
}

#[test]
fn test_check_rejects_unsupported_type() {
    let dir = TempDir::new("check_bad");
    let path = dir.join("bad.yml");
    fs::write(&path, "version: \"2\"\noptions:\n  when: { type: date }\n").unwrap();

    let output = argschema(&["check", "--schema", path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("date"), "stderr: {stderr}");
}

#[test]
fn test_verbose_logs_to_stderr_only() {
    let dir = TempDir::new("parse_verbose");
    let schema = write_schema(&dir);

    let output = argschema(&[
        "--verbose",
        "parse",
        "--schema",
        schema.to_str().unwrap(),
        "--",
        "--name",
        "x",
    ]);

    assert!(output.status.success());
    // stdout stays machine-readable.
    let _ = stdout_json(&output);
    assert!(!output.stderr.is_empty());
}
