use std::{
    fs,
    path::PathBuf,
    process::{Command, Output},
};

const SCHEMA: &str = r#"{
    "name": "Copy",
    "arguments": {
        "dest": {},
        "jobs": {"flags": ["-j", "--jobs"], "type": "int", "default": 1}
    }
}"#;

fn schema_file(tag: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("declargs-cli-{}-{}.json", tag, std::process::id()));
    fs::write(&path, SCHEMA).unwrap();
    path
}

fn run(tag: &str, args: &[&str]) -> Output {
    let path = schema_file(tag);
    let output = Command::new(env!("CARGO_BIN_EXE_declargs"))
        .arg(&path)
        .args(args)
        .output()
        .unwrap();
    fs::remove_file(&path).unwrap();
    output
}

#[test]
fn prints_the_parsed_record() {
    let output = run("record", &["--", "out", "-j", "4"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Copy(dest=\"out\", jobs=4)\n");

    let output = run("json", &["--json", "--", "out"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json, serde_json::json!({"dest": "out", "jobs": 1}));
}

#[test]
fn parse_errors_exit_with_usage() {
    let output = run("bogus", &["--", "out", "--bogus"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unexpected argument '--bogus'"), "{}", stderr);
    assert!(stderr.contains("Usage:"), "{}", stderr);
}

#[test]
fn schema_errors_exit_with_one() {
    let output = Command::new(env!("CARGO_BIN_EXE_declargs"))
        .arg(std::env::temp_dir().join("declargs-cli-missing.json"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}
