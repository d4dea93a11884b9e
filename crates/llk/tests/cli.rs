//! End-to-end tests of the `llk` binary.
#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const GRAMMAR: &str = r#"{
    "rules": [
        {"id": "Pair", "type": "CONCATENATION", "members": ["Key", "Colon", "Value"]},
        {"id": "Key", "type": "TERMINAL", "token": "T_NAME"},
        {"id": "Colon", "type": "TERMINAL", "token": "T_COLON", "kept": false},
        {"id": "Value", "type": "TERMINAL", "token": "T_NUMBER"}
    ]
}"#;

fn write_inputs(tokens: &str) -> (TempDir, String, String) {
    let dir = TempDir::new().unwrap();
    let grammar = dir.path().join("grammar.json");
    let input = dir.path().join("tokens.json");
    fs::write(&grammar, GRAMMAR).unwrap();
    fs::write(&input, tokens).unwrap();
    (
        dir,
        grammar.to_string_lossy().into_owned(),
        input.to_string_lossy().into_owned(),
    )
}

const PAIR: &str = r#"[
    {"name": "T_NAME", "value": "answer", "offset": 0},
    {"name": "T_COLON", "value": ":", "offset": 6},
    {"name": "T_NUMBER", "value": "42", "offset": 8}
]"#;

#[test]
fn test_prints_tree() {
    let (_dir, grammar, tokens) = write_inputs(PAIR);

    Command::cargo_bin("llk")
        .unwrap()
        .args([&grammar, &tokens])
        .assert()
        .success()
        .stdout(predicate::str::contains(">  Pair"))
        .stdout(predicate::str::contains(">  >  token(T_NAME, answer)"))
        .stdout(predicate::str::contains(":").not());
}

#[test]
fn test_prints_trace() {
    let (_dir, grammar, tokens) = write_inputs(PAIR);

    Command::cargo_bin("llk")
        .unwrap()
        .args(["--trace", &grammar, &tokens])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("entry Pair(0) @0"))
        .stdout(predicate::str::contains(r#"token ":" (T_COLON) @6 skipped"#))
        .stdout(predicate::str::contains("exit Pair(0) @10"));
}

#[test]
fn test_reports_syntax_error() {
    let (_dir, grammar, tokens) = write_inputs(
        r#"[
            {"name": "T_NAME", "value": "answer", "offset": 0},
            {"name": "T_NUMBER", "value": "42", "offset": 7}
        ]"#,
    );

    Command::cargo_bin("llk")
        .unwrap()
        .args([&grammar, &tokens])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected token"))
        .stderr(predicate::str::contains("offset 7"));
}

#[test]
fn test_reports_missing_file() {
    let (_dir, grammar, _tokens) = write_inputs(PAIR);

    Command::cargo_bin("llk")
        .unwrap()
        .args([grammar.as_str(), "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read does-not-exist.json"));
}
