//! # CLI Tests
//!
//! Runs the `typegraph` binary on program dumps written from the fixtures.

use std::io::Write;
use std::process::{Command, Output};

use tempfile::NamedTempFile;
use typegraph_test_utils::FixtureFrontend;

fn graph_dump() -> NamedTempFile {
    let program = FixtureFrontend::new()
        .with_fixture_dir("graph", "example.com/graph")
        .program();
    let mut file = NamedTempFile::new().expect("Failed to create dump file");
    serde_json::to_writer(&mut file, &program).expect("Failed to write dump");
    file
}

fn typegraph(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_typegraph"))
        .args(args)
        .output()
        .expect("Failed to run typegraph")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "typegraph failed with error: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_prints_module_summaries() {
    let dump = graph_dump();
    let output = typegraph(&["--input", dump.path().to_str().unwrap()]);

    let lines: Vec<_> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(
        lines,
        vec![
            "example.com/graph/a (a): 1 records, 0 interfaces, 0 functions, 0 aliases, 0 declarations",
            "example.com/graph/b (b): 1 records, 0 interfaces, 0 functions, 0 aliases, 0 declarations",
        ]
    );
}

#[test]
fn test_json_summary_follows_imports() {
    let dump = graph_dump();
    let output = typegraph(&[
        "--input",
        dump.path().to_str().unwrap(),
        "--module",
        "example.com/graph/b",
        "--json",
    ]);

    let summaries: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let paths: Vec<_> = summaries
        .as_array()
        .unwrap()
        .iter()
        .map(|summary| summary["path"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(paths, vec!["example.com/graph/a", "example.com/graph/b"]);
    assert_eq!(summaries[1]["identifier"], "b");
    assert_eq!(summaries[1]["records"], 1);
}

#[test]
fn test_type_of_describes_the_type() {
    let dump = graph_dump();
    let output = typegraph(&[
        "--input",
        dump.path().to_str().unwrap(),
        "--type-of",
        "*a.Node",
    ]);

    let text = stdout(&output);
    assert_eq!(
        text.lines().last(),
        Some("*a.Node: *a.Node (*example.com/graph/a/Node, Pointer), zero value nil")
    );
}

#[test]
fn test_unresolved_type_of_fails() {
    let dump = graph_dump();
    let output = typegraph(&[
        "--input",
        dump.path().to_str().unwrap(),
        "--type-of",
        "a.Missing",
    ]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr)
        .contains("cannot resolve type expression `a.Missing`"));
}

#[test]
fn test_invalid_config_fails() {
    let dump = graph_dump();
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "max-alias-passes = 0").unwrap();

    let output = typegraph(&[
        "--input",
        dump.path().to_str().unwrap(),
        "--config",
        config.path().to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("max-alias-passes must be at least 1"));
}

#[test]
fn test_missing_dump_fails() {
    let output = typegraph(&["--input", "/nonexistent/typegraph-dump.json"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error reading program"));
}
