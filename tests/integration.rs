use std::path::Path;
use std::process::{Command, Output};

fn ngpeek_cmd(fixture: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ngpeek"));
    cmd.current_dir(Path::new("tests/fixtures").join(fixture));
    cmd.env_remove("NGPEEK_LOG");
    cmd
}

fn run(args: &[&str]) -> Output {
    ngpeek_cmd("app").args(args).output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn peek_element_directive() {
    let out = run(&["peek", "index.html", "4:6"]);
    assert_eq!(
        out.status.code(),
        Some(0),
        "peek failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let text = stdout(&out);
    assert!(text.starts_with("js/widgets.js:2:"), "unexpected preview:\n{text}");
    assert!(text.contains(".directive('myWidget'"));
    // Vendored copies are excluded by default.
    assert!(!text.contains("node_modules"));
}

#[test]
fn peek_attribute_directive() {
    let out = run(&["peek", "index.html", "5:9"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).starts_with("js/widgets.js:9:"));
}

#[test]
fn peek_controller_lists_every_registration() {
    let out = run(&["peek", "index.html", "3:23", "--json"]);
    assert_eq!(out.status.code(), Some(0));

    let value: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    let files: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["file"].as_str().unwrap())
        .collect();
    assert_eq!(files, vec!["js/controllers.js", "js/legacy.js"]);
    assert_eq!(value[0]["range"]["start_line"], 2);
}

#[test]
fn peek_unquoted_controller_binding() {
    let out = run(&["peek", "index.html", "7:28"]);
    assert_eq!(out.status.code(), Some(0));
    let text = stdout(&out);
    assert!(text.starts_with("js/controllers.js:3:1"), "unexpected preview:\n{text}");
    assert!(!text.contains(".directive("));
}

#[test]
fn peek_plain_text_declines() {
    let out = run(&["peek", "index.html", "6:7"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty());
}

#[test]
fn peek_multi_line_selection_declines() {
    let out = run(&["peek", "index.html", "4:6", "--end", "5:9"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn peek_bad_position_is_an_error() {
    let out = run(&["peek", "index.html", "four:six"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Invalid Position"));
}

#[test]
fn peek_missing_document_is_an_error() {
    let out = run(&["peek", "missing.html", "1:1"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("File Not Found"));
}

#[test]
fn find_accepts_markup_spelling() {
    let out = run(&["find", "directive", "user-card"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains(".directive(\"userCard\""));
}

#[test]
fn find_unknown_name_is_not_found() {
    let out = run(&["find", "controller", "NobodyCtrl", "--json"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out).trim(), "[]");
}

#[test]
fn classify_reports_kind_and_name() {
    let out = run(&["classify", "index.html", "4:6"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out).trim(), "directive\tmy-widget\tmyWidget");

    let out = run(&["classify", "index.html", "3:23"]);
    assert_eq!(stdout(&out).trim(), "controller\t\"MainCtrl as main\"\tMainCtrl");
}
