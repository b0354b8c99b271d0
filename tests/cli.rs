//! CLI surface tests for the `recast` binary.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn detect_reports_language_from_stdin() {
    let mut cmd = cargo_bin_cmd!("recast");
    cmd.arg("detect").arg("-").write_stdin("const x = 1;");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("JavaScript"));
}

#[test]
fn strip_removes_js_comments() {
    let mut cmd = cargo_bin_cmd!("recast");
    cmd.arg("strip")
        .arg("-")
        .arg("--lang")
        .arg("js")
        .write_stdin("// note\ncode();\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("code();").and(predicate::str::contains("note").not()));
}

#[test]
fn minify_collapses_to_one_line() {
    let mut cmd = cargo_bin_cmd!("recast");
    cmd.arg("minify")
        .arg("-")
        .arg("--lang")
        .arg("js")
        .write_stdin("if (a) {\n    b();\n}\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::diff("if(a){b();}\n"));
}

#[test]
fn format_json_with_sorted_keys() {
    let mut cmd = cargo_bin_cmd!("recast");
    cmd.arg("format")
        .arg("-")
        .arg("--lang")
        .arg("json")
        .arg("--sort-keys")
        .write_stdin(r#"{"b":1,"a":2}"#);
    cmd.assert()
        .success()
        .stdout(predicate::str::diff("{\n    \"a\": 2,\n    \"b\": 1\n}\n"));
}

#[test]
fn obfuscate_then_deobfuscate_round_trips() {
    let mut obf = cargo_bin_cmd!("recast");
    obf.arg("obfuscate")
        .arg("-")
        .arg("--lang")
        .arg("js")
        .arg("--method")
        .arg("eval64")
        .write_stdin("alert(1);");
    let encoded = obf.assert().success().get_output().stdout.clone();

    let mut deobf = cargo_bin_cmd!("recast");
    deobf
        .arg("deobfuscate")
        .arg("-")
        .write_stdin(encoded);
    deobf
        .assert()
        .success()
        .stdout(predicate::str::contains("alert(1);"));
}

#[test]
fn deobfuscate_declines_with_error() {
    let mut cmd = cargo_bin_cmd!("recast");
    cmd.arg("deobfuscate").arg("-").write_stdin("hi!");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Nothing recognizable"));
}

#[test]
fn unknown_language_is_rejected() {
    let mut cmd = cargo_bin_cmd!("recast");
    cmd.arg("minify")
        .arg("-")
        .arg("--lang")
        .arg("klingon")
        .write_stdin("x");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown language"));
}

#[test]
fn missing_file_is_reported() {
    let mut cmd = cargo_bin_cmd!("recast");
    cmd.arg("detect").arg("/no/such/file.js");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error reading"));
}
