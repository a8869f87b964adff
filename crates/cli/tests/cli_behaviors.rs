use assert_cmd::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
}

fn arg(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn cli_check_passes_for_clean_locale_and_writes_json() {
    let out = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("fr.json");
    fs::write(&target, r#"{"buttons": {"save": "Sauver"}}"#).unwrap();
    let source = dir.path().join("en.json");
    fs::write(&source, r#"{"buttons": {"save": "Save it"}}"#).unwrap();

    let mut cmd = cargo_bin_cmd!("lengthguard");
    cmd.args([
        "check",
        "--source",
        arg(&source),
        "--target",
        arg(&target),
        "--out",
        arg(out.path()),
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("locales=1 entries=1 warnings=0 errors=0 critical=0"));

    assert!(out.path().join("report.json").exists());
    assert!(!out.path().join("report.md").exists());
}

#[test]
fn cli_check_exits_2_when_gate_fails() {
    let out = tempfile::tempdir().unwrap();
    let fx = fixtures();

    let mut cmd = cargo_bin_cmd!("lengthguard");
    cmd.args([
        "check",
        "--source",
        arg(&fx.join("locales/en.json")),
        "--target",
        arg(&fx.join("locales/es.json")),
        "--config",
        arg(&fx.join("lengthguard.toml")),
        "--out",
        arg(out.path()),
    ]);

    cmd.assert()
        .code(2)
        .stdout(predicate::str::contains("warnings=1 errors=3 critical=3"));

    let json = fs::read_to_string(out.path().join("report.json")).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v["locales"][0]["issues"][0]["key"], "buttons.save");
    assert_eq!(v["gate"]["pass"], false);
}

#[test]
fn cli_check_directory_writes_all_formats() {
    let out = tempfile::tempdir().unwrap();
    let fx = fixtures();

    let mut cmd = cargo_bin_cmd!("lengthguard");
    cmd.args([
        "check",
        "--source",
        arg(&fx.join("locales/en.json")),
        "--target",
        arg(&fx.join("locales")),
        "--config",
        arg(&fx.join("lengthguard.toml")),
        "--output-format",
        "all",
        "--out",
        arg(out.path()),
    ]);

    cmd.assert().code(2).stdout(predicate::str::contains("locales=2"));

    assert!(out.path().join("report.json").exists());
    assert!(out.path().join("report.md").exists());
    let xml = fs::read_to_string(out.path().join("report.xml")).unwrap();
    assert!(xml.contains("<testsuites"));
    assert!(xml.contains("lengthguard.de"));
    assert!(xml.contains("length_gate"));
}

#[test]
fn cli_fix_writes_truncated_bundle() {
    let fx = fixtures();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("es.fixed.json");

    let mut cmd = cargo_bin_cmd!("lengthguard");
    cmd.args([
        "fix",
        "--source",
        arg(&fx.join("locales/en.json")),
        "--target",
        arg(&fx.join("locales/es.json")),
        "--config",
        arg(&fx.join("lengthguard.toml")),
        "--strategy",
        "truncate",
        "--output",
        arg(&output),
    ]);

    cmd.assert().success().stdout(predicate::str::contains(
        "locale=es strategy=truncate applied=7 remaining=2",
    ));

    let fixed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(fixed["buttons"]["save"], "G...");
    assert_eq!(fixed["legal"], "Aviso legal");
}

#[test]
fn cli_fix_abbreviates_with_locale_dictionary() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("en.json");
    fs::write(
        &source,
        r#"{"labels": {"settings": "Application settings", "info": "More information"}}"#,
    )
    .unwrap();
    let target = dir.path().join("fr.json");
    fs::write(
        &target,
        r#"{"labels": {"settings": "Réglages de l'application", "info": "Plus d'informations ici"}}"#,
    )
    .unwrap();
    let output = dir.path().join("fr.fixed.json");

    let mut cmd = cargo_bin_cmd!("lengthguard");
    cmd.args([
        "fix",
        "--source",
        arg(&source),
        "--target",
        arg(&target),
        "--strategy",
        "abbreviate",
        "--output",
        arg(&output),
    ]);

    cmd.assert().success().stdout(predicate::str::contains(
        "locale=fr strategy=abbreviate applied=2 remaining=0",
    ));

    let fixed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(fixed["labels"]["settings"], "Réglages de l'appli");
    assert_eq!(fixed["labels"]["info"], "Plus d'infos ici");
}

#[test]
fn cli_fix_rejects_rephrase() {
    let fx = fixtures();
    let mut cmd = cargo_bin_cmd!("lengthguard");
    cmd.args([
        "fix",
        "--source",
        arg(&fx.join("locales/en.json")),
        "--target",
        arg(&fx.join("locales/es.json")),
        "--strategy",
        "rephrase",
    ]);
    cmd.assert().failure().code(2);
}

#[test]
fn cli_measure_prints_metrics() {
    let mut cmd = cargo_bin_cmd!("lengthguard");
    cmd.args(["measure", "Ir a la Oferta", "--container-width", "50"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"characters\": 14"))
        .stdout(predicate::str::contains("\"pixel_width\": 112.0"))
        .stdout(predicate::str::contains("\"lines\": 3"));
}

#[test]
fn cli_check_errors_on_missing_input() {
    let mut cmd = cargo_bin_cmd!("lengthguard");
    cmd.args([
        "check",
        "--source",
        "does-not-exist.json",
        "--target",
        "does-not-exist-either.json",
        "--out",
        "lengthguard-out-test",
    ]);
    cmd.assert().failure().code(1);
}
