use std::path::Path;

use lengthguard_core::bundle::TranslationBundle;
use lengthguard_core::config::Config;
use lengthguard_core::strategies::ResolutionStrategy;
use lengthguard_core::types::Severity;
use lengthguard_core::{check, fix_bundle, CheckOptions};

const SOURCE: &str = "../../fixtures/locales/en.json";

fn fixture_config() -> Config {
    Config::load(Path::new("../../fixtures/lengthguard.toml")).expect("load fixture config")
}

#[test]
fn check_single_locale_reports_sorted_issues() {
    let opts = CheckOptions {
        config: fixture_config(),
        ..CheckOptions::default()
    };
    let report = check(
        Path::new(SOURCE),
        Path::new("../../fixtures/locales/es.json"),
        &opts,
    )
    .expect("check ok");

    assert_eq!(report.locales.len(), 1);
    let es = &report.locales[0];
    assert_eq!(es.locale, "es");
    assert_eq!(es.summary.entries, 10);
    assert_eq!(es.summary.unchecked_empty_source, 1);
    assert_eq!(es.summary.missing_keys, 0);
    assert_eq!(es.summary.critical, 3);
    assert_eq!(es.summary.errors, 3);
    assert_eq!(es.summary.warnings, 1);

    let keys: Vec<_> = es.issues.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "buttons.save",
            "nav.home",
            "buttons.cancel",
            "notifications.saved",
            "buttons.go_to_offer",
            "nav.settings",
            "nav.deals",
        ]
    );
    assert!(!report.gate.pass);
}

#[test]
fn check_directory_covers_every_locale_but_the_source() {
    let opts = CheckOptions {
        config: fixture_config(),
        ..CheckOptions::default()
    };
    let report = check(
        Path::new(SOURCE),
        Path::new("../../fixtures/locales"),
        &opts,
    )
    .expect("check dir ok");

    let locales: Vec<_> = report.locales.iter().map(|l| l.locale.as_str()).collect();
    assert_eq!(locales, vec!["de", "es"]);

    let de = &report.locales[0];
    assert_eq!(de.missing_keys, vec!["nav.settings"]);
    assert_eq!(de.summary.critical, 1);
    assert_eq!(de.summary.errors, 3);

    assert_eq!(report.summary.critical, 4);
    assert_eq!(report.summary.errors, 6);
    assert_eq!(report.summary.missing_keys, 1);
}

#[test]
fn fail_on_critical_still_fails_with_critical_issues() {
    let opts = CheckOptions {
        config: fixture_config(),
        fail_on: Some(Severity::Critical),
        ..CheckOptions::default()
    };
    let report = check(
        Path::new(SOURCE),
        Path::new("../../fixtures/locales/de.json"),
        &opts,
    )
    .unwrap();
    assert!(!report.gate.pass);
    assert_eq!(report.gate.reason, "1 issue(s) at or above critical");
}

#[test]
fn locale_flag_rejects_directories() {
    let opts = CheckOptions {
        locale: Some("es".to_string()),
        ..CheckOptions::default()
    };
    let err = check(
        Path::new(SOURCE),
        Path::new("../../fixtures/locales"),
        &opts,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("single target"));
}

#[test]
fn missing_target_is_an_error() {
    let err = check(
        Path::new(SOURCE),
        Path::new("../../fixtures/locales/xx.json"),
        &CheckOptions::default(),
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("does not exist"));
}

#[test]
fn truncate_fix_rewrites_bundle_and_rechecks() {
    let config = fixture_config();
    let source = TranslationBundle::load(Path::new(SOURCE)).unwrap();
    let target = TranslationBundle::load(Path::new("../../fixtures/locales/es.json")).unwrap();

    let outcome = fix_bundle(&source, target, "es", ResolutionStrategy::Truncate, &config)
        .expect("fix ok");

    assert_eq!(outcome.applied.len(), 7);
    assert_eq!(outcome.bundle.get("buttons.save"), Some("G..."));
    assert_eq!(outcome.bundle.get("buttons.go_to_offer"), Some("Ir a la..."));
    assert_eq!(outcome.bundle.get("notifications.saved"), Some("Oferta..."));
    assert_eq!(outcome.bundle.get("nav.settings"), Some("Aju..."));
    // Already at 1.2x, left alone.
    assert_eq!(outcome.bundle.get("nav.deals"), Some("Promos"));
    assert_eq!(outcome.bundle.get("legal"), Some("Aviso legal"));

    // The 1.2x truncation target is still above the button error threshold.
    let remaining: Vec<_> = outcome.remaining.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(remaining, vec!["buttons.cancel", "nav.deals"]);
}

#[test]
fn abbreviate_fix_prefers_the_locale_dictionary() {
    let source = TranslationBundle::from_json_str(
        r#"{"settings": "Application settings", "info": "More information"}"#,
    )
    .unwrap();
    let target = TranslationBundle::from_json_str(
        r#"{"settings": "Réglages de l'application", "info": "Plus d'informations ici"}"#,
    )
    .unwrap();

    let outcome = fix_bundle(
        &source,
        target,
        "fr-CA",
        ResolutionStrategy::Abbreviate,
        &Config::default(),
    )
    .unwrap();

    assert_eq!(outcome.applied.len(), 2);
    assert_eq!(outcome.bundle.get("settings"), Some("Réglages de l'appli"));
    assert_eq!(outcome.bundle.get("info"), Some("Plus d'infos ici"));
    assert!(outcome.remaining.is_empty());
}

#[test]
fn layout_fix_keeps_text_and_leaves_issues() {
    let config = fixture_config();
    let source = TranslationBundle::load(Path::new(SOURCE)).unwrap();
    let target = TranslationBundle::load(Path::new("../../fixtures/locales/de.json")).unwrap();

    let outcome = fix_bundle(&source, target, "de", ResolutionStrategy::MultiLine, &config)
        .unwrap();

    assert_eq!(outcome.applied.len(), 4);
    assert!(outcome
        .applied
        .iter()
        .all(|f| f.new_text == f.original_text));
    assert_eq!(outcome.remaining.len(), 4);
}

#[test]
fn rephrase_cannot_be_batched() {
    let source = TranslationBundle::load(Path::new(SOURCE)).unwrap();
    let target = TranslationBundle::load(Path::new("../../fixtures/locales/es.json")).unwrap();
    let err = fix_bundle(
        &source,
        target,
        "es",
        ResolutionStrategy::Rephrase,
        &Config::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("rephrase"));
}
