mod common;

use adoptmap::config::loader::{discover_rules, load_rules_from_path};
use adoptmap::config::{parse_and_validate_rules, CONFIG_FILE_NAME};
use adoptmap::{Dataset, Error, FeatureCategory, PlanTier, RiskLabel, RuleSet};
use common::{as_of, customer, engine_with_rules, feature, usage};
use indoc::indoc;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_partial_rules_keep_remaining_defaults() {
    let rules = parse_and_validate_rules(indoc! {r#"
        version = "2026.1-acme"

        [risk]
        medium_at = 20
        high_at = 50

        [signals.weights]
        core_non_adoption = 55.0
    "#})
    .unwrap();

    assert_eq!(rules.version, "2026.1-acme");
    assert_eq!(rules.risk.medium_at, 20);
    assert_eq!(rules.risk.high_at, 50);
    assert_eq!(rules.signals.weights.core_non_adoption, 55.0);
    assert_eq!(rules.signals.weights.recency_decline, 30.0);
    assert_eq!(rules.adoption, RuleSet::default().adoption);
    assert_eq!(rules.playbooks, RuleSet::default().playbooks);
}

#[test]
fn test_every_violation_is_reported() {
    let err = parse_and_validate_rules(indoc! {r#"
        [risk]
        medium_at = 80
        high_at = 70

        [confidence]
        floor = 0.9
        ceiling = 0.5
    "#})
    .unwrap_err();

    assert!(matches!(err, Error::Configuration(_)));
    let message = err.to_string();
    assert!(message.contains("risk.medium_at"), "{message}");
    assert!(message.contains("confidence"), "{message}");
}

#[test]
fn test_malformed_toml_is_toml_error() {
    let err = parse_and_validate_rules("[risk\nmedium_at = ").unwrap_err();
    assert!(matches!(err, Error::Toml(_)));
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = load_rules_from_path(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn test_discovery_walks_up_to_parent_directories() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "version = \"found-in-root\"\n",
    )
    .unwrap();
    let nested = dir.path().join("team").join("region");
    fs::create_dir_all(&nested).unwrap();

    let rules = discover_rules(nested).unwrap();
    assert_eq!(rules.version, "found-in-root");
}

#[test]
fn test_discovery_skips_invalid_files() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("child");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join(CONFIG_FILE_NAME), "[risk]\nhigh_at = 500\n").unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "version = \"parent\"\n",
    )
    .unwrap();

    let rules = discover_rules(nested).unwrap();
    assert_eq!(rules.version, "parent");
}

#[test]
fn test_rule_changes_flow_into_analysis() {
    let dataset = Dataset::default()
        .with_customer(customer("c1", PlanTier::Standard, 100.0, 200))
        .with_feature(feature("dashboard", FeatureCategory::Core, true, PlanTier::Basic))
        .with_feature(feature("reports", FeatureCategory::Core, true, PlanTier::Basic))
        .with_usage(usage("c1", "dashboard", 500, 1));

    let default_report = engine_with_rules(dataset.clone(), RuleSet::default())
        .analyze_customer_at("c1", as_of())
        .unwrap();

    let strict = parse_and_validate_rules(indoc! {r#"
        version = "strict"

        [risk]
        medium_at = 10
        high_at = 35
    "#})
    .unwrap();
    let strict_report = engine_with_rules(dataset, strict)
        .analyze_customer_at("c1", as_of())
        .unwrap();

    assert_eq!(default_report.risk.score, strict_report.risk.score);
    assert_eq!(default_report.risk.label, RiskLabel::Medium);
    assert_eq!(strict_report.risk.label, RiskLabel::High);
    assert_eq!(strict_report.rules_version, "strict");
}
